use std::{collections::HashMap, sync::Arc};

use axum::extract::{Path, State};
use axum_derive_error::ErrorResponse;
use db::{
    content, license, sea_query::Expr, usage_event, ColumnTrait, ConnectionTrait,
    DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder, QuerySelect,
};
use derive_more::{Display, Error, From};
use serde::Serialize;

use crate::response::ApiResponse;

#[derive(ErrorResponse, Display, From, Error)]
pub(super) enum CreatorDetailsError {
    DatabaseError(DbErr),
}

/// Aggregated statistics of a creator.
#[derive(Serialize)]
pub(super) struct CreatorStats {
    total_content: usize,
    total_licenses: i64,
    total_uses: i64,

    /// Sum of per-use prices over all recorded usages.
    estimated_revenue: f64,
}

#[derive(Serialize)]
pub(super) struct CreatorDetails {
    content: Vec<content::Model>,
    stats: CreatorStats,
}

/// Get content uploaded by the provided creator, newest first,
/// along with its aggregated statistics.
///
/// Inactive content is included.
pub(super) async fn details(
    Path(address): Path<String>,
    State(db): State<Arc<DatabaseConnection>>,
) -> Result<ApiResponse<CreatorDetails>, CreatorDetailsError> {
    let content = content::Entity::find()
        .filter(content::Column::CreatorAddress.eq(address))
        .order_by_desc(content::Column::CreatedAt)
        .order_by_desc(content::Column::Id)
        .all(&*db)
        .await?;

    let content_ids = content
        .iter()
        .map(|model| model.content_id.clone())
        .collect::<Vec<_>>();

    let licenses = license_counts(&*db, &content_ids).await?;
    let uses = usage_counts(&*db, &content_ids).await?;

    let estimated_revenue = content
        .iter()
        .map(|model| model.price() * uses.get(&model.content_id).copied().unwrap_or(0) as f64)
        .sum();

    let stats = CreatorStats {
        total_content: content.len(),
        total_licenses: licenses.values().sum(),
        total_uses: uses.values().sum(),
        estimated_revenue,
    };

    Ok(ApiResponse::new(CreatorDetails { content, stats }))
}

/// Count licenses per content identifier.
async fn license_counts<C: ConnectionTrait>(
    db: &C,
    content_ids: &[String],
) -> Result<HashMap<String, i64>, DbErr> {
    Ok(license::Entity::find()
        .select_only()
        .column(license::Column::ContentId)
        .column_as(Expr::col(license::Column::Id).count(), "licenses")
        .filter(license::Column::ContentId.is_in(content_ids.iter().cloned()))
        .group_by(license::Column::ContentId)
        .into_tuple::<(String, i64)>()
        .all(db)
        .await?
        .into_iter()
        .collect())
}

/// Count usage events per content identifier.
async fn usage_counts<C: ConnectionTrait>(
    db: &C,
    content_ids: &[String],
) -> Result<HashMap<String, i64>, DbErr> {
    Ok(usage_event::Entity::find()
        .select_only()
        .column(usage_event::Column::ContentId)
        .column_as(Expr::col(usage_event::Column::Id).count(), "uses")
        .filter(usage_event::Column::ContentId.is_in(content_ids.iter().cloned()))
        .group_by(usage_event::Column::ContentId)
        .into_tuple::<(String, i64)>()
        .all(db)
        .await?
        .into_iter()
        .collect())
}
