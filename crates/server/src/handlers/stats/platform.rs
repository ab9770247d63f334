use std::sync::Arc;

use axum::extract::State;
use axum_derive_error::ErrorResponse;
use db::{
    content, license, sea_query::Expr, usage_event, ColumnTrait, DatabaseConnection, DbErr,
    EntityTrait, PaginatorTrait, QueryFilter, QuerySelect,
};
use derive_more::{Display, Error, From};
use serde::Serialize;

use crate::response::ApiResponse;

#[derive(ErrorResponse, Display, From, Error)]
pub(super) enum PlatformStatsError {
    DatabaseError(DbErr),
}

/// Marketplace-wide statistics.
#[derive(Serialize)]
pub(super) struct PlatformStats {
    total_content: u64,
    total_creators: i64,
    total_licenses: u64,
    total_uses: u64,
}

/// Get marketplace-wide statistics.
///
/// Only active content and licenses are counted.
pub(super) async fn platform(
    State(db): State<Arc<DatabaseConnection>>,
) -> Result<ApiResponse<PlatformStats>, PlatformStatsError> {
    let total_content = content::Entity::find()
        .filter(content::Column::Active.eq(true))
        .count(&*db)
        .await?;

    let total_creators = content::Entity::find()
        .select_only()
        .column_as(Expr::cust("COUNT(DISTINCT creator_address)"), "creators")
        .filter(content::Column::Active.eq(true))
        .into_tuple::<i64>()
        .one(&*db)
        .await?
        .unwrap_or(0);

    let total_licenses = license::Entity::find()
        .filter(license::Column::Active.eq(true))
        .count(&*db)
        .await?;

    let total_uses = usage_event::Entity::find().count(&*db).await?;

    Ok(ApiResponse::new(PlatformStats {
        total_content,
        total_creators,
        total_licenses,
        total_uses,
    }))
}
