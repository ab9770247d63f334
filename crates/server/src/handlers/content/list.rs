use std::sync::Arc;

use axum::extract::{Query, State};
use axum_derive_error::ErrorResponse;
use db::{
    content,
    sea_query::Expr,
    ColumnTrait, Condition, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect,
};
use derive_more::{Display, Error, From};
use serde::Deserialize;

use crate::{pagination::Pagination, response::ApiResponse};

/// Content listing query parameters.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct ContentListQuery {
    /// Case-insensitive search over titles, descriptions and tags.
    query: Option<String>,

    #[serde(rename = "type")]
    content_type: Option<String>,

    min_price: Option<f64>,
    max_price: Option<f64>,

    limit: Option<u64>,
    offset: Option<u64>,
}

#[derive(ErrorResponse, Display, From, Error)]
pub(super) enum ContentListError {
    DatabaseError(DbErr),
}

/// List active content, newest first.
///
/// If a search query is provided, only content with a matching title,
/// description or tag list is returned.
///
/// Results can be narrowed with `type`, `minPrice` and `maxPrice`, and paged
/// with `limit` (50 by default, at most 100) and `offset`. The `count` field
/// holds the number of returned items.
pub(super) async fn list(
    State(db): State<Arc<DatabaseConnection>>,
    Query(params): Query<ContentListQuery>,
) -> Result<ApiResponse<Vec<content::Model>>, ContentListError> {
    let pagination = Pagination::new(params.limit, params.offset);

    let mut select = content::Entity::find().filter(content::Column::Active.eq(true));

    if let Some(query) = params
        .query
        .as_deref()
        .map(str::trim)
        .filter(|query| !query.is_empty())
    {
        let pattern = format!("%{}%", query.to_lowercase());

        select = select.filter(
            Condition::any()
                .add(lower("title").like(pattern.clone()))
                .add(lower("description").like(pattern.clone()))
                .add(lower("tags").like(pattern)),
        );
    }

    if let Some(content_type) = params.content_type {
        select = select.filter(content::Column::ContentType.eq(content_type));
    }

    if let Some(min_price) = params.min_price {
        select = select.filter(price().gte(min_price));
    }

    if let Some(max_price) = params.max_price {
        select = select.filter(price().lte(max_price));
    }

    let items = select
        .order_by_desc(content::Column::CreatedAt)
        .order_by_desc(content::Column::Id)
        .limit(pagination.limit())
        .offset(pagination.offset())
        .all(&*db)
        .await?;

    let count = items.len();

    Ok(ApiResponse::new(items).with_count(count))
}

fn lower(column: &str) -> Expr {
    Expr::expr(Expr::cust(&format!("LOWER({column})")))
}

fn price() -> Expr {
    Expr::expr(Expr::cust("CAST(price_per_use AS REAL)"))
}
