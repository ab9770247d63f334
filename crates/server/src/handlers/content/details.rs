use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
};
use axum_derive_error::ErrorResponse;
use db::{content, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter};
use derive_more::{Display, Error, From};

use crate::response::ApiResponse;

/// Errors that may occur during content details lookup.
#[derive(ErrorResponse, Display, From, Error)]
pub(super) enum ContentDetailsError {
    /// Database-related error.
    DatabaseError(DbErr),

    /// Requested content was not found.
    #[status(StatusCode::NOT_FOUND)]
    #[display(fmt = "Content not found")]
    ContentNotFound,
}

/// Get content by its identifier.
///
/// Inactive content is still returned, so that existing licensees can see
/// what they have purchased.
pub(super) async fn details(
    Path(content_id): Path<String>,
    State(db): State<Arc<DatabaseConnection>>,
) -> Result<ApiResponse<content::Model>, ContentDetailsError> {
    let model = content::Entity::find()
        .filter(content::Column::ContentId.eq(content_id))
        .one(&*db)
        .await?
        .ok_or(ContentDetailsError::ContentNotFound)?;

    Ok(ApiResponse::new(model))
}
