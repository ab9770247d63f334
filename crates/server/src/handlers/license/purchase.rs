use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Extension};
use axum_derive_error::ErrorResponse;
use common::chain;
use db::{
    content, license, user, ActiveValue, ColumnTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter,
};
use derive_more::{Display, Error, From};
use serde::{Deserialize, Serialize};
use tracing::info;
use validator::Validate;

use crate::{response::ApiResponse, validation::ValidatedJson};

/// Errors that may occur during the license purchase process.
#[derive(ErrorResponse, Display, From, Error)]
pub(super) enum LicensePurchaseError {
    /// Database-related error.
    DatabaseError(DbErr),

    /// Requested content was not found.
    #[status(StatusCode::NOT_FOUND)]
    #[display(fmt = "Content not found")]
    ContentNotFound,

    /// Content was deactivated by its creator.
    #[status(StatusCode::BAD_REQUEST)]
    #[display(fmt = "Content is not active")]
    ContentInactive,
}

/// JSON request body.
#[derive(Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub(super) struct LicensePurchaseRequest {
    #[serde(default)]
    #[validate(length(min = 1))]
    content_id: String,

    #[serde(default)]
    #[validate(length(min = 1))]
    wallet_address: String,
}

/// JSON response body.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct LicensePurchaseResponse {
    license_id: String,
    content_id: String,
    tx_hash: String,
    price_per_use: String,
}

/// Purchase a license for the provided content.
///
/// Purchasers are registered as accessors if they are not known yet.
///
/// Responds with `404 Not Found` for unknown content and `400 Bad Request`
/// for inactive content or incomplete request bodies.
pub(super) async fn purchase(
    Extension(chain): Extension<Arc<chain::Client>>,
    State(db): State<Arc<DatabaseConnection>>,
    ValidatedJson(request): ValidatedJson<LicensePurchaseRequest>,
) -> Result<ApiResponse<LicensePurchaseResponse>, LicensePurchaseError> {
    user::ensure_exists(&*db, &request.wallet_address, user::Role::Accessor).await?;

    let content = content::Entity::find()
        .filter(content::Column::ContentId.eq(&*request.content_id))
        .one(&*db)
        .await?
        .ok_or(LicensePurchaseError::ContentNotFound)?;

    if !content.active {
        return Err(LicensePurchaseError::ContentInactive);
    }

    let purchase = chain
        .purchase_license(&content.content_id, &content.price_per_use)
        .await;

    let now = db::unix_timestamp();

    license::Entity::insert(license::ActiveModel {
        license_id: ActiveValue::Set(purchase.license_id.clone()),
        content_id: ActiveValue::Set(content.content_id.clone()),
        licensee_address: ActiveValue::Set(request.wallet_address),
        purchase_time: ActiveValue::Set(now),
        blockchain_tx: ActiveValue::Set(Some(purchase.tx_hash.clone())),
        active: ActiveValue::Set(true),
        created_at: ActiveValue::Set(now),
        ..Default::default()
    })
    .exec_without_returning(&*db)
    .await?;

    info!(
        license_id = %purchase.license_id,
        content_id = %content.content_id,
        "license purchased"
    );

    Ok(ApiResponse::new(LicensePurchaseResponse {
        license_id: purchase.license_id,
        content_id: content.content_id,
        tx_hash: purchase.tx_hash,
        price_per_use: content.price_per_use,
    })
    .with_message("License purchased successfully"))
}
