use std::sync::Arc;

use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    http::StatusCode,
    Extension,
};
use axum_derive_error::ErrorResponse;
use common::{
    chain::{self, RegisterContent},
    config::Config,
    content::{self as rules, content_category},
    hash,
    storage::{self, LocalStorage},
};
use db::{
    content, upload, user, ActiveValue, ColumnTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QuerySelect, SelectExt, TransactionErrorExt, TransactionTrait,
};
use derive_more::{Display, Error, From};
use serde::Serialize;
use tracing::info;

use crate::response::ApiResponse;

/// Errors that may occur during the content upload process.
#[derive(ErrorResponse, Display, From, Error)]
pub(super) enum ContentUploadError {
    /// Database-related error.
    DatabaseError(DbErr),

    /// `multipart/form-data` request handling error.
    #[status(StatusCode::BAD_REQUEST)]
    MultipartError(MultipartError),

    /// Uploaded file could not be stored.
    StorageError(storage::Error),

    #[status(StatusCode::BAD_REQUEST)]
    #[display(fmt = "Missing required fields")]
    MissingFields,

    /// Uploaded file MIME type is not allowed.
    #[status(StatusCode::BAD_REQUEST)]
    #[display(fmt = "Invalid file type")]
    InvalidFileType,

    /// Price per use is not a positive number.
    #[status(StatusCode::BAD_REQUEST)]
    #[display(fmt = "Invalid price")]
    InvalidPrice,

    /// File with the same hash was uploaded before.
    #[status(StatusCode::CONFLICT)]
    #[display(fmt = "File already uploaded")]
    AlreadyUploaded,

    /// Request body exceeds the configured upload size limit.
    #[status(StatusCode::PAYLOAD_TOO_LARGE)]
    #[display(fmt = "File too large")]
    PayloadTooLarge,
}

impl ContentUploadError {
    /// Map multipart stream errors, keeping body limit violations apart
    /// from malformed forms.
    fn from_multipart(err: MultipartError) -> Self {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            Self::PayloadTooLarge
        } else {
            Self::MultipartError(err)
        }
    }
}

/// JSON response body.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct ContentUploadResponse {
    content_id: String,
    content_hash: String,
    tx_hash: String,
    file_name: String,
    file_size: i64,
}

/// Uploaded file.
struct FileField {
    name: String,
    mime_type: String,
    data: Vec<u8>,
}

/// Fields of an upload form.
#[derive(Default)]
struct UploadForm {
    file: Option<FileField>,
    title: Option<String>,
    description: Option<String>,
    content_type: Option<String>,
    price_per_use: Option<String>,
    tags: Option<String>,
    wallet_address: Option<String>,
}

impl UploadForm {
    async fn read(mut data: Multipart) -> Result<Self, MultipartError> {
        let mut form = Self::default();

        while let Some(field) = data.next_field().await? {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };

            if name == "file" {
                let file_name = field.file_name().unwrap_or("file").to_string();
                let mime_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();

                form.file = Some(FileField {
                    name: file_name,
                    mime_type,
                    data: field.bytes().await?.to_vec(),
                });

                continue;
            }

            let value = field.text().await?;
            let value = value.trim();

            if value.is_empty() {
                continue;
            }

            let value = Some(value.to_string());

            match name.as_str() {
                "title" => form.title = value,
                "description" => form.description = value,
                "contentType" => form.content_type = value,
                "pricePerUse" => form.price_per_use = value,
                "tags" => form.tags = value,
                "walletAddress" => form.wallet_address = value,
                _ => {}
            }
        }

        Ok(form)
    }
}

/// Upload a content file and register it on the marketplace contract.
///
/// This route accepts a `multipart/form-data` form with a `file` field
/// and `title`, `pricePerUse` and `walletAddress` text fields.
/// Optional `description`, `contentType` and comma-separated `tags` fields
/// may be provided as well. If no content type is provided, it is derived
/// from the file MIME type.
///
/// Files are identified by their SHA-256 hash, and each file can only be
/// uploaded once. Repeated uploads are rejected with `409 Conflict`, including
/// uploads racing each other. Request bodies over `storage.max_upload_size`
/// are rejected with `413 Payload Too Large`.
///
/// The stored file is removed again if the database rows cannot be written.
pub(super) async fn upload(
    Extension(config): Extension<Arc<Config>>,
    Extension(chain): Extension<Arc<chain::Client>>,
    State(db): State<Arc<DatabaseConnection>>,
    data: Multipart,
) -> Result<ApiResponse<ContentUploadResponse>, ContentUploadError> {
    let form = UploadForm::read(data)
        .await
        .map_err(ContentUploadError::from_multipart)?;

    let (Some(file), Some(title), Some(price_per_use), Some(wallet_address)) = (
        form.file,
        form.title,
        form.price_per_use,
        form.wallet_address,
    ) else {
        return Err(ContentUploadError::MissingFields);
    };

    if file.data.is_empty() {
        return Err(ContentUploadError::MissingFields);
    }

    if !rules::is_allowed_mime_type(&file.mime_type) {
        return Err(ContentUploadError::InvalidFileType);
    }

    if !rules::is_valid_price(&price_per_use) {
        return Err(ContentUploadError::InvalidPrice);
    }

    user::ensure_exists(&*db, &wallet_address, user::Role::Creator).await?;

    let file_hash = hash::sha256_hex(&file.data);

    let already_uploaded = upload::Entity::find()
        .select_only()
        .filter(upload::Column::FileHash.eq(&*file_hash))
        .exists(&*db)
        .await?;

    if already_uploaded {
        return Err(ContentUploadError::AlreadyUploaded);
    }

    let storage = LocalStorage::new(&config.storage);
    let path = storage.store(&file_hash, &file.name, &file.data).await?;

    let file_size = file.data.len() as i64;
    let content_type = form
        .content_type
        .unwrap_or_else(|| content_category(&file.mime_type).to_string());
    let now = db::unix_timestamp();

    let registration = chain
        .register_content(&RegisterContent {
            content_hash: file_hash.clone(),
            ipfs_cid: String::new(),
            title: title.clone(),
            content_type: content_type.clone(),
            price_per_use: price_per_use.clone(),
            creator: wallet_address.clone(),
            registered_at: now,
        })
        .await;

    let upload_model = upload::ActiveModel {
        file_hash: ActiveValue::Set(file_hash.clone()),
        file_path: ActiveValue::Set(path.display().to_string()),
        file_name: ActiveValue::Set(file.name.clone()),
        file_size: ActiveValue::Set(file_size),
        mime_type: ActiveValue::Set(file.mime_type),
        uploader_address: ActiveValue::Set(wallet_address.clone()),
        created_at: ActiveValue::Set(now),
        ..Default::default()
    };

    let content_model = content::ActiveModel {
        content_id: ActiveValue::Set(registration.content_id.clone()),
        creator_address: ActiveValue::Set(wallet_address),
        content_hash: ActiveValue::Set(file_hash.clone()),
        ipfs_cid: ActiveValue::Set(None),
        title: ActiveValue::Set(title),
        description: ActiveValue::Set(form.description),
        content_type: ActiveValue::Set(content_type),
        file_size: ActiveValue::Set(Some(file_size)),
        price_per_use: ActiveValue::Set(price_per_use),
        tags: ActiveValue::Set(form.tags.as_deref().and_then(rules::normalize_tags)),
        blockchain_tx: ActiveValue::Set(Some(registration.tx_hash.clone())),
        active: ActiveValue::Set(true),
        created_at: ActiveValue::Set(now),
        ..Default::default()
    };

    let result: Result<(), ContentUploadError> = db
        .transaction(|txn| {
            Box::pin(async move {
                upload::Entity::insert(upload_model)
                    .exec_without_returning(txn)
                    .await?;

                content::Entity::insert(content_model)
                    .exec_without_returning(txn)
                    .await?;

                Ok(())
            })
        })
        .await
        .into_raw_result();

    if let Err(err) = result {
        storage.remove(&path).await;

        // A concurrent upload of the same file may have won the insert.
        let uploaded_concurrently = upload::Entity::find()
            .select_only()
            .filter(upload::Column::FileHash.eq(&*file_hash))
            .exists(&*db)
            .await?;

        if uploaded_concurrently {
            return Err(ContentUploadError::AlreadyUploaded);
        }

        return Err(err);
    }

    info!(
        content_id = %registration.content_id,
        content_hash = %file_hash,
        "content uploaded"
    );

    Ok(ApiResponse::new(ContentUploadResponse {
        content_id: registration.content_id,
        content_hash: file_hash,
        tx_hash: registration.tx_hash,
        file_name: file.name,
        file_size,
    })
    .with_message("Content uploaded and registered successfully"))
}
