use std::{path::Path as FilePath, sync::Arc};

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{header, StatusCode},
    Extension,
};
use axum_derive_error::ErrorResponse;
use common::{
    config::Config,
    storage::{self, LocalStorage},
};
use db::{upload, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter};
use derive_more::{Display, Error, From};
use serde::Deserialize;

use crate::licensing::{licensed_content, LicenseDenial};

/// Errors that may occur during a file download.
#[derive(ErrorResponse, Display, From, Error)]
pub(super) enum FileDownloadError {
    /// Database-related error.
    DatabaseError(DbErr),

    /// Stored file could not be read.
    StorageError(storage::Error),

    #[status(StatusCode::NOT_FOUND)]
    #[display(fmt = "License not found")]
    LicenseNotFound,

    #[status(StatusCode::FORBIDDEN)]
    #[display(fmt = "Not authorized to use this license")]
    NotLicensee,

    #[status(StatusCode::BAD_REQUEST)]
    #[display(fmt = "License is not active")]
    LicenseInactive,

    #[status(StatusCode::NOT_FOUND)]
    #[display(fmt = "Content not found")]
    ContentNotFound,

    /// License was issued for another content.
    #[status(StatusCode::FORBIDDEN)]
    #[display(fmt = "License does not cover this file")]
    OtherContent,

    #[status(StatusCode::NOT_FOUND)]
    #[display(fmt = "File not found")]
    FileNotFound,
}

impl From<LicenseDenial> for FileDownloadError {
    fn from(denial: LicenseDenial) -> Self {
        match denial {
            LicenseDenial::LicenseNotFound => Self::LicenseNotFound,
            LicenseDenial::NotLicensee => Self::NotLicensee,
            LicenseDenial::LicenseInactive => Self::LicenseInactive,
            LicenseDenial::ContentNotFound => Self::ContentNotFound,
        }
    }
}

/// License credentials passed as query parameters.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct FileDownloadQuery {
    #[serde(default)]
    license_id: String,

    #[serde(default)]
    wallet_address: String,
}

/// Download a stored content file.
///
/// Requires an active license for the content that the file belongs to,
/// passed as `licenseId` and `walletAddress` query parameters.
/// Downloads are not recorded as content usages.
///
/// The raw file is returned with its stored MIME type. A license for
/// other content is rejected with `403 Forbidden`.
pub(super) async fn download(
    Path(file_hash): Path<String>,
    Query(query): Query<FileDownloadQuery>,
    Extension(config): Extension<Arc<Config>>,
    State(db): State<Arc<DatabaseConnection>>,
) -> Result<([(header::HeaderName, String); 1], Bytes), FileDownloadError> {
    let (_, content) =
        licensed_content::<_, FileDownloadError>(&*db, &query.license_id, &query.wallet_address)
            .await?;

    if content.content_hash != file_hash {
        return Err(FileDownloadError::OtherContent);
    }

    let upload = upload::Entity::find()
        .filter(upload::Column::FileHash.eq(&*file_hash))
        .one(&*db)
        .await?
        .ok_or(FileDownloadError::FileNotFound)?;

    let data = LocalStorage::new(&config.storage)
        .read(FilePath::new(&upload.file_path))
        .await?;

    Ok(([(header::CONTENT_TYPE, upload.mime_type)], data))
}
