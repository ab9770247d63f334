use std::{path::Path, sync::Arc};

use axum::{extract::State, http::StatusCode, Extension};
use axum_derive_error::ErrorResponse;
use base64::{engine::general_purpose::STANDARD, Engine};
use common::{
    chain::{self, proof},
    config::Config,
    storage::{self, LocalStorage},
};
use db::{
    upload, usage_event, ActiveValue, ColumnTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter,
};
use derive_more::{Display, Error, From};
use serde::{Deserialize, Serialize};
use tracing::info;
use validator::Validate;

use crate::{
    licensing::{licensed_content, LicenseDenial},
    response::ApiResponse,
    validation::ValidatedJson,
};

/// Errors that may occur during content access.
#[derive(ErrorResponse, Display, From, Error)]
pub(super) enum ContentAccessError {
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

    /// Content has no uploaded file.
    #[status(StatusCode::NOT_FOUND)]
    #[display(fmt = "File not found")]
    FileNotFound,

    /// Generated usage proof didn't pass verification.
    #[display(fmt = "invalid usage proof")]
    InvalidProof,

    /// Download URL query could not be encoded.
    EncodingError(serde_urlencoded::ser::Error),
}

impl From<LicenseDenial> for ContentAccessError {
    fn from(denial: LicenseDenial) -> Self {
        match denial {
            LicenseDenial::LicenseNotFound => Self::LicenseNotFound,
            LicenseDenial::NotLicensee => Self::NotLicensee,
            LicenseDenial::LicenseInactive => Self::LicenseInactive,
            LicenseDenial::ContentNotFound => Self::ContentNotFound,
        }
    }
}

/// JSON request body.
#[derive(Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub(super) struct ContentAccessRequest {
    #[serde(default)]
    #[validate(length(min = 1))]
    license_id: String,

    #[serde(default)]
    #[validate(length(min = 1))]
    wallet_address: String,
}

/// JSON response body.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct ContentAccessResponse {
    /// Download URL of the accessed file.
    content_url: String,
    file_name: String,
    mime_type: String,
    file_size: i64,

    /// File contents as a base64 `data:` URL.
    file_data: String,

    event_id: String,
    tx_hash: String,
}

/// Access licensed content.
///
/// Every successful access generates a usage proof, logs the usage
/// on the marketplace contract and records a usage event.
///
/// The response carries the file inline as a `data:` URL, and a `contentUrl`
/// that downloads the same file through `GET /files/:hash`.
///
/// Responds with `404 Not Found` if the license, its content or the stored file
/// is missing, `403 Forbidden` if the license belongs to another wallet and
/// `400 Bad Request` if the license is inactive. No usage event is recorded
/// in any of those cases.
pub(super) async fn access(
    Extension(config): Extension<Arc<Config>>,
    Extension(chain): Extension<Arc<chain::Client>>,
    State(db): State<Arc<DatabaseConnection>>,
    ValidatedJson(request): ValidatedJson<ContentAccessRequest>,
) -> Result<ApiResponse<ContentAccessResponse>, ContentAccessError> {
    let (license, content) = licensed_content::<_, ContentAccessError>(
        &*db,
        &request.license_id,
        &request.wallet_address,
    )
    .await?;

    let upload = upload::Entity::find()
        .filter(upload::Column::FileHash.eq(&*content.content_hash))
        .one(&*db)
        .await?
        .ok_or(ContentAccessError::FileNotFound)?;

    let timestamp = db::unix_timestamp();
    let usage_proof = proof::generate_usage_proof(&license.license_id, timestamp, &proof::nonce());

    if !proof::verify_proof(&usage_proof) {
        return Err(ContentAccessError::InvalidProof);
    }

    let data = LocalStorage::new(&config.storage)
        .read(Path::new(&upload.file_path))
        .await?;

    let access = chain.access_content(&license.license_id, &usage_proof).await;

    usage_event::Entity::insert(usage_event::ActiveModel {
        event_id: ActiveValue::Set(access.event_id.clone()),
        content_id: ActiveValue::Set(content.content_id.clone()),
        license_id: ActiveValue::Set(license.license_id.clone()),
        blockchain_tx: ActiveValue::Set(Some(access.tx_hash.clone())),
        timestamp: ActiveValue::Set(timestamp),
        created_at: ActiveValue::Set(timestamp),
        ..Default::default()
    })
    .exec_without_returning(&*db)
    .await?;

    info!(
        license_id = %license.license_id,
        content_id = %content.content_id,
        event_id = %access.event_id,
        "content accessed"
    );

    let query = serde_urlencoded::to_string(&[
        ("licenseId", &*license.license_id),
        ("walletAddress", &*license.licensee_address),
    ])?;

    Ok(ApiResponse::new(ContentAccessResponse {
        content_url: format!("/files/{}?{query}", content.content_hash),
        file_data: format!("data:{};base64,{}", upload.mime_type, STANDARD.encode(&data)),
        file_name: upload.file_name,
        mime_type: upload.mime_type,
        file_size: upload.file_size,
        event_id: access.event_id,
        tx_hash: access.tx_hash,
    })
    .with_message("Content accessed successfully"))
}

#[cfg(test)]
mod tests {
    use crate::testing::{
        create_content, create_database, create_license, create_upload, test_router,
        test_router_with_storage, RequestBodyExt, ResponseBodyExt, ACCESSOR,
    };

    use assert_json::{assert_json, validators};
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use db::{
        usage_event, ConnectionTrait, DatabaseConnection, EntityTrait, PaginatorTrait, Statement,
    };
    use serde_json::json;
    use tempfile::TempDir;
    use tower::ServiceExt;

    fn hex_prefixed(val: &str) -> Result<(), String> {
        val.starts_with("0x")
            .then_some(())
            .ok_or(String::from("missing 0x prefix"))
    }

    async fn create_test_env(db: &DatabaseConnection, dir: &TempDir) {
        let path = dir.path().join("hello.txt");
        std::fs::write(&path, b"Hello, world").expect("unable to write test file");

        create_content(db, "0x01", "hash1", "Greeting", "0.5", 100).await;
        create_upload(db, "hash1", &path, "hello.txt", "text/plain").await;
        create_license(db, "0xlicense", "0x01", ACCESSOR, true).await;
        create_license(db, "0xinactive", "0x01", ACCESSOR, false).await;
    }

    fn access_request(license_id: &str, wallet_address: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/content/access")
            .header("Content-Type", "application/json")
            .body(Body::from_json(json!({
                "licenseId": license_id,
                "walletAddress": wallet_address,
            })))
            .unwrap()
    }

    #[tokio::test]
    async fn successful() {
        let db = create_database().await;
        let dir = tempfile::tempdir().unwrap();

        create_test_env(&db, &dir).await;

        let response = test_router_with_storage(db.clone(), dir.path())
            .oneshot(access_request("0xlicense", ACCESSOR))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);

        assert_json!(response.json().await, {
            "success": true,
            "message": "Content accessed successfully",
            "data": {
                "contentUrl": "/files/hash1?licenseId=0xlicense&walletAddress=0xaccessor",
                "fileName": "hello.txt",
                "mimeType": "text/plain",
                "fileSize": 12,
                "fileData": "data:text/plain;base64,SGVsbG8sIHdvcmxk",
                "eventId": validators::string(|val| hex_prefixed(val)),
                "txHash": validators::string(|val| hex_prefixed(val))
            }
        });

        let events = usage_event::Entity::find()
            .count(&db)
            .await
            .expect("unable to count usage events");

        assert_eq!(events, 1);
    }

    #[tokio::test]
    async fn content_url_is_encoded() {
        let db = create_database().await;
        let dir = tempfile::tempdir().unwrap();

        create_test_env(&db, &dir).await;
        create_license(&db, "0xshared", "0x01", "0x a&b", true).await;

        let router = test_router_with_storage(db, dir.path());

        let response = router
            .clone()
            .oneshot(access_request("0xshared", "0x a&b"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);

        let body = response.json().await;
        let content_url = body["data"]["contentUrl"].as_str().unwrap();

        assert_eq!(
            content_url,
            "/files/hash1?licenseId=0xshared&walletAddress=0x+a%26b"
        );

        let response = router
            .oneshot(
                Request::builder()
                    .uri(content_url)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.text().await, "Hello, world");
    }

    #[tokio::test]
    async fn file_not_found() {
        let db = create_database().await;

        create_content(&db, "0x01", "hash1", "Greeting", "0.5", 100).await;
        create_license(&db, "0xlicense", "0x01", ACCESSOR, true).await;

        let response = test_router(db.clone())
            .oneshot(access_request("0xlicense", ACCESSOR))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        assert_json!(response.json().await, {
            "success": false,
            "code": 404,
            "error": "File not found"
        });

        assert_eq!(usage_event::Entity::find().count(&db).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn content_not_found() {
        let db = create_database().await;

        let pragma = |enabled: &str| {
            Statement::from_string(
                db.get_database_backend(),
                format!("PRAGMA foreign_keys = {enabled}"),
            )
        };

        db.execute(pragma("OFF")).await.unwrap();
        create_license(&db, "0xorphan", "0xmissing", ACCESSOR, true).await;
        db.execute(pragma("ON")).await.unwrap();

        let response = test_router(db.clone())
            .oneshot(access_request("0xorphan", ACCESSOR))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        assert_json!(response.json().await, {
            "success": false,
            "code": 404,
            "error": "Content not found"
        });

        assert_eq!(usage_event::Entity::find().count(&db).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn wrong_licensee() {
        let db = create_database().await;
        let dir = tempfile::tempdir().unwrap();

        create_test_env(&db, &dir).await;

        let response = test_router_with_storage(db, dir.path())
            .oneshot(access_request("0xlicense", "0xsomeoneelse"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        assert_json!(response.json().await, {
            "success": false,
            "error": "Not authorized to use this license"
        });
    }

    #[tokio::test]
    async fn inactive_license() {
        let db = create_database().await;
        let dir = tempfile::tempdir().unwrap();

        create_test_env(&db, &dir).await;

        let response = test_router_with_storage(db.clone(), dir.path())
            .oneshot(access_request("0xinactive", ACCESSOR))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let events = usage_event::Entity::find()
            .count(&db)
            .await
            .expect("unable to count usage events");

        assert_eq!(events, 0);
    }

    #[tokio::test]
    async fn unknown_license() {
        let db = create_database().await;

        let response = test_router(db)
            .oneshot(access_request("0xunknown", ACCESSOR))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        assert_json!(response.json().await, {
            "success": false,
            "code": 404,
            "error": "License not found"
        });
    }

    #[tokio::test]
    async fn missing_fields() {
        let db = create_database().await;

        let response = test_router(db)
            .oneshot(access_request("", ACCESSOR))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        assert_json!(response.json().await, {
            "success": false,
            "error": "Missing required fields"
        });
    }
}
