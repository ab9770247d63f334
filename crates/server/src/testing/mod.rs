use std::{error::Error, path::Path, sync::Arc};

use axum::{async_trait, Router};
use common::{chain, config::Config};
use db::{
    content, license, upload, user, ActiveValue, Database, DatabaseConnection, EntityTrait,
};
use hyper::body::{self, Bytes, HttpBody};
use migration::MigratorTrait;
use serde::Serialize;

pub(crate) const CREATOR: &str = "0xcreator";
pub(crate) const ACCESSOR: &str = "0xaccessor";

pub(crate) async fn create_database() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("unable to create test database");

    migration::Migrator::up(&db, None)
        .await
        .expect("unable to run migrations");

    db
}

/// Application router with simulated blockchain client.
pub(crate) fn test_router(db: DatabaseConnection) -> Router {
    crate::app_router(
        Arc::new(db),
        Arc::new(Config::for_tests()),
        Arc::new(chain::Client::new(&Default::default())),
    )
}

/// Application router that stores uploaded files in the provided directory.
pub(crate) fn test_router_with_storage(db: DatabaseConnection, upload_dir: &Path) -> Router {
    let mut config = Config::for_tests();
    config.storage.upload_dir = upload_dir.to_path_buf();

    test_router_with_config(db, config)
}

/// Application router built over the provided configuration.
pub(crate) fn test_router_with_config(db: DatabaseConnection, config: Config) -> Router {
    crate::app_router(
        Arc::new(db),
        Arc::new(config),
        Arc::new(chain::Client::new(&Default::default())),
    )
}

pub(crate) async fn create_user(db: &DatabaseConnection, address: &str, role: user::Role) {
    user::ensure_exists(db, address, role)
        .await
        .expect("unable to create user");
}

pub(crate) async fn create_content(
    db: &DatabaseConnection,
    content_id: &str,
    content_hash: &str,
    title: &str,
    price_per_use: &str,
    created_at: i64,
) -> content::Model {
    create_user(db, CREATOR, user::Role::Creator).await;

    content::Entity::insert(content::ActiveModel {
        content_id: ActiveValue::Set(content_id.to_string()),
        creator_address: ActiveValue::Set(String::from(CREATOR)),
        content_hash: ActiveValue::Set(content_hash.to_string()),
        title: ActiveValue::Set(title.to_string()),
        description: ActiveValue::Set(Some(format!("{title} description"))),
        content_type: ActiveValue::Set(String::from("text")),
        file_size: ActiveValue::Set(Some(12)),
        price_per_use: ActiveValue::Set(price_per_use.to_string()),
        tags: ActiveValue::Set(Some(String::from("test,sample"))),
        blockchain_tx: ActiveValue::Set(Some(String::from("0xtx"))),
        active: ActiveValue::Set(true),
        created_at: ActiveValue::Set(created_at),
        ..Default::default()
    })
    .exec_with_returning(db)
    .await
    .expect("unable to create content")
}

pub(crate) async fn create_license(
    db: &DatabaseConnection,
    license_id: &str,
    content_id: &str,
    licensee: &str,
    active: bool,
) {
    create_user(db, licensee, user::Role::Accessor).await;

    license::Entity::insert(license::ActiveModel {
        license_id: ActiveValue::Set(license_id.to_string()),
        content_id: ActiveValue::Set(content_id.to_string()),
        licensee_address: ActiveValue::Set(licensee.to_string()),
        purchase_time: ActiveValue::Set(1672531200),
        blockchain_tx: ActiveValue::Set(Some(String::from("0xtx"))),
        active: ActiveValue::Set(active),
        created_at: ActiveValue::Set(1672531200),
        ..Default::default()
    })
    .exec_without_returning(db)
    .await
    .expect("unable to create license");
}

pub(crate) async fn create_upload(
    db: &DatabaseConnection,
    file_hash: &str,
    file_path: &Path,
    file_name: &str,
    mime_type: &str,
) {
    create_user(db, CREATOR, user::Role::Creator).await;

    upload::Entity::insert(upload::ActiveModel {
        file_hash: ActiveValue::Set(file_hash.to_string()),
        file_path: ActiveValue::Set(file_path.display().to_string()),
        file_name: ActiveValue::Set(file_name.to_string()),
        file_size: ActiveValue::Set(12),
        mime_type: ActiveValue::Set(mime_type.to_string()),
        uploader_address: ActiveValue::Set(String::from(CREATOR)),
        created_at: ActiveValue::Set(1672531200),
        ..Default::default()
    })
    .exec_without_returning(db)
    .await
    .expect("unable to create upload");
}

pub(crate) trait RequestBodyExt: Sized {
    fn from_json<B: Serialize>(val: B) -> Self;
}

impl<T> RequestBodyExt for T
where
    T: HttpBody + From<Vec<u8>>,
{
    fn from_json<B: Serialize>(val: B) -> Self {
        T::from(serde_json::to_vec(&val).expect("unable to serialize"))
    }
}

#[async_trait(?Send)]
pub(crate) trait ResponseBodyExt {
    async fn bytes(self) -> Bytes;

    async fn text(self) -> String;

    async fn json(self) -> serde_json::Value;
}

#[async_trait(?Send)]
impl<T> ResponseBodyExt for T
where
    T: HttpBody,
    T::Error: Error,
{
    async fn bytes(self) -> Bytes {
        body::to_bytes(self)
            .await
            .expect("unable to convert to bytes")
    }

    async fn text(self) -> String {
        String::from_utf8(self.bytes().await.to_vec()).expect("unable to convert to text")
    }

    async fn json(self) -> serde_json::Value {
        serde_json::from_slice(&self.bytes().await).expect("unable to convert to json")
    }
}
