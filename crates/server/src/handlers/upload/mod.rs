mod create;

use std::sync::Arc;

use axum::{extract::DefaultBodyLimit, routing::post, Router};
use common::config::Config;
use db::DatabaseConnection;

pub(crate) fn routes(config: &Config) -> Router<Arc<DatabaseConnection>> {
    Router::new()
        .route("/", post(create::upload))
        .layer(DefaultBodyLimit::max(config.storage.max_upload_size))
}
