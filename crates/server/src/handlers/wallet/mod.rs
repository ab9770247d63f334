mod connect;
mod status;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use db::DatabaseConnection;

pub(crate) fn routes() -> Router<Arc<DatabaseConnection>> {
    Router::new()
        .route("/", get(status::status))
        .route("/connect", post(connect::connect))
        .route("/disconnect", post(connect::disconnect))
}
