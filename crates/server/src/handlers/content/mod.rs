mod access;
mod details;
mod list;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use db::DatabaseConnection;

pub(crate) fn routes() -> Router<Arc<DatabaseConnection>> {
    Router::new()
        .route("/", get(list::list))
        .route("/access", post(access::access))
        .route("/:id", get(details::details))
}
