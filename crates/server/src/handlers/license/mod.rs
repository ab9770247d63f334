mod list;
mod purchase;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use db::DatabaseConnection;

pub(crate) fn routes() -> Router<Arc<DatabaseConnection>> {
    Router::new().route("/purchase", post(purchase::purchase))
}

/// Routes for license listings, mounted separately from license purchases.
pub(crate) fn list_routes() -> Router<Arc<DatabaseConnection>> {
    Router::new().route("/:address", get(list::list))
}
