mod handlers;
mod licensing;
mod pagination;
mod response;
mod validation;

#[cfg(test)]
mod testing;

use std::sync::Arc;

use axum::{middleware::from_fn, Extension, Router, Server};
use common::{chain, config::Config, logging};
use db::{Database, DatabaseConnection};
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let config = Config::new()?;

    logging::init(&config);

    let Some(server_config) = config.server.as_ref() else {
        return Err(anyhow::Error::msg("unable to load server config"));
    };

    info!("connecting to database");
    let database = Arc::new(Database::connect(&config.database.url).await?);

    let chain = Arc::new(chain::Client::new(&config.chain));
    let wallet = chain.connect_wallet().await;
    info!(
        network = ?chain.network(),
        address = ?wallet.address,
        kind = ?wallet.kind,
        "blockchain client ready"
    );
    chain.spawn_event_listener();

    let server = Server::bind(&server_config.address);
    let config = Arc::new(config);

    server
        .serve(app_router(database, config, chain).into_make_service())
        .await?;

    Ok(())
}

fn app_router(
    database: Arc<DatabaseConnection>,
    config: Arc<Config>,
    chain: Arc<chain::Client>,
) -> Router {
    Router::new()
        .nest("/content", handlers::content::routes())
        .nest("/creator", handlers::creator::routes())
        .nest("/files", handlers::files::routes())
        .nest("/license", handlers::license::routes())
        .nest("/licenses", handlers::license::list_routes())
        .nest("/stats", handlers::stats::routes())
        .nest("/upload", handlers::upload::routes(&config))
        .nest("/wallet", handlers::wallet::routes())
        .layer(from_fn(response::error_envelope))
        .layer(Extension(chain))
        .layer(Extension(config))
        .with_state(database)
}
