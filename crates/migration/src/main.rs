mod cli;

use std::error::Error;

use clap::Parser;
use cli::Cli;
use common::{config::Config, logging};
use migration::{
    cli::run_migrate,
    sea_orm::{ConnectionTrait, Database},
    MigratorTrait,
};
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    let config = Config::new()?;

    logging::init(&config);

    info!("connecting to database");
    let db = Database::connect(&config.database.url).await?;
    info!(backend = ?db.get_database_backend(), "database connection established");

    if cli.command.is_none() {
        let pending = migration::Migrator::get_pending_migrations(&db).await?;
        info!(pending = pending.len(), "applying pending migrations");
    }

    run_migrate(migration::Migrator, &db, cli.command, false).await?;

    Ok(())
}
