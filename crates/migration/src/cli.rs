use clap::Parser;
use sea_orm_cli::MigrateSubcommands;

/// Database schema migration tool.
///
/// Running without a subcommand applies all pending migrations.
#[derive(Parser)]
pub(crate) struct Cli {
    #[clap(subcommand)]
    pub command: Option<MigrateSubcommands>,
}
