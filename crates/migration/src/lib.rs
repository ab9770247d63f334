pub use sea_orm_migration::prelude::*;

mod m20240101_000001_create_users_table;
mod m20240101_000002_create_content_table;
mod m20240101_000003_create_licenses_table;
mod m20240101_000004_create_usage_events_table;
mod m20240101_000005_create_uploads_table;
mod m20240101_000006_create_lookup_indexes;

pub(crate) use m20240101_000001_create_users_table::Users;
pub(crate) use m20240101_000002_create_content_table::Content;
pub(crate) use m20240101_000003_create_licenses_table::Licenses;
pub(crate) use m20240101_000004_create_usage_events_table::UsageEvents;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_users_table::Migration),
            Box::new(m20240101_000002_create_content_table::Migration),
            Box::new(m20240101_000003_create_licenses_table::Migration),
            Box::new(m20240101_000004_create_usage_events_table::Migration),
            Box::new(m20240101_000005_create_uploads_table::Migration),
            Box::new(m20240101_000006_create_lookup_indexes::Migration),
        ]
    }
}
