use sea_orm_migration::prelude::*;

use crate::{Content, Licenses, UsageEvents};

#[derive(DeriveMigrationName)]
pub struct Migration;

/// Build create and drop statements of a single-column index.
fn index<T, C>(name: &str, table: T, column: C) -> (IndexCreateStatement, IndexDropStatement)
where
    T: Iden + Copy + 'static,
    C: Iden + 'static,
{
    (
        Index::create()
            .name(name)
            .table(table)
            .col(column)
            .to_owned(),
        Index::drop().name(name).table(table).to_owned(),
    )
}

fn indexes() -> Vec<(IndexCreateStatement, IndexDropStatement)> {
    vec![
        index("idx_content_creator", Content::Table, Content::CreatorAddress),
        index("idx_content_type", Content::Table, Content::ContentType),
        index("idx_content_active", Content::Table, Content::Active),
        index(
            "idx_licenses_licensee",
            Licenses::Table,
            Licenses::LicenseeAddress,
        ),
        index("idx_licenses_content", Licenses::Table, Licenses::ContentId),
        index("idx_usage_content", UsageEvents::Table, UsageEvents::ContentId),
        index("idx_usage_license", UsageEvents::Table, UsageEvents::LicenseId),
        index(
            "idx_usage_timestamp",
            UsageEvents::Table,
            UsageEvents::Timestamp,
        ),
    ]
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for (create, _) in indexes() {
            manager.create_index(create).await?;
        }

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for (_, drop) in indexes() {
            manager.drop_index(drop).await?;
        }

        Ok(())
    }
}
