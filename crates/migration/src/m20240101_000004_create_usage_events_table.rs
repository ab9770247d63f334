use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(UsageEvents::Table)
                    .col(
                        ColumnDef::new(UsageEvents::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(UsageEvents::EventId)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(UsageEvents::ContentId).string().not_null())
                    .col(ColumnDef::new(UsageEvents::LicenseId).string().not_null())
                    .col(ColumnDef::new(UsageEvents::BlockchainTx).string())
                    .col(ColumnDef::new(UsageEvents::Timestamp).big_integer().not_null())
                    .col(ColumnDef::new(UsageEvents::CreatedAt).big_integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .from(UsageEvents::Table, UsageEvents::ContentId)
                            .to(crate::Content::Table, crate::Content::ContentId)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(UsageEvents::Table, UsageEvents::LicenseId)
                            .to(crate::Licenses::Table, crate::Licenses::LicenseId)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(UsageEvents::Table).to_owned())
            .await
    }
}

/// Learn more at https://docs.rs/sea-query#iden
#[derive(Copy, Clone, Iden)]
pub(crate) enum UsageEvents {
    Table,
    Id,
    EventId,
    ContentId,
    LicenseId,
    BlockchainTx,
    Timestamp,
    CreatedAt,
}
