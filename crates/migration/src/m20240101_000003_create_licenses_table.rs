use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Licenses::Table)
                    .col(
                        ColumnDef::new(Licenses::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Licenses::LicenseId)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Licenses::ContentId).string().not_null())
                    .col(ColumnDef::new(Licenses::LicenseeAddress).string().not_null())
                    .col(ColumnDef::new(Licenses::PurchaseTime).big_integer().not_null())
                    .col(ColumnDef::new(Licenses::BlockchainTx).string())
                    .col(
                        ColumnDef::new(Licenses::Active)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(ColumnDef::new(Licenses::CreatedAt).big_integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .from(Licenses::Table, Licenses::ContentId)
                            .to(crate::Content::Table, crate::Content::ContentId)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Licenses::Table, Licenses::LicenseeAddress)
                            .to(crate::Users::Table, crate::Users::WalletAddress)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Licenses::Table).to_owned())
            .await
    }
}

/// Learn more at https://docs.rs/sea-query#iden
#[derive(Copy, Clone, Iden)]
pub(crate) enum Licenses {
    Table,
    Id,
    LicenseId,
    ContentId,
    LicenseeAddress,
    PurchaseTime,
    BlockchainTx,
    Active,
    CreatedAt,
}
