use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Content::Table)
                    .col(
                        ColumnDef::new(Content::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Content::ContentId)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Content::CreatorAddress).string().not_null())
                    .col(ColumnDef::new(Content::ContentHash).string().not_null())
                    .col(ColumnDef::new(Content::IpfsCid).string())
                    .col(ColumnDef::new(Content::Title).string().not_null())
                    .col(ColumnDef::new(Content::Description).text())
                    .col(ColumnDef::new(Content::ContentType).string().not_null())
                    .col(ColumnDef::new(Content::FileSize).big_integer())
                    .col(ColumnDef::new(Content::PricePerUse).string().not_null())
                    .col(ColumnDef::new(Content::Tags).text())
                    .col(ColumnDef::new(Content::BlockchainTx).string())
                    .col(
                        ColumnDef::new(Content::Active)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(ColumnDef::new(Content::CreatedAt).big_integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .from(Content::Table, Content::CreatorAddress)
                            .to(crate::Users::Table, crate::Users::WalletAddress)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Content::Table).to_owned())
            .await
    }
}

/// Learn more at https://docs.rs/sea-query#iden
#[derive(Copy, Clone, Iden)]
pub(crate) enum Content {
    Table,
    Id,
    ContentId,
    CreatorAddress,
    ContentHash,
    IpfsCid,
    Title,
    Description,
    ContentType,
    FileSize,
    PricePerUse,
    Tags,
    BlockchainTx,
    Active,
    CreatedAt,
}
