use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Uploads::Table)
                    .col(
                        ColumnDef::new(Uploads::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Uploads::FileHash)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Uploads::FilePath).string().not_null())
                    .col(ColumnDef::new(Uploads::FileName).string().not_null())
                    .col(ColumnDef::new(Uploads::FileSize).big_integer().not_null())
                    .col(ColumnDef::new(Uploads::MimeType).string().not_null())
                    .col(ColumnDef::new(Uploads::UploaderAddress).string().not_null())
                    .col(ColumnDef::new(Uploads::CreatedAt).big_integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .from(Uploads::Table, Uploads::UploaderAddress)
                            .to(crate::Users::Table, crate::Users::WalletAddress)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Uploads::Table).to_owned())
            .await
    }
}

/// Learn more at https://docs.rs/sea-query#iden
#[derive(Iden)]
enum Uploads {
    Table,
    Id,
    FileHash,
    FilePath,
    FileName,
    FileSize,
    MimeType,
    UploaderAddress,
    CreatedAt,
}
