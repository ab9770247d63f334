//! Uploaded file stored in the local upload directory.
//!
//! Uploads are unique by their file hash, which prevents the same file
//! from being registered twice.

use sea_orm::entity::prelude::*;

/// Upload model.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "uploads")]
pub struct Model {
    /// Unique upload identifier.
    #[sea_orm(primary_key)]
    pub id: i64,

    /// Hex-encoded SHA-256 hash of file contents.
    #[sea_orm(unique)]
    pub file_hash: String,

    /// Path to a stored file.
    pub file_path: String,

    /// Original file name, as provided by an uploader.
    pub file_name: String,

    /// File size, in bytes.
    pub file_size: i64,

    pub mime_type: String,

    /// Uploader wallet address.
    pub uploader_address: String,

    pub created_at: i64,
}

/// Upload model relations.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UploaderAddress",
        to = "super::user::Column::WalletAddress"
    )]
    Uploader,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Uploader.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
