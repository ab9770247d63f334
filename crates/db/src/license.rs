//! Content license.
//!
//! A license grants its licensee the right to access a single content item.

use sea_orm::entity::prelude::*;
use serde::Serialize;

/// License model.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "licenses")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub license_id: String,
    pub content_id: String,
    pub licensee_address: String,
    pub purchase_time: i64,
    pub blockchain_tx: Option<String>,
    pub active: bool,
    pub created_at: i64,
}

/// License model relations.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::content::Entity",
        from = "Column::ContentId",
        to = "super::content::Column::ContentId"
    )]
    Content,

    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::LicenseeAddress",
        to = "super::user::Column::WalletAddress"
    )]
    Licensee,

    #[sea_orm(has_many = "super::usage_event::Entity")]
    UsageEvents,
}

impl Related<super::content::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Content.def()
    }
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Licensee.def()
    }
}

impl Related<super::usage_event::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::UsageEvents.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
