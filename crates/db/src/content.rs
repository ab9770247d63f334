//! Registered content.
//!
//! Content rows mirror on-chain registrations for search and caching purposes.
//! Each content item references an upload by its [`content_hash`](Model::content_hash).

use sea_orm::entity::prelude::*;
use serde::Serialize;

/// Content model.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "content")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,

    /// Content identifier assigned on registration.
    #[sea_orm(unique)]
    pub content_id: String,

    /// Wallet address of a content creator.
    pub creator_address: String,

    /// Hex-encoded SHA-256 hash of an uploaded file.
    pub content_hash: String,

    pub ipfs_cid: Option<String>,
    pub title: String,
    pub description: Option<String>,

    /// Content category, such as `dataset` or `image`.
    pub content_type: String,

    pub file_size: Option<i64>,

    /// Decimal price charged for a single license.
    pub price_per_use: String,

    /// Comma-separated tag list.
    pub tags: Option<String>,

    /// Registration transaction hash.
    pub blockchain_tx: Option<String>,

    pub active: bool,
    pub created_at: i64,
}

impl Model {
    /// Get a numeric value of [`price_per_use`](Model::price_per_use).
    ///
    /// Unparseable prices are treated as zero.
    pub fn price(&self) -> f64 {
        self.price_per_use.trim().parse().unwrap_or(0.0)
    }
}

/// Content model relations.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::CreatorAddress",
        to = "super::user::Column::WalletAddress"
    )]
    Creator,

    #[sea_orm(has_many = "super::license::Entity")]
    Licenses,

    #[sea_orm(has_many = "super::usage_event::Entity")]
    UsageEvents,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Creator.def()
    }
}

impl Related<super::license::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Licenses.def()
    }
}

impl Related<super::usage_event::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::UsageEvents.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
