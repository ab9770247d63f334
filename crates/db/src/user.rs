//! Marketplace participant.
//!
//! Users are identified by their wallet addresses and are registered
//! implicitly on their first upload or license purchase.

use sea_orm::{entity::prelude::*, sea_query::OnConflict, ActiveValue};
use serde::Serialize;

/// User model.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub wallet_address: String,
    pub role: Role,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Role a user was registered with.
#[derive(Copy, Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize)]
#[sea_orm(rs_type = "String", db_type = "String(Some(8))")]
#[serde(rename_all = "snake_case")]
pub enum Role {
    #[sea_orm(string_value = "creator")]
    Creator,
    #[sea_orm(string_value = "accessor")]
    Accessor,
    #[sea_orm(string_value = "both")]
    Both,
}

/// User model relations.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::content::Entity")]
    Content,

    #[sea_orm(has_many = "super::license::Entity")]
    Licenses,

    #[sea_orm(has_many = "super::upload::Entity")]
    Uploads,
}

impl Related<super::content::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Content.def()
    }
}

impl Related<super::license::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Licenses.def()
    }
}

impl Related<super::upload::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Uploads.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Register a user with the provided wallet address, unless one already exists.
///
/// The role of an already registered user is left untouched.
pub async fn ensure_exists<C: ConnectionTrait>(
    db: &C,
    wallet_address: &str,
    role: Role,
) -> Result<(), DbErr> {
    let now = crate::unix_timestamp();

    Entity::insert(ActiveModel {
        wallet_address: ActiveValue::Set(wallet_address.to_string()),
        role: ActiveValue::Set(role),
        created_at: ActiveValue::Set(now),
        updated_at: ActiveValue::Set(now),
        ..Default::default()
    })
    .on_conflict(
        OnConflict::column(Column::WalletAddress)
            .do_nothing()
            .to_owned(),
    )
    .exec_without_returning(db)
    .await?;

    Ok(())
}
