//! Tag entity (user scoped, names stored lowercase)

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "tags")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub user_id: Uuid,

    #[sea_orm(column_type = "Text")]
    pub name: String,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::favorite_tag::Entity", on_delete = "Cascade")]
    FavoriteTags,
}

impl Related<super::favorite_tag::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::FavoriteTags.def()
    }
}

impl Related<super::favorite::Entity> for Entity {
    fn to() -> RelationDef {
        super::favorite_tag::Relation::Favorite.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::favorite_tag::Relation::Tag.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
