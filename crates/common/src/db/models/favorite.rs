//! Favorite entity
//!
//! Painting fields are copied onto the row so a favorite still renders when
//! the painting is missing from the local catalogue.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "favorites")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub user_id: Uuid,

    #[sea_orm(column_type = "Text")]
    pub external_id: String,

    #[sea_orm(column_type = "Text")]
    pub museum: String,

    #[sea_orm(column_type = "Text", nullable)]
    pub museum_name: Option<String>,

    #[sea_orm(column_type = "Text")]
    pub title: String,

    #[sea_orm(column_type = "Text")]
    pub artist: String,

    #[sea_orm(column_type = "Text", nullable)]
    pub date_display: Option<String>,

    #[sea_orm(column_type = "Text", nullable)]
    pub medium: Option<String>,

    #[sea_orm(column_type = "Text", nullable)]
    pub dimensions: Option<String>,

    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,

    #[sea_orm(column_type = "Text", nullable)]
    pub image_url: Option<String>,

    #[sea_orm(column_type = "Text", nullable)]
    pub thumbnail_url: Option<String>,

    #[sea_orm(column_type = "Text", nullable)]
    pub museum_url: Option<String>,

    #[sea_orm(column_type = "JsonBinary")]
    pub metadata: Json,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::journal_entry::Entity", on_delete = "Cascade")]
    JournalEntries,

    #[sea_orm(has_many = "super::favorite_tag::Entity", on_delete = "Cascade")]
    FavoriteTags,
}

impl Related<super::journal_entry::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::JournalEntries.def()
    }
}

impl Related<super::favorite_tag::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::FavoriteTags.def()
    }
}

impl Related<super::tag::Entity> for Entity {
    fn to() -> RelationDef {
        super::favorite_tag::Relation::Tag.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::favorite_tag::Relation::Favorite.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
