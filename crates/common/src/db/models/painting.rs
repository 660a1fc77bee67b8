//! Painting entity: harvested museum record, keyed by (museum, external_id)

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "paintings")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

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

    /// Source-specific extras (department, culture, credit line...)
    #[sea_orm(column_type = "JsonBinary")]
    pub metadata: Json,

    pub created_at: DateTimeWithTimeZone,

    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
