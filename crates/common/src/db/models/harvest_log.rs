//! Harvest log entity

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "harvest_logs")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    #[sea_orm(column_type = "Text")]
    pub museum: String,

    #[sea_orm(column_type = "Text")]
    pub status: String,

    pub paintings_harvested: i32,

    #[sea_orm(column_type = "Text", nullable)]
    pub message: Option<String>,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Outcome of one museum harvest run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HarvestStatus {
    Completed,
    Failed,
    Skipped,
}

impl HarvestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            HarvestStatus::Completed => "completed",
            HarvestStatus::Failed => "failed",
            HarvestStatus::Skipped => "skipped",
        }
    }
}

impl From<String> for HarvestStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "completed" => HarvestStatus::Completed,
            "skipped" => HarvestStatus::Skipped,
            _ => HarvestStatus::Failed,
        }
    }
}
