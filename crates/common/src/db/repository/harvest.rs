use super::Repository;
use crate::db::models::*;
use crate::errors::Result;
use sea_orm::{ActiveModelTrait, EntityTrait, QueryOrder, QuerySelect, Set};
use uuid::Uuid;

impl Repository {
    // ========================================================================
    // Harvest Log Operations
    // ========================================================================

    pub async fn log_harvest(
        &self,
        museum: &str,
        status: HarvestStatus,
        paintings_harvested: usize,
        message: Option<String>,
    ) -> Result<HarvestLog> {
        let log = HarvestLogActiveModel {
            id: Set(Uuid::new_v4()),
            museum: Set(museum.to_string()),
            status: Set(status.as_str().to_string()),
            paintings_harvested: Set(i32::try_from(paintings_harvested).unwrap_or(i32::MAX)),
            message: Set(message),
            created_at: Set(chrono::Utc::now().into()),
        };

        log.insert(self.write_conn()).await.map_err(Into::into)
    }

    /// Most recent harvest runs first
    pub async fn recent_harvest_logs(&self, limit: u64) -> Result<Vec<HarvestLog>> {
        HarvestLogEntity::find()
            .order_by_desc(HarvestLogColumn::CreatedAt)
            .limit(limit)
            .all(self.read_conn())
            .await
            .map_err(Into::into)
    }
}
