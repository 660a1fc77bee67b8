use super::Repository;
use crate::db::models::*;
use crate::errors::Result;
use sea_orm::sea_query::OnConflict;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, Set};
use serde_json::Value;
use std::time::Duration;

impl Repository {
    // ========================================================================
    // API Cache Operations
    // ========================================================================

    /// Cached museum response; an expired row is removed and reported as a miss
    pub async fn get_cached_response(&self, cache_key: &str) -> Result<Option<Value>> {
        let Some(entry) = ApiCacheEntity::find_by_id(cache_key.to_string())
            .one(self.read_conn())
            .await?
        else {
            return Ok(None);
        };

        if entry.expires_at <= chrono::Utc::now() {
            ApiCacheEntity::delete_by_id(cache_key.to_string())
                .exec(self.write_conn())
                .await?;
            return Ok(None);
        }

        Ok(Some(entry.response_data))
    }

    pub async fn put_cached_response(&self, cache_key: &str, response: Value, ttl: Duration) -> Result<()> {
        let now = chrono::Utc::now();
        let ttl = chrono::Duration::from_std(ttl).unwrap_or(chrono::Duration::zero());

        let entry = ApiCacheActiveModel {
            cache_key: Set(cache_key.to_string()),
            response_data: Set(response),
            expires_at: Set((now + ttl).into()),
            created_at: Set(now.into()),
        };

        ApiCacheEntity::insert(entry)
            .on_conflict(
                OnConflict::column(ApiCacheColumn::CacheKey)
                    .update_columns([
                        ApiCacheColumn::ResponseData,
                        ApiCacheColumn::ExpiresAt,
                        ApiCacheColumn::CreatedAt,
                    ])
                    .to_owned(),
            )
            .exec_without_returning(self.write_conn())
            .await?;

        Ok(())
    }

    /// Remove entries that expired more than `retention_days` ago
    pub async fn purge_api_cache(&self, retention_days: i64) -> Result<u64> {
        let cutoff: chrono::DateTime<chrono::FixedOffset> =
            (chrono::Utc::now() - chrono::Duration::days(retention_days)).into();

        let result = ApiCacheEntity::delete_many()
            .filter(ApiCacheColumn::ExpiresAt.lt(cutoff))
            .exec(self.write_conn())
            .await?;

        Ok(result.rows_affected)
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::repository;
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_cache_round_trip_and_overwrite() {
        let repo = repository().await;

        assert!(repo.get_cached_response("k").await.unwrap().is_none());

        repo.put_cached_response("k", json!({"v": 1}), Duration::from_secs(60))
            .await
            .unwrap();
        repo.put_cached_response("k", json!({"v": 2}), Duration::from_secs(60))
            .await
            .unwrap();

        assert_eq!(repo.get_cached_response("k").await.unwrap(), Some(json!({"v": 2})));
    }

    #[tokio::test]
    async fn test_expired_entry_is_a_miss() {
        let repo = repository().await;
        repo.put_cached_response("old", json!([1, 2]), Duration::ZERO)
            .await
            .unwrap();

        assert!(repo.get_cached_response("old").await.unwrap().is_none());
        assert!(ApiCacheEntity::find_by_id("old".to_string())
            .one(repo.read_conn())
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_purge_keeps_recent_entries() {
        let repo = repository().await;
        repo.put_cached_response("fresh", json!(1), Duration::from_secs(3600))
            .await
            .unwrap();

        let stale = ApiCacheActiveModel {
            cache_key: Set("stale".to_string()),
            response_data: Set(json!(0)),
            expires_at: Set((chrono::Utc::now() - chrono::Duration::days(30)).into()),
            created_at: Set((chrono::Utc::now() - chrono::Duration::days(31)).into()),
        };
        ApiCacheEntity::insert(stale)
            .exec_without_returning(repo.write_conn())
            .await
            .unwrap();

        assert_eq!(repo.purge_api_cache(7).await.unwrap(), 1);
        assert!(repo.get_cached_response("fresh").await.unwrap().is_some());
    }
}
