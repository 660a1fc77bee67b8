use super::Repository;
use crate::db::models::*;
use crate::errors::{AppError, Result};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, IntoActiveModel, QueryFilter, QueryOrder, Set};
use uuid::Uuid;

impl Repository {
    // ========================================================================
    // Journal Operations
    // ========================================================================

    /// Entries on one of the user's favorites, newest first
    pub async fn list_journal_entries(&self, user_id: Uuid, favorite_id: Uuid) -> Result<Vec<JournalEntry>> {
        self.require_favorite(user_id, favorite_id).await?;

        JournalEntryEntity::find()
            .filter(JournalEntryColumn::FavoriteId.eq(favorite_id))
            .filter(JournalEntryColumn::UserId.eq(user_id))
            .order_by_desc(JournalEntryColumn::CreatedAt)
            .order_by_desc(JournalEntryColumn::Id)
            .all(self.read_conn())
            .await
            .map_err(Into::into)
    }

    /// Write a new entry; entries are private unless `is_public` is set
    pub async fn add_journal_entry(
        &self,
        user_id: Uuid,
        favorite_id: Uuid,
        entry_text: String,
        is_public: Option<bool>,
    ) -> Result<JournalEntry> {
        if entry_text.trim().is_empty() {
            return Err(AppError::validation("entry_text", "Journal entry must not be empty"));
        }

        self.require_favorite(user_id, favorite_id).await?;

        let now = chrono::Utc::now();
        let entry = JournalEntryActiveModel {
            id: Set(Uuid::new_v4()),
            favorite_id: Set(favorite_id),
            user_id: Set(user_id),
            entry_text: Set(entry_text),
            is_public: Set(is_public.unwrap_or(false)),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };

        entry.insert(self.write_conn()).await.map_err(Into::into)
    }

    /// Edit text and/or visibility; `None` when the entry is not the user's
    pub async fn update_journal_entry(
        &self,
        user_id: Uuid,
        entry_id: Uuid,
        entry_text: Option<String>,
        is_public: Option<bool>,
    ) -> Result<Option<JournalEntry>> {
        if matches!(entry_text.as_deref(), Some(text) if text.trim().is_empty()) {
            return Err(AppError::validation("entry_text", "Journal entry must not be empty"));
        }

        let Some(entry) = JournalEntryEntity::find_by_id(entry_id)
            .filter(JournalEntryColumn::UserId.eq(user_id))
            .one(self.write_conn())
            .await?
        else {
            return Ok(None);
        };

        let mut active = entry.into_active_model();
        if let Some(text) = entry_text {
            active.entry_text = Set(text);
        }
        if let Some(public) = is_public {
            active.is_public = Set(public);
        }
        active.updated_at = Set(chrono::Utc::now().into());

        Ok(Some(active.update(self.write_conn()).await?))
    }

    pub async fn delete_journal_entry(&self, user_id: Uuid, entry_id: Uuid) -> Result<bool> {
        let result = JournalEntryEntity::delete_many()
            .filter(JournalEntryColumn::Id.eq(entry_id))
            .filter(JournalEntryColumn::UserId.eq(user_id))
            .exec(self.write_conn())
            .await?;

        Ok(result.rows_affected > 0)
    }

    async fn require_favorite(&self, user_id: Uuid, favorite_id: Uuid) -> Result<Favorite> {
        self.find_owned_favorite(user_id, favorite_id)
            .await?
            .ok_or_else(|| AppError::FavoriteNotFound {
                id: favorite_id.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{record, repository};
    use super::*;
    use crate::museums::Museum;

    #[tokio::test]
    async fn test_journal_lifecycle() {
        let repo = repository().await;
        let user = Uuid::new_v4();
        let (favorite, _) = repo
            .add_favorite(user, &record(Museum::Smk, "KMS3716", "Hip, Hip, Hurrah!", "P.S. Krøyer"))
            .await
            .unwrap();

        let first = repo
            .add_journal_entry(user, favorite.id, "First visit".into(), None)
            .await
            .unwrap();
        assert!(!first.is_public);

        let second = repo
            .add_journal_entry(user, favorite.id, "Came back".into(), Some(true))
            .await
            .unwrap();

        let entries = repo.list_journal_entries(user, favorite.id).await.unwrap();
        assert_eq!(entries.len(), 2);
        assert!(entries.iter().any(|e| e.id == second.id && e.is_public));

        let updated = repo
            .update_journal_entry(user, first.id, Some("First visit, rainy".into()), None)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.entry_text, "First visit, rainy");
        assert!(!updated.is_public);
        assert!(updated.updated_at >= first.updated_at);

        assert!(repo.delete_journal_entry(user, first.id).await.unwrap());
        assert!(!repo.delete_journal_entry(user, first.id).await.unwrap());
        assert_eq!(repo.list_journal_entries(user, favorite.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_journal_is_owner_scoped() {
        let repo = repository().await;
        let owner = Uuid::new_v4();
        let stranger = Uuid::new_v4();
        let (favorite, _) = repo
            .add_favorite(owner, &record(Museum::Aic, "7", "Paris Street", "Gustave Caillebotte"))
            .await
            .unwrap();
        let entry = repo
            .add_journal_entry(owner, favorite.id, "Umbrellas".into(), None)
            .await
            .unwrap();

        let add = repo
            .add_journal_entry(stranger, favorite.id, "Mine now".into(), None)
            .await;
        assert!(matches!(add, Err(AppError::FavoriteNotFound { .. })));

        let list = repo.list_journal_entries(stranger, favorite.id).await;
        assert!(matches!(list, Err(AppError::FavoriteNotFound { .. })));

        assert!(repo
            .update_journal_entry(stranger, entry.id, Some("x".into()), None)
            .await
            .unwrap()
            .is_none());
        assert!(!repo.delete_journal_entry(stranger, entry.id).await.unwrap());

        let blank = repo.add_journal_entry(owner, favorite.id, "  ".into(), None).await;
        assert!(matches!(blank, Err(AppError::Validation { .. })));
    }
}
