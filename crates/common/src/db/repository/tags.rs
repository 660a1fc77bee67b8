use super::{is_unique_violation, Repository};
use crate::db::models::*;
use crate::errors::{AppError, Result};
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QuerySelect, Set};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A tag with the number of favorites carrying it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagCount {
    pub name: String,
    pub count: i64,
}

/// Tags are stored trimmed and lowercase
pub(crate) fn normalize_tag(name: &str) -> String {
    name.trim().to_lowercase()
}

impl Repository {
    // ========================================================================
    // Tag Operations
    // ========================================================================

    /// The user's tags in use, most used first
    pub async fn list_tags(&self, user_id: Uuid) -> Result<Vec<TagCount>> {
        let rows: Vec<(String, i64)> = TagEntity::find()
            .select_only()
            .column(TagColumn::Name)
            .column_as(Expr::col(FavoriteTagColumn::FavoriteId).count(), "count")
            .inner_join(FavoriteTagEntity)
            .filter(TagColumn::UserId.eq(user_id))
            .group_by(TagColumn::Name)
            .into_tuple()
            .all(self.read_conn())
            .await?;

        let mut tags: Vec<TagCount> = rows
            .into_iter()
            .map(|(name, count)| TagCount { name, count })
            .collect();
        tags.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));

        Ok(tags)
    }

    /// Attach a tag to one of the user's favorites, creating the tag if needed.
    ///
    /// Returns `false` when the favorite already carried the tag.
    pub async fn add_tag_to_favorite(&self, user_id: Uuid, favorite_id: Uuid, name: &str) -> Result<bool> {
        let name = normalize_tag(name);
        if name.is_empty() {
            return Err(AppError::validation("name", "Tag name must not be empty"));
        }

        if self.find_owned_favorite(user_id, favorite_id).await?.is_none() {
            return Err(AppError::FavoriteNotFound {
                id: favorite_id.to_string(),
            });
        }

        let tag = self.get_or_create_tag(user_id, &name).await?;

        let inserted = FavoriteTagEntity::insert(FavoriteTagActiveModel {
            favorite_id: Set(favorite_id),
            tag_id: Set(tag.id),
        })
        .on_conflict(
            OnConflict::columns([FavoriteTagColumn::FavoriteId, FavoriteTagColumn::TagId])
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(self.write_conn())
        .await?;

        Ok(inserted > 0)
    }

    /// Detach a tag from a favorite; the tag row itself is kept
    pub async fn remove_tag_from_favorite(&self, user_id: Uuid, favorite_id: Uuid, name: &str) -> Result<bool> {
        if self.find_owned_favorite(user_id, favorite_id).await?.is_none() {
            return Err(AppError::FavoriteNotFound {
                id: favorite_id.to_string(),
            });
        }

        let Some(tag) = self.find_tag(user_id, name).await? else {
            return Ok(false);
        };

        let result = FavoriteTagEntity::delete_many()
            .filter(FavoriteTagColumn::FavoriteId.eq(favorite_id))
            .filter(FavoriteTagColumn::TagId.eq(tag.id))
            .exec(self.write_conn())
            .await?;

        Ok(result.rows_affected > 0)
    }

    pub(super) async fn find_tag(&self, user_id: Uuid, name: &str) -> Result<Option<Tag>> {
        TagEntity::find()
            .filter(TagColumn::UserId.eq(user_id))
            .filter(TagColumn::Name.eq(normalize_tag(name)))
            .one(self.write_conn())
            .await
            .map_err(Into::into)
    }

    async fn get_or_create_tag(&self, user_id: Uuid, name: &str) -> Result<Tag> {
        if let Some(tag) = self.find_tag(user_id, name).await? {
            return Ok(tag);
        }

        let tag = TagActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id),
            name: Set(name.to_string()),
            created_at: Set(chrono::Utc::now().into()),
        };

        match tag.insert(self.write_conn()).await {
            Ok(tag) => Ok(tag),
            Err(e) if is_unique_violation(&e) => self
                .find_tag(user_id, name)
                .await?
                .ok_or_else(|| e.into()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{record, repository};
    use super::*;
    use crate::museums::Museum;

    #[tokio::test]
    async fn test_add_tag_normalises_and_is_idempotent() {
        let repo = repository().await;
        let user = Uuid::new_v4();
        let (favorite, _) = repo
            .add_favorite(user, &record(Museum::Aic, "1", "Water Lilies", "Claude Monet"))
            .await
            .unwrap();

        assert!(repo.add_tag_to_favorite(user, favorite.id, "  Serene ").await.unwrap());
        assert!(!repo.add_tag_to_favorite(user, favorite.id, "serene").await.unwrap());

        let tags = repo.list_tags(user).await.unwrap();
        assert_eq!(tags, vec![TagCount { name: "serene".into(), count: 1 }]);
    }

    #[tokio::test]
    async fn test_tag_rules() {
        let repo = repository().await;
        let user = Uuid::new_v4();
        let (favorite, _) = repo
            .add_favorite(user, &record(Museum::Met, "2", "Wheat Field", "Vincent van Gogh"))
            .await
            .unwrap();

        let empty = repo.add_tag_to_favorite(user, favorite.id, "   ").await;
        assert!(matches!(empty, Err(AppError::Validation { .. })));

        let not_mine = repo.add_tag_to_favorite(Uuid::new_v4(), favorite.id, "gold").await;
        assert!(matches!(not_mine, Err(AppError::FavoriteNotFound { .. })));

        assert!(!repo.remove_tag_from_favorite(user, favorite.id, "gold").await.unwrap());
    }

    #[tokio::test]
    async fn test_list_tags_counts_and_order() {
        let repo = repository().await;
        let user = Uuid::new_v4();
        let (a, _) = repo.add_favorite(user, &record(Museum::Aic, "a", "A", "X")).await.unwrap();
        let (b, _) = repo.add_favorite(user, &record(Museum::Aic, "b", "B", "Y")).await.unwrap();

        repo.add_tag_to_favorite(user, a.id, "blue").await.unwrap();
        repo.add_tag_to_favorite(user, b.id, "blue").await.unwrap();
        repo.add_tag_to_favorite(user, b.id, "night").await.unwrap();

        // Another user's identical tag name is separate
        let other = Uuid::new_v4();
        let (c, _) = repo.add_favorite(other, &record(Museum::Aic, "a", "A", "X")).await.unwrap();
        repo.add_tag_to_favorite(other, c.id, "blue").await.unwrap();

        let tags = repo.list_tags(user).await.unwrap();
        assert_eq!(
            tags,
            vec![
                TagCount { name: "blue".into(), count: 2 },
                TagCount { name: "night".into(), count: 1 },
            ]
        );

        assert!(repo.remove_tag_from_favorite(user, b.id, "Night").await.unwrap());
        assert_eq!(repo.list_tags(user).await.unwrap().len(), 1);
    }
}
