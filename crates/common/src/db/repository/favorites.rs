use super::{contains_pattern, is_unique_violation, Repository};
use crate::db::models::*;
use crate::errors::Result;
use crate::museums::PaintingRecord;
use chrono::NaiveDate;
use sea_orm::sea_query::{Expr, Func, Query};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
    Set,
};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use uuid::Uuid;

/// Optional filters for listing favorites
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FavoriteFilter {
    /// Case-insensitive substring of the artist
    pub artist: Option<String>,
    pub museum: Option<String>,
    /// Exact tag name (normalised before lookup)
    pub tag: Option<String>,
}

/// A favorite with its tag names
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FavoriteWithTags {
    #[serde(flatten)]
    pub favorite: Favorite,
    pub tags: Vec<String>,
}

/// A favorite with tags and journal entries, newest entry first
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FavoriteDetail {
    #[serde(flatten)]
    pub favorite: Favorite,
    pub tags: Vec<String>,
    pub journal_entries: Vec<JournalEntry>,
}

impl Repository {
    // ========================================================================
    // Favorite Operations
    // ========================================================================

    /// Save a painting for a user.
    ///
    /// Returns the favorite and whether it was newly created; saving the same
    /// (museum, external_id) twice returns the existing row.
    pub async fn add_favorite(&self, user_id: Uuid, record: &PaintingRecord) -> Result<(Favorite, bool)> {
        let museum = record.museum.as_str();

        if let Some(existing) = self
            .find_favorite_row(user_id, museum, &record.external_id)
            .await?
        {
            return Ok((existing, false));
        }

        let favorite = FavoriteActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id),
            external_id: Set(record.external_id.clone()),
            museum: Set(museum.to_string()),
            museum_name: Set(Some(record.museum_name.clone())),
            title: Set(record.title.clone()),
            artist: Set(record.artist.clone()),
            date_display: Set(record.date_display.clone()),
            medium: Set(record.medium.clone()),
            dimensions: Set(record.dimensions.clone()),
            description: Set(record.description.clone()),
            image_url: Set(record.image_url.clone()),
            thumbnail_url: Set(record.thumbnail_url.clone()),
            museum_url: Set(record.museum_url.clone()),
            metadata: Set(record.metadata.clone()),
            created_at: Set(chrono::Utc::now().into()),
        };

        match favorite.insert(self.write_conn()).await {
            Ok(created) => Ok((created, true)),
            // Lost a race with a concurrent save of the same painting
            Err(e) if is_unique_violation(&e) => {
                let existing = self
                    .find_favorite_row(user_id, museum, &record.external_id)
                    .await?;
                existing.map(|f| (f, false)).ok_or_else(|| e.into())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// List a user's favorites, newest first, each with its tags
    pub async fn list_favorites(&self, user_id: Uuid, filter: &FavoriteFilter) -> Result<Vec<FavoriteWithTags>> {
        let mut query = FavoriteEntity::find().filter(FavoriteColumn::UserId.eq(user_id));

        if let Some(artist) = filter.artist.as_deref().filter(|a| !a.trim().is_empty()) {
            query = query.filter(
                Expr::expr(Func::lower(Expr::col(FavoriteColumn::Artist))).like(contains_pattern(artist.trim())),
            );
        }

        if let Some(museum) = filter.museum.as_deref().filter(|m| !m.is_empty()) {
            query = query.filter(FavoriteColumn::Museum.eq(museum));
        }

        if let Some(tag) = filter.tag.as_deref() {
            let Some(tag) = self.find_tag(user_id, tag).await? else {
                return Ok(Vec::new());
            };
            query = query.filter(
                FavoriteColumn::Id.in_subquery(
                    Query::select()
                        .column(FavoriteTagColumn::FavoriteId)
                        .from(FavoriteTagEntity)
                        .and_where(FavoriteTagColumn::TagId.eq(tag.id))
                        .to_owned(),
                ),
            );
        }

        let favorites = query
            .order_by_desc(FavoriteColumn::CreatedAt)
            .order_by_asc(FavoriteColumn::Id)
            .all(self.read_conn())
            .await?;

        let ids: Vec<Uuid> = favorites.iter().map(|f| f.id).collect();
        let mut tags = self.tag_names_for(&ids).await?;

        Ok(favorites
            .into_iter()
            .map(|favorite| FavoriteWithTags {
                tags: tags.remove(&favorite.id).unwrap_or_default(),
                favorite,
            })
            .collect())
    }

    /// One favorite with tags and journal entries
    pub async fn get_favorite(&self, user_id: Uuid, favorite_id: Uuid) -> Result<Option<FavoriteDetail>> {
        let Some(favorite) = self.find_owned_favorite(user_id, favorite_id).await? else {
            return Ok(None);
        };

        let tags = self
            .tag_names_for(&[favorite.id])
            .await?
            .remove(&favorite.id)
            .unwrap_or_default();

        let journal_entries = JournalEntryEntity::find()
            .filter(JournalEntryColumn::FavoriteId.eq(favorite.id))
            .order_by_desc(JournalEntryColumn::CreatedAt)
            .all(self.read_conn())
            .await?;

        Ok(Some(FavoriteDetail {
            favorite,
            tags,
            journal_entries,
        }))
    }

    /// The user's favorite for a museum item, used to enrich painting detail
    pub async fn find_favorite_by_external_id(
        &self,
        user_id: Uuid,
        museum: &str,
        external_id: &str,
    ) -> Result<Option<FavoriteWithTags>> {
        let Some(favorite) = self.find_favorite_row(user_id, museum, external_id).await? else {
            return Ok(None);
        };

        let tags = self
            .tag_names_for(&[favorite.id])
            .await?
            .remove(&favorite.id)
            .unwrap_or_default();

        Ok(Some(FavoriteWithTags { favorite, tags }))
    }

    /// Delete a favorite; journal entries and tag links go with it
    pub async fn delete_favorite(&self, user_id: Uuid, favorite_id: Uuid) -> Result<bool> {
        let result = FavoriteEntity::delete_many()
            .filter(FavoriteColumn::Id.eq(favorite_id))
            .filter(FavoriteColumn::UserId.eq(user_id))
            .exec(self.write_conn())
            .await?;

        Ok(result.rows_affected > 0)
    }

    /// Deterministic pick among the user's favorites for `date`.
    ///
    /// The same user sees the same painting all day; a new favorite can shift
    /// the pick.
    pub async fn painting_of_the_day(&self, user_id: Uuid, date: NaiveDate) -> Result<Option<Favorite>> {
        let query = FavoriteEntity::find().filter(FavoriteColumn::UserId.eq(user_id));

        let total = query.clone().count(self.read_conn()).await?;
        if total == 0 {
            return Ok(None);
        }

        let mut hasher = Sha256::new();
        hasher.update(user_id.as_bytes());
        hasher.update(date.to_string().as_bytes());
        let digest = hasher.finalize();
        let mut seed = [0u8; 8];
        seed.copy_from_slice(&digest[..8]);
        let index = u64::from_be_bytes(seed) % total;

        query
            .order_by_asc(FavoriteColumn::CreatedAt)
            .order_by_asc(FavoriteColumn::Id)
            .offset(index)
            .limit(1)
            .one(self.read_conn())
            .await
            .map_err(Into::into)
    }

    pub(super) async fn find_owned_favorite(&self, user_id: Uuid, favorite_id: Uuid) -> Result<Option<Favorite>> {
        FavoriteEntity::find_by_id(favorite_id)
            .filter(FavoriteColumn::UserId.eq(user_id))
            .one(self.read_conn())
            .await
            .map_err(Into::into)
    }

    async fn find_favorite_row(&self, user_id: Uuid, museum: &str, external_id: &str) -> Result<Option<Favorite>> {
        FavoriteEntity::find()
            .filter(FavoriteColumn::UserId.eq(user_id))
            .filter(FavoriteColumn::Museum.eq(museum))
            .filter(FavoriteColumn::ExternalId.eq(external_id))
            .one(self.write_conn())
            .await
            .map_err(Into::into)
    }

    /// Tag names per favorite id, alphabetical
    async fn tag_names_for(&self, favorite_ids: &[Uuid]) -> Result<HashMap<Uuid, Vec<String>>> {
        if favorite_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let links = FavoriteTagEntity::find()
            .filter(FavoriteTagColumn::FavoriteId.is_in(favorite_ids.iter().copied()))
            .find_also_related(TagEntity)
            .all(self.read_conn())
            .await?;

        let mut names: HashMap<Uuid, Vec<String>> = HashMap::new();
        for (link, tag) in links {
            if let Some(tag) = tag {
                names.entry(link.favorite_id).or_default().push(tag.name);
            }
        }
        for list in names.values_mut() {
            list.sort();
        }

        Ok(names)
    }
}
