use super::{is_unique_violation, Repository};
use crate::db::models::*;
use crate::errors::{AppError, Result};
use rand::Rng;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, IntoActiveModel, QueryFilter, QueryOrder, QuerySelect, Set,
    TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

const MAX_NAME_CHARS: usize = 200;

/// Painting snapshot to place in a collection
#[derive(Debug, Clone, Deserialize)]
pub struct NewCollectionItem {
    pub external_id: String,
    pub museum: String,
    pub title: String,
    pub artist: String,
    pub image_url: Option<String>,
    pub thumbnail_url: Option<String>,
    pub note: Option<String>,
}

/// Partial update; `None` leaves a field unchanged
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CollectionUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub is_public: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionSummary {
    #[serde(flatten)]
    pub collection: Collection,
    pub item_count: i64,
}

/// Collection with items in display order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionWithItems {
    #[serde(flatten)]
    pub collection: Collection,
    pub items: Vec<CollectionItem>,
}

/// URL slug: lowercase words joined by '-', plus a random suffix
pub(crate) fn make_slug(name: &str) -> String {
    let mut base = String::with_capacity(name.len());
    for c in name.trim().to_lowercase().chars() {
        if c.is_alphanumeric() {
            base.push(c);
        } else if !base.is_empty() && !base.ends_with('-') {
            base.push('-');
        }
    }
    let base = base.trim_end_matches('-');

    let suffix: u32 = rand::thread_rng().gen_range(0..0x100_0000);
    if base.is_empty() {
        format!("collection-{:06x}", suffix)
    } else {
        format!("{}-{:06x}", base, suffix)
    }
}

/// Trimmed collection name, 1 to 200 characters
fn validate_name(name: &str) -> Result<&str> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::validation("name", "Collection name must not be empty"));
    }
    if name.chars().count() > MAX_NAME_CHARS {
        return Err(AppError::validation(
            "name",
            format!("Collection name must be at most {} characters", MAX_NAME_CHARS),
        ));
    }
    Ok(name)
}

impl Repository {
    // ========================================================================
    // Collection Operations
    // ========================================================================

    pub async fn create_collection(
        &self,
        user_id: Uuid,
        name: &str,
        description: Option<String>,
        is_public: bool,
    ) -> Result<Collection> {
        let name = validate_name(name)?;

        let now = chrono::Utc::now();
        // A slug collision is unlikely; one retry with a fresh suffix
        for attempt in 0..2 {
            let collection = CollectionActiveModel {
                id: Set(Uuid::new_v4()),
                user_id: Set(user_id),
                name: Set(name.to_string()),
                description: Set(description.clone()),
                is_public: Set(is_public),
                slug: Set(make_slug(name)),
                created_at: Set(now.into()),
                updated_at: Set(now.into()),
            };

            match collection.insert(self.write_conn()).await {
                Ok(created) => return Ok(created),
                Err(e) if attempt == 0 && is_unique_violation(&e) => continue,
                Err(e) => return Err(e.into()),
            }
        }

        Err(AppError::Duplicate {
            message: "Could not allocate a unique collection slug".to_string(),
        })
    }

    /// The user's collections, most recently changed first, with item counts
    pub async fn list_collections(&self, user_id: Uuid) -> Result<Vec<CollectionSummary>> {
        let collections = CollectionEntity::find()
            .filter(CollectionColumn::UserId.eq(user_id))
            .order_by_desc(CollectionColumn::UpdatedAt)
            .order_by_asc(CollectionColumn::Id)
            .all(self.read_conn())
            .await?;

        if collections.is_empty() {
            return Ok(Vec::new());
        }

        let counts: HashMap<Uuid, i64> = CollectionItemEntity::find()
            .select_only()
            .column(CollectionItemColumn::CollectionId)
            .column_as(Expr::col(CollectionItemColumn::Id).count(), "item_count")
            .filter(CollectionItemColumn::CollectionId.is_in(collections.iter().map(|c| c.id)))
            .group_by(CollectionItemColumn::CollectionId)
            .into_tuple::<(Uuid, i64)>()
            .all(self.read_conn())
            .await?
            .into_iter()
            .collect();

        Ok(collections
            .into_iter()
            .map(|collection| CollectionSummary {
                item_count: counts.get(&collection.id).copied().unwrap_or(0),
                collection,
            })
            .collect())
    }

    pub async fn get_collection(&self, user_id: Uuid, collection_id: Uuid) -> Result<Option<CollectionWithItems>> {
        let Some(collection) = self.find_owned_collection(user_id, collection_id).await? else {
            return Ok(None);
        };

        self.with_items(collection).await.map(Some)
    }

    /// Public collection by share slug; private ones are invisible
    pub async fn get_public_collection_by_slug(&self, slug: &str) -> Result<Option<CollectionWithItems>> {
        let Some(collection) = CollectionEntity::find()
            .filter(CollectionColumn::Slug.eq(slug))
            .filter(CollectionColumn::IsPublic.eq(true))
            .one(self.read_conn())
            .await?
        else {
            return Ok(None);
        };

        self.with_items(collection).await.map(Some)
    }

    pub async fn update_collection(
        &self,
        user_id: Uuid,
        collection_id: Uuid,
        update: CollectionUpdate,
    ) -> Result<Option<Collection>> {
        let Some(collection) = self.find_owned_collection(user_id, collection_id).await? else {
            return Ok(None);
        };

        let mut active = collection.into_active_model();
        if let Some(name) = update.name {
            active.name = Set(validate_name(&name)?.to_string());
        }
        if let Some(description) = update.description {
            active.description = Set(Some(description).filter(|d| !d.trim().is_empty()));
        }
        if let Some(is_public) = update.is_public {
            active.is_public = Set(is_public);
        }
        active.updated_at = Set(chrono::Utc::now().into());

        Ok(Some(active.update(self.write_conn()).await?))
    }

    /// Delete a collection and its items
    pub async fn delete_collection(&self, user_id: Uuid, collection_id: Uuid) -> Result<bool> {
        let result = CollectionEntity::delete_many()
            .filter(CollectionColumn::Id.eq(collection_id))
            .filter(CollectionColumn::UserId.eq(user_id))
            .exec(self.write_conn())
            .await?;

        Ok(result.rows_affected > 0)
    }

    /// Append a painting to a collection.
    ///
    /// Adding a painting that is already present returns the existing item.
    pub async fn add_collection_item(
        &self,
        user_id: Uuid,
        collection_id: Uuid,
        item: NewCollectionItem,
    ) -> Result<(CollectionItem, bool)> {
        let collection = self.require_collection(user_id, collection_id).await?;

        if let Some(existing) = self
            .find_collection_item(collection_id, &item.museum, &item.external_id)
            .await?
        {
            return Ok((existing, false));
        }

        let last: Option<Option<i32>> = CollectionItemEntity::find()
            .select_only()
            .column_as(CollectionItemColumn::Position.max(), "max_position")
            .filter(CollectionItemColumn::CollectionId.eq(collection_id))
            .into_tuple()
            .one(self.write_conn())
            .await?;
        let position = last.flatten().map_or(0, |p| p + 1);

        let now = chrono::Utc::now();
        let model = CollectionItemActiveModel {
            id: Set(Uuid::new_v4()),
            collection_id: Set(collection_id),
            external_id: Set(item.external_id.clone()),
            museum: Set(item.museum.clone()),
            title: Set(item.title),
            artist: Set(item.artist),
            image_url: Set(item.image_url),
            thumbnail_url: Set(item.thumbnail_url),
            note: Set(item.note),
            position: Set(position),
            created_at: Set(now.into()),
        };

        let created = match model.insert(self.write_conn()).await {
            Ok(created) => created,
            Err(e) if is_unique_violation(&e) => {
                let existing = self
                    .find_collection_item(collection_id, &item.museum, &item.external_id)
                    .await?;
                return existing.map(|i| (i, false)).ok_or_else(|| e.into());
            }
            Err(e) => return Err(e.into()),
        };

        self.touch_collection(collection).await?;
        Ok((created, true))
    }

    pub async fn remove_collection_item(&self, user_id: Uuid, collection_id: Uuid, item_id: Uuid) -> Result<bool> {
        let collection = self.require_collection(user_id, collection_id).await?;

        let result = CollectionItemEntity::delete_many()
            .filter(CollectionItemColumn::Id.eq(item_id))
            .filter(CollectionItemColumn::CollectionId.eq(collection_id))
            .exec(self.write_conn())
            .await?;

        if result.rows_affected > 0 {
            self.touch_collection(collection).await?;
        }

        Ok(result.rows_affected > 0)
    }

    /// Set item positions to the order of `item_ids` (0-based).
    ///
    /// Every id must belong to the collection; items left out keep their
    /// relative order after the listed ones.
    pub async fn reorder_collection_items(
        &self,
        user_id: Uuid,
        collection_id: Uuid,
        item_ids: Vec<Uuid>,
    ) -> Result<CollectionWithItems> {
        let collection = self.require_collection(user_id, collection_id).await?;

        let items = self.collection_items(collection_id).await?;
        let known: HashSet<Uuid> = items.iter().map(|i| i.id).collect();

        let mut seen = HashSet::new();
        for id in &item_ids {
            if !known.contains(id) {
                return Err(AppError::validation(
                    "item_ids",
                    format!("Item {} is not in this collection", id),
                ));
            }
            if !seen.insert(*id) {
                return Err(AppError::validation("item_ids", format!("Item {} is listed twice", id)));
            }
        }

        let order: Vec<Uuid> = item_ids
            .into_iter()
            .chain(items.iter().map(|i| i.id).filter(|id| !seen.contains(id)))
            .collect();

        let txn = self.write_conn().begin().await?;
        for (position, id) in order.into_iter().enumerate() {
            CollectionItemEntity::update_many()
                .col_expr(CollectionItemColumn::Position, Expr::value(position as i32))
                .filter(CollectionItemColumn::Id.eq(id))
                .exec(&txn)
                .await?;
        }
        txn.commit().await?;

        let collection = self.touch_collection(collection).await?;
        self.with_items(collection).await
    }

    async fn find_owned_collection(&self, user_id: Uuid, collection_id: Uuid) -> Result<Option<Collection>> {
        CollectionEntity::find_by_id(collection_id)
            .filter(CollectionColumn::UserId.eq(user_id))
            .one(self.write_conn())
            .await
            .map_err(Into::into)
    }

    async fn require_collection(&self, user_id: Uuid, collection_id: Uuid) -> Result<Collection> {
        self.find_owned_collection(user_id, collection_id)
            .await?
            .ok_or_else(|| AppError::CollectionNotFound {
                id: collection_id.to_string(),
            })
    }

    async fn find_collection_item(
        &self,
        collection_id: Uuid,
        museum: &str,
        external_id: &str,
    ) -> Result<Option<CollectionItem>> {
        CollectionItemEntity::find()
            .filter(CollectionItemColumn::CollectionId.eq(collection_id))
            .filter(CollectionItemColumn::Museum.eq(museum))
            .filter(CollectionItemColumn::ExternalId.eq(external_id))
            .one(self.write_conn())
            .await
            .map_err(Into::into)
    }

    async fn collection_items(&self, collection_id: Uuid) -> Result<Vec<CollectionItem>> {
        CollectionItemEntity::find()
            .filter(CollectionItemColumn::CollectionId.eq(collection_id))
            .order_by_asc(CollectionItemColumn::Position)
            .order_by_asc(CollectionItemColumn::CreatedAt)
            .all(self.write_conn())
            .await
            .map_err(Into::into)
    }

    async fn with_items(&self, collection: Collection) -> Result<CollectionWithItems> {
        let items = self.collection_items(collection.id).await?;
        Ok(CollectionWithItems { collection, items })
    }

    async fn touch_collection(&self, collection: Collection) -> Result<Collection> {
        let mut active = collection.into_active_model();
        active.updated_at = Set(chrono::Utc::now().into());
        Ok(active.update(self.write_conn()).await?)
    }
}
