use super::{contains_pattern, page_offset, Repository};
use crate::db::models::*;
use crate::errors::Result;
use crate::museums::PaintingRecord;
use rand::Rng;
use sea_orm::sea_query::{Expr, Func, OnConflict, SimpleExpr};
use sea_orm::{
    ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Artist placeholders that do not count as distinct artists
const UNKNOWN_ARTISTS: [&str; 4] = ["anonymous", "Unknown", "Artist unknown", "Unknown Artist"];

/// A page of catalogue results
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaintingPage {
    pub paintings: Vec<Painting>,
    pub total: u64,
    pub page: u64,
}

/// Headline numbers for the catalogue
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CatalogueStats {
    pub paintings: u64,
    pub artists: u64,
    pub museums: u64,
}

impl Repository {
    // ========================================================================
    // Painting Operations
    // ========================================================================

    /// Insert or refresh a harvested painting, keyed on (museum, external_id)
    pub async fn upsert_painting(&self, record: &PaintingRecord) -> Result<()> {
        let now = chrono::Utc::now();

        let painting = PaintingActiveModel {
            id: Set(Uuid::new_v4()),
            external_id: Set(record.external_id.clone()),
            museum: Set(record.museum.as_str().to_string()),
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
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };

        PaintingEntity::insert(painting)
            .on_conflict(
                OnConflict::columns([PaintingColumn::Museum, PaintingColumn::ExternalId])
                    .update_columns([
                        PaintingColumn::MuseumName,
                        PaintingColumn::Title,
                        PaintingColumn::Artist,
                        PaintingColumn::DateDisplay,
                        PaintingColumn::Medium,
                        PaintingColumn::Dimensions,
                        PaintingColumn::Description,
                        PaintingColumn::ImageUrl,
                        PaintingColumn::ThumbnailUrl,
                        PaintingColumn::MuseumUrl,
                        PaintingColumn::Metadata,
                        PaintingColumn::UpdatedAt,
                    ])
                    .to_owned(),
            )
            .exec_without_returning(self.write_conn())
            .await?;

        Ok(())
    }

    /// Find a catalogued painting by its museum identity
    pub async fn find_painting(&self, museum: &str, external_id: &str) -> Result<Option<Painting>> {
        PaintingEntity::find()
            .filter(PaintingColumn::Museum.eq(museum))
            .filter(PaintingColumn::ExternalId.eq(external_id))
            .one(self.read_conn())
            .await
            .map_err(Into::into)
    }

    /// Case-insensitive substring search over title, artist and description.
    ///
    /// A painting matches when any of `variants` occurs in any of the three
    /// columns.
    pub async fn search_paintings(
        &self,
        variants: &[String],
        museum: Option<&str>,
        page: u64,
        limit: u64,
    ) -> Result<PaintingPage> {
        let mut any = Condition::any();
        for variant in variants {
            for column in [
                PaintingColumn::Title,
                PaintingColumn::Artist,
                PaintingColumn::Description,
            ] {
                any = any.add(Expr::expr(Func::lower(Expr::col(column))).like(contains_pattern(variant)));
            }
        }

        let mut query = PaintingEntity::find().filter(any);
        if let Some(museum) = museum {
            query = query.filter(PaintingColumn::Museum.eq(museum));
        }

        let query = query
            .order_by_asc(PaintingColumn::Artist)
            .order_by_asc(PaintingColumn::Title)
            .order_by_asc(PaintingColumn::Id);

        let total = query.clone().count(self.read_conn()).await?;
        let paintings = query
            .offset(page_offset(page, limit))
            .limit(limit)
            .all(self.read_conn())
            .await?;

        Ok(PaintingPage {
            paintings,
            total,
            page,
        })
    }

    /// A uniformly random catalogued painting with an image
    pub async fn random_painting(&self) -> Result<Option<Painting>> {
        let query = PaintingEntity::find().filter(PaintingColumn::ImageUrl.is_not_null());

        let total = query.clone().count(self.read_conn()).await?;
        if total == 0 {
            return Ok(None);
        }

        let offset = rand::thread_rng().gen_range(0..total);
        query
            .order_by_asc(PaintingColumn::Id)
            .offset(offset)
            .limit(1)
            .one(self.read_conn())
            .await
            .map_err(Into::into)
    }

    /// Paintings, distinct known artists and distinct museums
    pub async fn catalogue_stats(&self) -> Result<CatalogueStats> {
        let paintings = PaintingEntity::find().count(self.read_conn()).await?;

        let artists: Option<i64> = PaintingEntity::find()
            .select_only()
            .column_as(
                SimpleExpr::from(Func::count_distinct(Expr::col(PaintingColumn::Artist))),
                "artists",
            )
            .filter(PaintingColumn::Artist.is_not_in(UNKNOWN_ARTISTS))
            .into_tuple()
            .one(self.read_conn())
            .await?;

        let museums: Option<i64> = PaintingEntity::find()
            .select_only()
            .column_as(
                SimpleExpr::from(Func::count_distinct(Expr::col(PaintingColumn::MuseumName))),
                "museums",
            )
            .into_tuple()
            .one(self.read_conn())
            .await?;

        Ok(CatalogueStats {
            paintings,
            artists: artists.unwrap_or(0).max(0) as u64,
            museums: museums.unwrap_or(0).max(0) as u64,
        })
    }

    /// Painting count per museum id, largest first
    pub async fn count_paintings_by_museum(&self) -> Result<Vec<(String, i64)>> {
        let mut counts: Vec<(String, i64)> = PaintingEntity::find()
            .select_only()
            .column(PaintingColumn::Museum)
            .column_as(Expr::col(PaintingColumn::Id).count(), "count")
            .group_by(PaintingColumn::Museum)
            .into_tuple()
            .all(self.read_conn())
            .await?;

        counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        Ok(counts)
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{record, repository};
    use crate::museums::Museum;

    #[tokio::test]
    async fn test_upsert_is_idempotent_per_museum_item() {
        let repo = repository().await;

        let mut painting = record(Museum::Aic, "27992", "A Sunday on La Grande Jatte", "Georges Seurat");
        repo.upsert_painting(&painting).await.unwrap();

        painting.title = "A Sunday on La Grande Jatte - 1884".into();
        repo.upsert_painting(&painting).await.unwrap();
        repo.upsert_painting(&record(Museum::Met, "27992", "Other", "Someone"))
            .await
            .unwrap();

        let stored = repo.find_painting("aic", "27992").await.unwrap().unwrap();
        assert_eq!(stored.title, "A Sunday on La Grande Jatte - 1884");

        let counts = repo.count_paintings_by_museum().await.unwrap();
        assert_eq!(counts.len(), 2);
        assert!(counts.iter().all(|(_, n)| *n == 1));
    }

    #[tokio::test]
    async fn test_search_paintings_matches_any_variant_and_column() {
        let repo = repository().await;
        repo.upsert_painting(&record(Museum::Smk, "KMS1", "Summer evening at Skagen", "P.S. Kroyer"))
            .await
            .unwrap();
        repo.upsert_painting(&record(Museum::Aic, "1", "Water Lilies", "Claude Monet"))
            .await
            .unwrap();
        let mut described = record(Museum::Met, "2", "Harbour", "Unknown Artist");
        described.description = Some("Painted in the manner of Monet".into());
        repo.upsert_painting(&described).await.unwrap();

        let monet = repo
            .search_paintings(&["monet".into()], None, 1, 20)
            .await
            .unwrap();
        assert_eq!(monet.total, 2);

        let skagen = repo
            .search_paintings(&["SKAGEN".into(), "nothing".into()], None, 1, 20)
            .await
            .unwrap();
        assert_eq!(skagen.total, 1);
        assert_eq!(skagen.paintings[0].museum, "smk");

        let filtered = repo
            .search_paintings(&["monet".into()], Some("aic"), 1, 20)
            .await
            .unwrap();
        assert_eq!(filtered.total, 1);
    }

    #[tokio::test]
    async fn test_search_paintings_treats_wildcards_literally() {
        let repo = repository().await;
        repo.upsert_painting(&record(Museum::Aic, "1", "Water Lilies", "Claude Monet"))
            .await
            .unwrap();
        repo.upsert_painting(&record(Museum::Aic, "2", "Study 100% blue", "Yves Klein"))
            .await
            .unwrap();

        let percent = repo.search_paintings(&["%".into()], None, 1, 20).await.unwrap();
        assert_eq!(percent.total, 1);
        assert_eq!(percent.paintings[0].external_id, "2");

        let underscore = repo.search_paintings(&["_".into()], None, 1, 20).await.unwrap();
        assert_eq!(underscore.total, 0);
    }

    #[tokio::test]
    async fn test_search_paintings_paginates_with_exact_total() {
        let repo = repository().await;
        for i in 0..5 {
            repo.upsert_painting(&record(Museum::Aic, &i.to_string(), &format!("Landscape {}", i), "Corot"))
                .await
                .unwrap();
        }

        let page2 = repo
            .search_paintings(&["landscape".into()], None, 2, 2)
            .await
            .unwrap();
        assert_eq!(page2.total, 5);
        assert_eq!(page2.page, 2);
        assert_eq!(page2.paintings.len(), 2);

        let page3 = repo
            .search_paintings(&["landscape".into()], None, 3, 2)
            .await
            .unwrap();
        assert_eq!(page3.paintings.len(), 1);
    }

    #[tokio::test]
    async fn test_catalogue_stats_skip_unknown_artists() {
        let repo = repository().await;
        assert_eq!(repo.catalogue_stats().await.unwrap().paintings, 0);
        assert!(repo.random_painting().await.unwrap().is_none());

        repo.upsert_painting(&record(Museum::Aic, "1", "A", "Claude Monet")).await.unwrap();
        repo.upsert_painting(&record(Museum::Aic, "2", "B", "Claude Monet")).await.unwrap();
        repo.upsert_painting(&record(Museum::Met, "3", "C", "Unknown Artist")).await.unwrap();
        repo.upsert_painting(&record(Museum::Met, "4", "D", "anonymous")).await.unwrap();

        let stats = repo.catalogue_stats().await.unwrap();
        assert_eq!(stats.paintings, 4);
        assert_eq!(stats.artists, 1);
        assert_eq!(stats.museums, 2);

        assert!(repo.random_painting().await.unwrap().is_some());
    }
}
