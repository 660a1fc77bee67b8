//! Discovery by era, theme and mood over the harvested catalogue

mod categories;

pub use categories::{
    featured_artist, weekly_spotlight, Category, CategoryType, FeaturedArtist, ERAS, FEATURED_ARTISTS, MOODS,
    THEMES,
};

use crate::db::models::Painting;
use crate::db::Repository;
use crate::errors::{AppError, Result};
use crate::museums::PaintingRecord;
use crate::search::query_variants;
use chrono::NaiveDate;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use regex_lite::Regex;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, HashSet};
use std::sync::OnceLock;
use tracing::debug;

/// Rows pulled per query when assembling a category
const CATEGORY_QUERY_LIMIT: u64 = 200;

/// Rows inspected when looking for a representative image
const REPRESENTATIVE_QUERY_LIMIT: u64 = 10;

/// Slack around an era's years when matching painting dates
const ERA_TOLERANCE_YEARS: i32 = 20;

const PREVIEW_TERMS: [&str; 5] = ["portrait", "landscape", "still life", "sea", "garden"];
const PREVIEW_TERM_COUNT: usize = 3;
const PREVIEW_QUERY_LIMIT: u64 = 10;
const PREVIEW_MAX: usize = 30;

const ARTIST_QUERY_LIMIT: u64 = 100;

/// Thumbnail width for carousel images
pub const CAROUSEL_WIDTH: u32 = 400;

/// Minimal painting reference used for category tiles
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PaintingCard {
    pub museum: String,
    pub external_id: String,
    pub title: String,
    pub artist: String,
    pub image_url: String,
}

/// One tile image per era and theme, plus the featured artist
#[derive(Debug, Clone, Serialize, Default)]
pub struct Representatives {
    pub eras: BTreeMap<&'static str, PaintingCard>,
    pub themes: BTreeMap<&'static str, PaintingCard>,
    pub featured_artist: Option<PaintingCard>,
}

/// Everything the explore page needs in one response
#[derive(Debug, Clone, Serialize)]
pub struct ExploreOverview {
    pub eras: &'static [Category],
    pub themes: &'static [Category],
    pub moods: &'static [Category],
    pub featured_artist: &'static FeaturedArtist,
    pub weekly_spotlight: &'static Category,
    pub representatives: Representatives,
}

/// One page of a category
#[derive(Debug, Clone, Serialize)]
pub struct CategoryPage {
    pub paintings: Vec<PaintingRecord>,
    pub total: u64,
    pub page: u64,
    pub category: &'static Category,
}

/// Year a free-form museum date most likely refers to.
///
/// The first four-digit number wins ("c. 1665", "1889-1890"); otherwise
/// "Nth century" maps to the decade implied by early (10), mid (50) or
/// late (80), defaulting to mid.
pub fn extract_year(date: &str) -> Option<i32> {
    static YEAR: OnceLock<Regex> = OnceLock::new();
    static CENTURY: OnceLock<Regex> = OnceLock::new();

    let date = date.trim().to_lowercase();
    if date.is_empty() {
        return None;
    }

    let year = YEAR.get_or_init(|| Regex::new(r"\b(\d{4})\b").expect("valid year pattern"));
    if let Some(caps) = year.captures(&date) {
        return caps[1].parse().ok();
    }

    let century = CENTURY
        .get_or_init(|| Regex::new(r"(\d{1,2})(?:st|nd|rd|th)\s*century").expect("valid century pattern"));
    let caps = century.captures(&date)?;
    let base = (caps[1].parse::<i32>().ok()? - 1) * 100;

    let offset = if date.contains("early") {
        10
    } else if date.contains("late") {
        80
    } else {
        50
    };
    Some(base + offset)
}

/// Whether `date` falls inside `years`, give or take twenty years
pub fn is_in_era(date: Option<&str>, years: (i32, i32)) -> bool {
    match date.and_then(extract_year) {
        Some(year) => (years.0 - ERA_TOLERANCE_YEARS..=years.1 + ERA_TOLERANCE_YEARS).contains(&year),
        None => false,
    }
}

/// Shrink an Art Institute IIIF URL to `width`; other URLs pass through
pub fn resize_image_url(url: &str, width: u32) -> String {
    static FULL: OnceLock<Regex> = OnceLock::new();

    if !url.contains("artic.edu/iiif") {
        return url.to_string();
    }

    let full = FULL.get_or_init(|| Regex::new(r"/full/\d+,/").expect("valid IIIF size pattern"));
    full.replace(url, format!("/full/{},/", width).as_str()).into_owned()
}

/// Shuffle that gives the same order every time for the same key
fn seeded_shuffle<T>(items: &mut [T], key: &str) {
    let digest = Sha256::digest(key.as_bytes());
    let mut seed = [0u8; 8];
    seed.copy_from_slice(&digest[..8]);
    let mut rng = StdRng::seed_from_u64(u64::from_be_bytes(seed));
    items.shuffle(&mut rng);
}

fn card(painting: &Painting) -> Option<PaintingCard> {
    let image_url = painting.image_url.as_deref()?;
    Some(PaintingCard {
        museum: painting.museum.clone(),
        external_id: painting.external_id.clone(),
        title: painting.title.clone(),
        artist: painting.artist.clone(),
        image_url: resize_image_url(image_url, CAROUSEL_WIDTH),
    })
}

fn records(paintings: Vec<Painting>) -> Vec<PaintingRecord> {
    paintings
        .into_iter()
        .filter_map(|p| PaintingRecord::try_from(p).ok())
        .collect()
}

/// Read-only views of the catalogue grouped by curated categories
#[derive(Clone)]
pub struct ExploreService {
    repo: Repository,
}

impl ExploreService {
    pub fn new(repo: Repository) -> Self {
        Self { repo }
    }

    async fn catalogue(&self, query: &str, limit: u64) -> Result<Vec<Painting>> {
        let page = self
            .repo
            .search_paintings(&query_variants(query), None, 1, limit)
            .await?;
        Ok(page.paintings)
    }

    /// First painting with an image across `queries`
    async fn first_card(&self, queries: &[&str]) -> Result<Option<PaintingCard>> {
        for query in queries {
            let paintings = self.catalogue(query, REPRESENTATIVE_QUERY_LIMIT).await?;
            if let Some(card) = paintings.iter().find_map(card) {
                return Ok(Some(card));
            }
        }
        Ok(None)
    }

    pub async fn overview(&self, today: NaiveDate) -> Result<ExploreOverview> {
        Ok(ExploreOverview {
            eras: ERAS,
            themes: THEMES,
            moods: MOODS,
            featured_artist: featured_artist(today),
            weekly_spotlight: weekly_spotlight(today),
            representatives: self.representatives(today).await?,
        })
    }

    /// Up to three artists per era and two terms per theme are tried
    pub async fn representatives(&self, today: NaiveDate) -> Result<Representatives> {
        let mut reps = Representatives::default();

        for era in ERAS {
            let artists: Vec<&str> = era.artists.iter().take(3).copied().collect();
            if let Some(card) = self.first_card(&artists).await? {
                reps.eras.insert(era.key, card);
            }
        }

        for theme in THEMES {
            let terms: Vec<&str> = theme.search_terms.iter().take(2).copied().collect();
            if let Some(card) = self.first_card(&terms).await? {
                reps.themes.insert(theme.key, card);
            }
        }

        reps.featured_artist = self.first_card(&[featured_artist(today).name]).await?;
        Ok(reps)
    }

    /// Paintings for a category in a stable per-category order
    pub async fn fetch_by_category(
        &self,
        kind: CategoryType,
        key: &str,
        page: u64,
        limit: u64,
    ) -> Result<CategoryPage> {
        let category = kind.find(key).ok_or_else(|| AppError::NotFound {
            resource_type: kind.as_str().to_string(),
            id: key.to_string(),
        })?;
        if page == 0 || limit == 0 {
            return Err(AppError::validation("page", "Page and limit start at 1"));
        }

        let mut seen = HashSet::new();
        let mut unique = Vec::new();
        for query in category.queries() {
            for painting in self.catalogue(query, CATEGORY_QUERY_LIMIT).await? {
                if seen.insert(format!("{}:{}", painting.museum, painting.external_id)) {
                    unique.push(painting);
                }
            }
        }

        if let Some(years) = category.years {
            let (in_era, outside): (Vec<_>, Vec<_>) = unique
                .into_iter()
                .partition(|p| is_in_era(p.date_display.as_deref(), years));
            unique = if in_era.is_empty() { outside } else { in_era };
        }

        seeded_shuffle(&mut unique, category.key);

        let total = unique.len() as u64;
        let start = usize::try_from(crate::db::page_offset(page, limit)).unwrap_or(usize::MAX);
        let paintings = unique
            .into_iter()
            .skip(start)
            .take(limit as usize)
            .collect();

        debug!(kind = %kind, key, total, page, "Category fetched");

        Ok(CategoryPage {
            paintings: records(paintings),
            total,
            page,
            category,
        })
    }

    pub async fn surprise(&self) -> Result<Option<PaintingRecord>> {
        match self.repo.random_painting().await? {
            Some(painting) => PaintingRecord::try_from(painting).map(Some),
            None => Ok(None),
        }
    }

    /// Mixed sample from three of the five preview terms
    pub async fn preview(&self) -> Result<Vec<PaintingRecord>> {
        let mut terms = PREVIEW_TERMS;
        terms.shuffle(&mut rand::thread_rng());

        let mut paintings = Vec::new();
        for term in &terms[..PREVIEW_TERM_COUNT] {
            paintings.extend(self.catalogue(term, PREVIEW_QUERY_LIMIT).await?);
        }

        paintings.shuffle(&mut rand::thread_rng());
        paintings.truncate(PREVIEW_MAX);
        Ok(records(paintings))
    }

    /// Catalogue works whose artist contains `artist`
    pub async fn artist_works(&self, artist: &str, limit: usize) -> Result<Vec<PaintingRecord>> {
        let artist = artist.trim();
        if artist.is_empty() {
            return Err(AppError::validation("artist", "Artist name must not be empty"));
        }

        let needle = artist.to_lowercase();
        let paintings = self
            .catalogue(artist, ARTIST_QUERY_LIMIT)
            .await?
            .into_iter()
            .filter(|p| p.artist.to_lowercase().contains(&needle))
            .take(limit)
            .collect();

        Ok(records(paintings))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::{record, repository};
    use crate::museums::Museum;

    #[test]
    fn test_extract_year() {
        assert_eq!(extract_year("1503"), Some(1503));
        assert_eq!(extract_year("c. 1665"), Some(1665));
        assert_eq!(extract_year("1889-1890"), Some(1889));
        assert_eq!(extract_year("ca. 1510-1515"), Some(1510));
        assert_eq!(extract_year("19th century"), Some(1850));
        assert_eq!(extract_year("Early 16th century"), Some(1510));
        assert_eq!(extract_year("late 19th century"), Some(1880));
        assert_eq!(extract_year("mid-17th century"), Some(1650));
        assert_eq!(extract_year("undated"), None);
        assert_eq!(extract_year(""), None);
    }

    #[test]
    fn test_is_in_era_allows_slack() {
        assert!(is_in_era(Some("1655"), (1600, 1700)));
        assert!(is_in_era(Some("c. 1715"), (1600, 1700)));
        assert!(!is_in_era(Some("1725"), (1600, 1700)));
        assert!(!is_in_era(None, (1600, 1700)));
    }

    #[test]
    fn test_resize_only_touches_aic() {
        assert_eq!(
            resize_image_url("https://www.artic.edu/iiif/2/abc/full/1686,/0/default.jpg", 400),
            "https://www.artic.edu/iiif/2/abc/full/400,/0/default.jpg"
        );
        let other = "https://images.metmuseum.org/CRDImages/ep/original/DT1502.jpg";
        assert_eq!(resize_image_url(other, 400), other);
    }

    #[test]
    fn test_seeded_shuffle_is_stable() {
        let mut a: Vec<u32> = (0..50).collect();
        let mut b = a.clone();
        seeded_shuffle(&mut a, "baroque");
        seeded_shuffle(&mut b, "baroque");
        assert_eq!(a, b);
        assert_ne!(a, (0..50).collect::<Vec<_>>());
    }

    async fn seeded() -> ExploreService {
        let repo = repository().await;
        let paintings = [
            ("1", "The Night Watch", "Rembrandt van Rijn", "1642"),
            ("2", "The Milkmaid", "Johannes Vermeer", "c. 1660"),
            ("3", "Self-Portrait", "Rembrandt van Rijn", "1669"),
            ("4", "Water Lilies", "Claude Monet", "1916"),
            ("5", "Garden at Sainte-Adresse", "Claude Monet", "1867"),
        ];
        for (id, title, artist, date) in paintings {
            let mut r = record(Museum::Aic, id, title, artist);
            r.date_display = Some(date.to_string());
            repo.upsert_painting(&r).await.unwrap();
        }
        ExploreService::new(repo)
    }

    #[tokio::test]
    async fn test_fetch_by_category_dedupes_and_filters_era() {
        let svc = seeded().await;

        // "Rembrandt" is both an artist and a search term for the Dutch Golden Age
        let page = svc
            .fetch_by_category(CategoryType::Era, "dutch-golden-age", 1, 12)
            .await
            .unwrap();
        assert_eq!(page.total, 3);
        assert_eq!(page.category.name, "Dutch Golden Age");

        let again = svc
            .fetch_by_category(CategoryType::Era, "dutch-golden-age", 1, 12)
            .await
            .unwrap();
        let ids = |p: &CategoryPage| p.paintings.iter().map(|r| r.external_id.clone()).collect::<Vec<_>>();
        assert_eq!(ids(&page), ids(&again));

        let second = svc
            .fetch_by_category(CategoryType::Era, "dutch-golden-age", 2, 2)
            .await
            .unwrap();
        assert_eq!(second.paintings.len(), 1);
    }

    #[tokio::test]
    async fn test_era_filter_falls_back_when_nothing_matches() {
        let svc = seeded().await;

        // Monet is an impressionist but "Water Lilies" (1916) is past the era
        let page = svc
            .fetch_by_category(CategoryType::Era, "impressionism", 1, 12)
            .await
            .unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.paintings[0].title, "Garden at Sainte-Adresse");

        let err = svc
            .fetch_by_category(CategoryType::Mood, "grumpy", 1, 12)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_artist_works_filters_on_artist() {
        let svc = seeded().await;

        let works = svc.artist_works("rembrandt", 24).await.unwrap();
        assert_eq!(works.len(), 2);
        assert!(works.iter().all(|w| w.artist == "Rembrandt van Rijn"));

        assert_eq!(svc.artist_works("Monet", 1).await.unwrap().len(), 1);
        assert!(svc.artist_works(" ", 5).await.is_err());
    }

    #[tokio::test]
    async fn test_surprise_preview_and_representatives() {
        let svc = seeded().await;
        assert!(svc.surprise().await.unwrap().is_some());

        let preview = svc.preview().await.unwrap();
        assert!(preview.len() <= PREVIEW_MAX);

        let today = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        let overview = svc.overview(today).await.unwrap();
        assert_eq!(overview.eras.len(), ERAS.len());
        assert!(overview.representatives.eras.contains_key("baroque"));
        assert!(!overview.representatives.themes.contains_key("religious"));

        let empty = ExploreService::new(repository().await);
        assert!(empty.surprise().await.unwrap().is_none());
        assert!(empty.preview().await.unwrap().is_empty());
    }
}
