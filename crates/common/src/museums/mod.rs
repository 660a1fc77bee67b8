//! Museum API sources
//!
//! Every museum is wrapped in a [`MuseumSource`] that maps the museum's own
//! JSON (or, for the Rijksmuseum, OAI-PMH XML) into a [`PaintingRecord`].
//! Sources share one [`MuseumClient`], which owns the HTTP client and the
//! response cache.

mod client;

pub mod aic;
pub mod cleveland;
pub mod europeana;
pub mod harvard;
pub mod met;
pub mod rijks;
pub mod smithsonian;
pub mod smk;

pub use client::MuseumClient;

use crate::config::MuseumsConfig;
use crate::db::models::{Favorite, Painting};
use crate::errors::{AppError, Result};
use async_trait::async_trait;
use regex_lite::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, OnceLock};

pub const UNTITLED: &str = "Untitled";
pub const UNKNOWN_ARTIST: &str = "Unknown Artist";

/// Museums with an integration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Museum {
    Aic,
    Rijks,
    Met,
    Cleveland,
    Harvard,
    Europeana,
    Smithsonian,
    Smk,
}

impl Museum {
    /// Fan-out order
    pub const ALL: [Museum; 8] = [
        Museum::Aic,
        Museum::Rijks,
        Museum::Met,
        Museum::Cleveland,
        Museum::Harvard,
        Museum::Europeana,
        Museum::Smithsonian,
        Museum::Smk,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Museum::Aic => "aic",
            Museum::Rijks => "rijks",
            Museum::Met => "met",
            Museum::Cleveland => "cleveland",
            Museum::Harvard => "harvard",
            Museum::Europeana => "europeana",
            Museum::Smithsonian => "smithsonian",
            Museum::Smk => "smk",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Museum::Aic => "Art Institute of Chicago",
            Museum::Rijks => "Rijksmuseum",
            Museum::Met => "Metropolitan Museum of Art",
            Museum::Cleveland => "Cleveland Museum of Art",
            Museum::Harvard => "Harvard Art Museums",
            Museum::Europeana => "Europeana",
            Museum::Smithsonian => "Smithsonian",
            Museum::Smk => "SMK - National Gallery of Denmark",
        }
    }
}

impl fmt::Display for Museum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Museum {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        Museum::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| AppError::UnknownMuseum {
                museum: s.to_string(),
            })
    }
}

/// A painting normalised from any museum's response shape
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaintingRecord {
    pub external_id: String,
    pub museum: Museum,
    pub museum_name: String,
    pub title: String,
    pub artist: String,
    pub date_display: Option<String>,
    pub medium: Option<String>,
    pub dimensions: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub thumbnail_url: Option<String>,
    pub museum_url: Option<String>,
    #[serde(default)]
    pub metadata: serde_json::Value,
}

impl PaintingRecord {
    /// Empty record with the default title, artist and museum name
    pub fn new(museum: Museum, external_id: impl Into<String>) -> Self {
        Self {
            external_id: external_id.into(),
            museum,
            museum_name: museum.display_name().to_string(),
            title: UNTITLED.to_string(),
            artist: UNKNOWN_ARTIST.to_string(),
            date_display: None,
            medium: None,
            dimensions: None,
            description: None,
            image_url: None,
            thumbnail_url: None,
            museum_url: None,
            metadata: serde_json::Value::Object(Default::default()),
        }
    }

    pub fn title(mut self, title: Option<String>) -> Self {
        if let Some(t) = non_empty(title) {
            self.title = t;
        }
        self
    }

    pub fn artist(mut self, artist: Option<String>) -> Self {
        if let Some(a) = non_empty(artist) {
            self.artist = a;
        }
        self
    }

    /// Harvested records are only kept when they can be shown
    pub fn is_displayable(&self) -> bool {
        self.image_url.is_some() && !self.title.trim().is_empty()
    }
}

impl TryFrom<Painting> for PaintingRecord {
    type Error = AppError;

    fn try_from(p: Painting) -> Result<Self> {
        let museum: Museum = p.museum.parse()?;
        Ok(Self {
            external_id: p.external_id,
            museum,
            museum_name: p.museum_name.unwrap_or_else(|| museum.display_name().to_string()),
            title: p.title,
            artist: p.artist,
            date_display: p.date_display,
            medium: p.medium,
            dimensions: p.dimensions,
            description: p.description,
            image_url: p.image_url,
            thumbnail_url: p.thumbnail_url,
            museum_url: p.museum_url,
            metadata: p.metadata,
        })
    }
}

impl TryFrom<Favorite> for PaintingRecord {
    type Error = AppError;

    fn try_from(f: Favorite) -> Result<Self> {
        let museum: Museum = f.museum.parse()?;
        Ok(Self {
            external_id: f.external_id,
            museum,
            museum_name: f.museum_name.unwrap_or_else(|| museum.display_name().to_string()),
            title: f.title,
            artist: f.artist,
            date_display: f.date_display,
            medium: f.medium,
            dimensions: f.dimensions,
            description: f.description,
            image_url: f.image_url,
            thumbnail_url: f.thumbnail_url,
            museum_url: f.museum_url,
            metadata: f.metadata,
        })
    }
}

/// One page of results from a single source
#[derive(Debug, Clone, Default)]
pub struct SourcePage {
    pub paintings: Vec<PaintingRecord>,
    /// Total hits reported by the museum, not just this page
    pub total: u64,
}

impl SourcePage {
    pub fn empty() -> Self {
        Self::default()
    }
}

/// A searchable museum collection
#[async_trait]
pub trait MuseumSource: Send + Sync {
    fn museum(&self) -> Museum;

    /// Sources that need an API key report false when none is configured
    fn is_enabled(&self) -> bool {
        true
    }

    /// Search the collection, `page` is 1-based
    async fn search(&self, query: &str, page: u64, limit: u64) -> Result<SourcePage>;

    /// Fetch a single painting by the museum's own identifier
    async fn get(&self, external_id: &str) -> Result<Option<PaintingRecord>>;

    /// Whole collection for sources that load it in bulk rather than by query
    async fn full_catalogue(&self) -> Result<Option<Vec<PaintingRecord>>> {
        Ok(None)
    }
}

/// Build every source allowed by configuration, in fan-out order
pub fn create_sources(config: &MuseumsConfig, client: MuseumClient) -> Vec<Arc<dyn MuseumSource>> {
    let mut sources: Vec<Arc<dyn MuseumSource>> = Vec::new();

    for museum in Museum::ALL {
        if !config.allows(museum.as_str()) {
            continue;
        }

        let source: Arc<dyn MuseumSource> = match museum {
            Museum::Aic => Arc::new(aic::AicSource::new(client.clone(), config)),
            Museum::Rijks => Arc::new(rijks::RijksSource::new(client.clone(), config)),
            Museum::Met => Arc::new(met::MetSource::new(client.clone(), config)),
            Museum::Cleveland => Arc::new(cleveland::ClevelandSource::new(client.clone(), config)),
            Museum::Harvard => Arc::new(harvard::HarvardSource::new(client.clone(), config)),
            Museum::Europeana => Arc::new(europeana::EuropeanaSource::new(client.clone(), config)),
            Museum::Smithsonian => {
                Arc::new(smithsonian::SmithsonianSource::new(client.clone(), config))
            }
            Museum::Smk => Arc::new(smk::SmkSource::new(client.clone(), config)),
        };

        sources.push(source);
    }

    sources
}

/// Remove markup from museum descriptions
pub fn strip_html(text: &str) -> String {
    static TAGS: OnceLock<Regex> = OnceLock::new();
    static SPACES: OnceLock<Regex> = OnceLock::new();

    let tags = TAGS.get_or_init(|| Regex::new(r"<[^>]+>").expect("valid tag pattern"));
    let spaces = SPACES.get_or_init(|| Regex::new(r"\s+").expect("valid whitespace pattern"));

    let clean = tags.replace_all(text, "");
    let clean = clean.replace("&nbsp;", " ").replace("&amp;", "&");
    spaces.replace_all(&clean, " ").trim().to_string()
}

/// `None` for missing or blank strings, trimmed otherwise
pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Stripped description, `None` when nothing is left
pub(crate) fn clean_description(value: Option<&str>) -> Option<String> {
    value.map(strip_html).filter(|d| !d.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_html() {
        assert_eq!(
            strip_html("<p>A  <em>quiet</em>&nbsp;harbour &amp; boats</p>\n"),
            "A quiet harbour & boats"
        );
        assert_eq!(strip_html(""), "");
    }

    #[test]
    fn test_museum_parse() {
        assert_eq!("AIC".parse::<Museum>().unwrap(), Museum::Aic);
        assert_eq!(" smk ".parse::<Museum>().unwrap(), Museum::Smk);
        assert!(matches!(
            "whitney".parse::<Museum>(),
            Err(AppError::UnknownMuseum { .. })
        ));
    }

    #[test]
    fn test_record_defaults() {
        let record = PaintingRecord::new(Museum::Met, "436535")
            .title(Some("   ".into()))
            .artist(None);
        assert_eq!(record.title, UNTITLED);
        assert_eq!(record.artist, UNKNOWN_ARTIST);
        assert_eq!(record.museum_name, "Metropolitan Museum of Art");
        assert!(!record.is_displayable());
    }

    #[test]
    fn test_create_sources_respects_enabled_list() {
        let mut config = MuseumsConfig::default();
        config.enabled = vec!["aic".into(), "smk".into()];
        let client = MuseumClient::uncached(std::time::Duration::from_secs(5)).unwrap();

        let sources = create_sources(&config, client);
        let museums: Vec<Museum> = sources.iter().map(|s| s.museum()).collect();
        assert_eq!(museums, vec![Museum::Aic, Museum::Smk]);
    }

    #[test]
    fn test_keyed_sources_disabled_without_key() {
        let config = MuseumsConfig::default();
        let client = MuseumClient::uncached(std::time::Duration::from_secs(5)).unwrap();

        let sources = create_sources(&config, client);
        let disabled: Vec<Museum> = sources
            .iter()
            .filter(|s| !s.is_enabled())
            .map(|s| s.museum())
            .collect();
        assert_eq!(
            disabled,
            vec![Museum::Harvard, Museum::Europeana, Museum::Smithsonian]
        );
    }
}
