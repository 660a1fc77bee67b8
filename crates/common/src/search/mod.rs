//! Search over the harvested catalogue and the live museum APIs
//!
//! Provides:
//! - Query normalisation with accent variants for artist names
//! - Concurrent fan-out to every enabled [`MuseumSource`]
//! - "Did you mean" suggestions for near-miss artist names

mod normalize;
mod suggest;

pub use normalize::{normalize_query, query_variants};
pub use suggest::{suggest_spelling, KNOWN_ARTISTS};

use crate::config::{SearchConfig, SearchMode};
use crate::db::models::Painting;
use crate::db::Repository;
use crate::errors::{AppError, Result};
use crate::metrics;
use crate::museums::{Museum, MuseumSource, PaintingRecord, SourcePage};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Query string of `GET /api/search`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
    pub museum: Option<String>,
    pub page: Option<u64>,
    pub limit: Option<u64>,
    pub mode: Option<SearchMode>,
}

/// Merged search results
#[derive(Debug, Clone, Serialize)]
pub struct SearchOutcome {
    pub paintings: Vec<PaintingRecord>,
    pub total: u64,
    pub page: u64,
    /// Where the results came from; `auto` resolves to one of the others
    pub mode: SearchMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

/// Validated request shared by both search paths
#[derive(Debug, Clone)]
struct SearchRequest {
    query: String,
    museum: Option<Museum>,
    page: u64,
    limit: u64,
}

/// Catalogue and live search behind one entry point
#[derive(Clone)]
pub struct SearchService {
    repo: Repository,
    sources: Vec<Arc<dyn MuseumSource>>,
    fanout_timeout: Duration,
    config: SearchConfig,
}

impl SearchService {
    pub fn new(
        repo: Repository,
        sources: Vec<Arc<dyn MuseumSource>>,
        config: SearchConfig,
        fanout_timeout: Duration,
    ) -> Self {
        Self {
            repo,
            sources,
            fanout_timeout,
            config,
        }
    }

    /// Every configured source, enabled or not
    pub fn sources(&self) -> &[Arc<dyn MuseumSource>] {
        &self.sources
    }

    /// The enabled source for `museum`
    pub fn source(&self, museum: Museum) -> Option<&Arc<dyn MuseumSource>> {
        self.sources
            .iter()
            .find(|s| s.museum() == museum && s.is_enabled())
    }

    /// Run a search in the requested (or configured) mode
    pub async fn search(&self, params: SearchParams) -> Result<SearchOutcome> {
        let start = Instant::now();
        let mode = params.mode.unwrap_or(self.config.default_mode);
        let request = self.validate(params)?;

        let (page, served_by) = match mode {
            SearchMode::Catalogue => (self.catalogue(&request).await?, SearchMode::Catalogue),
            SearchMode::Live => (self.live(&request).await?, SearchMode::Live),
            SearchMode::Auto => {
                let page = self.catalogue(&request).await?;
                let live_available = request.museum.map_or(true, |m| self.source(m).is_some());
                if page.total == 0 && live_available {
                    debug!(query = %request.query, "Catalogue empty, falling back to live search");
                    (self.live(&request).await?, SearchMode::Live)
                } else {
                    (page, SearchMode::Catalogue)
                }
            }
        };

        let suggestion = if page.total == 0 {
            suggest_spelling(&request.query).map(str::to_string)
        } else {
            None
        };

        metrics::record_search(
            start.elapsed().as_secs_f64(),
            served_by.as_str(),
            page.paintings.len(),
            suggestion.is_some(),
        );

        info!(
            query = %request.query,
            museum = request.museum.map(|m| m.as_str()),
            mode = served_by.as_str(),
            total = page.total,
            returned = page.paintings.len(),
            suggestion = suggestion.as_deref(),
            "Search completed"
        );

        Ok(SearchOutcome {
            paintings: page.paintings,
            total: page.total,
            page: request.page,
            mode: served_by,
            suggestion,
        })
    }

    /// Catalogue first, then the museum's own API
    pub async fn get_painting(&self, museum: Museum, external_id: &str) -> Result<Option<PaintingRecord>> {
        if let Some(painting) = self.repo.find_painting(museum.as_str(), external_id).await? {
            return PaintingRecord::try_from(painting).map(Some);
        }

        match self.source(museum) {
            Some(source) => source.get(external_id).await,
            None => Ok(None),
        }
    }

    fn validate(&self, params: SearchParams) -> Result<SearchRequest> {
        let query = normalize_query(&params.q);
        if query.is_empty() {
            return Err(AppError::validation("q", "Search query must not be empty"));
        }

        let page = params.page.unwrap_or(1);
        if page == 0 {
            return Err(AppError::validation("page", "Page starts at 1"));
        }

        let limit = params.limit.unwrap_or(self.config.default_limit);
        if limit == 0 {
            return Err(AppError::validation("limit", "Limit must be at least 1"));
        }

        let museum = params
            .museum
            .as_deref()
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .map(str::parse::<Museum>)
            .transpose()?;

        Ok(SearchRequest {
            query,
            museum,
            page,
            limit: limit.min(self.config.max_limit),
        })
    }

    async fn catalogue(&self, request: &SearchRequest) -> Result<SourcePage> {
        let variants = query_variants(&request.query);
        let page = self
            .repo
            .search_paintings(
                &variants,
                request.museum.map(|m| m.as_str()),
                request.page,
                request.limit,
            )
            .await?;

        let (paintings, dropped) = catalogue_records(page.paintings);

        Ok(SourcePage {
            paintings,
            total: page.total.saturating_sub(dropped),
        })
    }

    async fn live(&self, request: &SearchRequest) -> Result<SourcePage> {
        let sources: Vec<&Arc<dyn MuseumSource>> = match request.museum {
            Some(museum) => {
                let source = self.source(museum).ok_or_else(|| AppError::UnknownMuseum {
                    museum: museum.as_str().to_string(),
                })?;
                vec![source]
            }
            None => self.sources.iter().filter(|s| s.is_enabled()).collect(),
        };

        if sources.is_empty() {
            return Ok(SourcePage::empty());
        }

        let per_source = (request.limit / sources.len() as u64).max(1);

        let searches = sources.iter().map(|source| {
            let museum = source.museum();
            let query = request.query.as_str();
            async move {
                let result = tokio::time::timeout(
                    self.fanout_timeout,
                    source.search(query, request.page, per_source),
                )
                .await;

                match result {
                    Ok(Ok(page)) => Some(page),
                    Ok(Err(e)) => {
                        warn!(museum = museum.as_str(), error = %e, "Museum search failed, skipping");
                        metrics::record_source_failure(museum.as_str());
                        None
                    }
                    Err(_) => {
                        warn!(
                            museum = museum.as_str(),
                            timeout_secs = self.fanout_timeout.as_secs_f64(),
                            "Museum search timed out, skipping"
                        );
                        metrics::record_source_failure(museum.as_str());
                        None
                    }
                }
            }
        });

        let mut merged = SourcePage::empty();
        for page in join_all(searches).await.into_iter().flatten() {
            merged.total += page.total;
            merged.paintings.extend(page.paintings);
        }

        Ok(merged)
    }
}

/// Convert catalogue rows, skipping rows whose museum is no longer integrated
fn catalogue_records(rows: Vec<Painting>) -> (Vec<PaintingRecord>, u64) {
    let mut dropped = 0;
    let records = rows
        .into_iter()
        .filter_map(|row| {
            let (id, museum) = (row.id, row.museum.clone());
            match PaintingRecord::try_from(row) {
                Ok(record) => Some(record),
                Err(e) => {
                    warn!(painting_id = %id, museum = %museum, error = %e, "Skipping unreadable catalogue row");
                    dropped += 1;
                    None
                }
            }
        })
        .collect();
    (records, dropped)
}
