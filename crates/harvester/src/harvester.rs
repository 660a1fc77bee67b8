//! Harvest runner
//!
//! Walks a [`HarvestPlan`] against one museum source, upserts every record
//! that can be displayed and writes a `harvest_logs` row per museum.

use crate::terms::{artist_plans, plan_for, HarvestPlan};
use artstuff_common::config::HarvestConfig;
use artstuff_common::db::models::HarvestStatus;
use artstuff_common::{metrics, Museum, MuseumSource, PaintingRecord, Repository, Result};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, instrument, warn};

/// What to harvest
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    All,
    Museum(Museum),
    /// Popular artists from AIC, Cleveland and the Met
    Artists,
}

/// Outcome for one museum
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarvestReport {
    pub museum: Museum,
    pub status: HarvestStatus,
    pub harvested: usize,
}

pub struct Harvester {
    repo: Repository,
    config: HarvestConfig,
}

impl Harvester {
    pub fn new(repo: Repository, config: HarvestConfig) -> Self {
        Self { repo, config }
    }

    /// Pair each configured source with its plan for `target`
    ///
    /// A museum that is not configured is left out.
    pub fn jobs(
        &self,
        target: Target,
        sources: &[Arc<dyn MuseumSource>],
    ) -> Vec<(Arc<dyn MuseumSource>, HarvestPlan)> {
        let by_museum: HashMap<Museum, &Arc<dyn MuseumSource>> =
            sources.iter().map(|s| (s.museum(), s)).collect();

        let plans = match target {
            Target::All => Museum::ALL
                .into_iter()
                .map(|m| (m, plan_for(m, &self.config)))
                .collect(),
            Target::Museum(m) => vec![(m, plan_for(m, &self.config))],
            Target::Artists => artist_plans(&self.config),
        };

        plans
            .into_iter()
            .filter_map(|(museum, plan)| match by_museum.get(&museum) {
                Some(source) => Some((Arc::clone(source), plan)),
                None => {
                    warn!(museum = %museum, "Museum not enabled in configuration, not harvesting");
                    None
                }
            })
            .collect()
    }

    /// Harvest every job in order
    pub async fn run_all(&self, jobs: &[(Arc<dyn MuseumSource>, HarvestPlan)]) -> Result<Vec<HarvestReport>> {
        let mut reports = Vec::with_capacity(jobs.len());
        for (source, plan) in jobs {
            reports.push(self.run(source.as_ref(), plan).await?);
        }
        Ok(reports)
    }

    /// Harvest one museum and log the outcome
    ///
    /// A failing museum is logged as `failed` and reported, not returned as an
    /// error; only a failure to write the log itself is.
    #[instrument(skip(self, source, plan), fields(museum = %source.museum()))]
    pub async fn run(&self, source: &dyn MuseumSource, plan: &HarvestPlan) -> Result<HarvestReport> {
        let museum = source.museum();

        if !source.is_enabled() {
            info!("Skipping, no API key configured");
            self.repo
                .log_harvest(museum.as_str(), HarvestStatus::Skipped, 0, Some("no API key".into()))
                .await?;
            return Ok(HarvestReport {
                museum,
                status: HarvestStatus::Skipped,
                harvested: 0,
            });
        }

        info!(museum_name = museum.display_name(), terms = plan.terms.len(), "Harvesting");

        let mut harvested = 0;
        let (status, message) = match self.collect(source, plan, &mut harvested).await {
            Ok(()) => (HarvestStatus::Completed, None),
            Err(e) => {
                error!(error = %e, harvested, "Harvest failed");
                (HarvestStatus::Failed, Some(e.to_string()))
            }
        };

        self.repo
            .log_harvest(museum.as_str(), status, harvested, message)
            .await?;
        metrics::record_harvest(museum.as_str(), harvested);
        info!(harvested, status = status.as_str(), "Museum done");

        Ok(HarvestReport {
            museum,
            status,
            harvested,
        })
    }

    /// Upserts as it goes; `stored` keeps the count reached before any error
    async fn collect(&self, source: &dyn MuseumSource, plan: &HarvestPlan, stored: &mut usize) -> Result<()> {
        if let Some(catalogue) = source.full_catalogue().await? {
            info!(records = catalogue.len(), "Storing full catalogue");
            return self.store(&catalogue, stored).await;
        }

        for term in &plan.terms {
            let before = *stored;
            self.harvest_term(source, term, plan, stored).await?;
            info!(term = %term, count = *stored - before, "Term harvested");
            pause(plan.term_pause).await;
        }
        Ok(())
    }

    /// Page through one term until a page comes back empty or errors
    async fn harvest_term(
        &self,
        source: &dyn MuseumSource,
        term: &str,
        plan: &HarvestPlan,
        stored: &mut usize,
    ) -> Result<()> {
        for page in 1..=u64::from(plan.pages) {
            let results = match source.search(term, page, plan.page_size).await {
                Ok(results) => results,
                Err(e) => {
                    warn!(term = %term, page, error = %e, "Search failed, moving to next term");
                    break;
                }
            };

            if results.paintings.is_empty() {
                break;
            }

            self.store(&results.paintings, stored).await?;
            pause(plan.page_pause).await;
        }

        Ok(())
    }

    async fn store(&self, records: &[PaintingRecord], stored: &mut usize) -> Result<()> {
        for record in records.iter().filter(|r| r.is_displayable()) {
            self.repo.upsert_painting(record).await?;
            *stored += 1;
        }
        Ok(())
    }

    /// Catalogue size for every museum, zero included
    pub async fn stats(&self) -> Result<Vec<(Museum, i64)>> {
        let counts: HashMap<String, i64> = self.repo.count_paintings_by_museum().await?.into_iter().collect();
        Ok(Museum::ALL
            .into_iter()
            .map(|m| (m, counts.get(m.as_str()).copied().unwrap_or(0)))
            .collect())
    }

    /// Remove cached museum responses past retention
    pub async fn purge_cache(&self, retention_days: i64) -> Result<u64> {
        let removed = self.repo.purge_api_cache(retention_days).await?;
        info!(removed, retention_days, "Purged museum response cache");
        Ok(removed)
    }
}

async fn pause(duration: Duration) {
    if !duration.is_zero() {
        tokio::time::sleep(duration).await;
    }
}
