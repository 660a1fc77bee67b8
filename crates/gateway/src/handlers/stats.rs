//! Catalogue statistics

use crate::AppState;
use artstuff_common::{db::CatalogueStats, errors::Result};
use axum::{extract::State, Json};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Serialize)]
pub struct StatsResponse {
    #[serde(flatten)]
    pub totals: CatalogueStats,
    pub by_museum: BTreeMap<String, i64>,
}

pub async fn stats(State(state): State<AppState>) -> Result<Json<StatsResponse>> {
    let totals = state.repo.catalogue_stats().await?;
    let by_museum = state.repo.count_paintings_by_museum().await?.into_iter().collect();

    Ok(Json(StatsResponse { totals, by_museum }))
}
