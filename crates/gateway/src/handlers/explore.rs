//! Explore handlers

use crate::AppState;
use artstuff_common::{
    errors::{AppError, Result},
    explore::{CategoryPage, CategoryType, ExploreOverview},
    museums::PaintingRecord,
};
use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};

const DEFAULT_LIMIT: u64 = 12;
const MAX_LIMIT: u64 = 100;

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

impl PageQuery {
    fn limit(&self) -> u64 {
        self.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
    }
}

#[derive(Debug, Serialize)]
pub struct PaintingsResponse {
    pub paintings: Vec<PaintingRecord>,
}

#[derive(Debug, Serialize)]
pub struct ArtistWorksResponse {
    pub artist: String,
    pub paintings: Vec<PaintingRecord>,
}

/// `GET /api/explore/categories`
pub async fn categories(State(state): State<AppState>) -> Result<Json<ExploreOverview>> {
    let overview = state.explore.overview(Utc::now().date_naive()).await?;
    Ok(Json(overview))
}

/// `GET /api/explore/{kind}/{key}?page&limit`
pub async fn category(
    State(state): State<AppState>,
    Path((kind, key)): Path<(String, String)>,
    Query(query): Query<PageQuery>,
) -> Result<Json<CategoryPage>> {
    let kind: CategoryType = kind.parse()?;
    let page = state
        .explore
        .fetch_by_category(kind, &key, query.page.unwrap_or(1), query.limit())
        .await?;
    Ok(Json(page))
}

/// `GET /api/explore/surprise`
pub async fn surprise(State(state): State<AppState>) -> Result<Json<PaintingRecord>> {
    state
        .explore
        .surprise()
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound {
            resource_type: "painting".to_string(),
            id: "random".to_string(),
        })
}

/// `GET /api/explore/preview`
pub async fn preview(State(state): State<AppState>) -> Result<Json<PaintingsResponse>> {
    let paintings = state.explore.preview().await?;
    Ok(Json(PaintingsResponse { paintings }))
}

/// `GET /api/explore/artist/{name}?limit`
pub async fn artist_works(
    State(state): State<AppState>,
    Path(artist): Path<String>,
    Query(query): Query<PageQuery>,
) -> Result<Json<ArtistWorksResponse>> {
    let paintings = state.explore.artist_works(&artist, query.limit() as usize).await?;
    Ok(Json(ArtistWorksResponse { artist, paintings }))
}
