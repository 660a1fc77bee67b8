//! Search handlers

use crate::AppState;
use artstuff_common::{
    errors::Result,
    search::{SearchOutcome, SearchParams},
};
use axum::{
    extract::{Query, State},
    Json,
};

/// `GET /api/search?q&museum&page&limit&mode`
pub async fn search(State(state): State<AppState>, Query(params): Query<SearchParams>) -> Result<Json<SearchOutcome>> {
    let outcome = state.search.search(params).await?;
    Ok(Json(outcome))
}
