//! Painting detail and painting of the day

use crate::AppState;
use artstuff_common::{
    auth::{AuthUser, OptionalAuthUser},
    db::models::Favorite,
    errors::{AppError, Result},
    museums::{Museum, PaintingRecord},
};
use axum::{
    extract::{Path, State},
    Json,
};
use chrono::{NaiveDate, Utc};
use serde::Serialize;
use uuid::Uuid;

/// A painting plus the caller's favorite state
#[derive(Debug, Serialize)]
pub struct PaintingDetail {
    #[serde(flatten)]
    pub painting: PaintingRecord,
    pub is_favorite: bool,
    pub favorite_id: Option<Uuid>,
    pub tags: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct PaintingOfTheDay {
    pub date: NaiveDate,
    pub painting: Option<Favorite>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// `GET /api/painting/{museum}/{*external_id}`
pub async fn get_painting(
    State(state): State<AppState>,
    OptionalAuthUser(user): OptionalAuthUser,
    Path((museum, external_id)): Path<(String, String)>,
) -> Result<Json<PaintingDetail>> {
    let museum: Museum = museum.parse()?;
    let external_id = external_id.trim_start_matches('/');

    let painting = state
        .search
        .get_painting(museum, external_id)
        .await?
        .ok_or_else(|| AppError::PaintingNotFound {
            museum: museum.as_str().to_string(),
            external_id: external_id.to_string(),
        })?;

    let favorite = match user {
        Some(user) => {
            state
                .repo
                .find_favorite_by_external_id(user.user_id, museum.as_str(), external_id)
                .await?
        }
        None => None,
    };

    Ok(Json(PaintingDetail {
        painting,
        is_favorite: favorite.is_some(),
        favorite_id: favorite.as_ref().map(|f| f.favorite.id),
        tags: favorite.map(|f| f.tags).unwrap_or_default(),
    }))
}

/// `GET /api/painting-of-the-day`
pub async fn painting_of_the_day(State(state): State<AppState>, user: AuthUser) -> Result<Json<PaintingOfTheDay>> {
    let today = Utc::now().date_naive();
    let painting = state.repo.painting_of_the_day(user.user_id, today).await?;

    let message = painting
        .is_none()
        .then(|| "No favorites yet. Start exploring and save some paintings!".to_string());

    Ok(Json(PaintingOfTheDay {
        date: today,
        painting,
        message,
    }))
}
