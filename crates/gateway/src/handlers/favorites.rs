//! Favorite handlers

use super::MessageResponse;
use crate::AppState;
use artstuff_common::{
    auth::AuthUser,
    db::{models::Favorite, FavoriteDetail, FavoriteFilter, FavoriteWithTags},
    errors::{AppError, Result},
    museums::{Museum, PaintingRecord},
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Painting fields the client sends when saving a favorite
#[derive(Debug, Deserialize, Validate)]
pub struct AddFavoriteRequest {
    #[validate(length(min = 1, max = 512))]
    pub external_id: String,

    pub museum: String,

    pub museum_name: Option<String>,

    #[validate(length(max = 1000))]
    pub title: Option<String>,

    #[validate(length(max = 500))]
    pub artist: Option<String>,

    pub date_display: Option<String>,
    pub medium: Option<String>,
    pub dimensions: Option<String>,
    pub description: Option<String>,

    #[validate(url)]
    pub image_url: Option<String>,

    #[validate(url)]
    pub thumbnail_url: Option<String>,

    #[validate(url)]
    pub museum_url: Option<String>,

    #[serde(default)]
    pub metadata: Option<serde_json::Value>,
}

impl AddFavoriteRequest {
    fn into_record(self) -> Result<PaintingRecord> {
        let museum: Museum = self.museum.parse()?;
        let mut record = PaintingRecord::new(museum, self.external_id.trim())
            .title(self.title)
            .artist(self.artist);

        if let Some(name) = self.museum_name.filter(|n| !n.trim().is_empty()) {
            record.museum_name = name;
        }
        record.date_display = self.date_display;
        record.medium = self.medium;
        record.dimensions = self.dimensions;
        record.description = self.description;
        record.image_url = self.image_url;
        record.thumbnail_url = self.thumbnail_url;
        record.museum_url = self.museum_url;
        if let Some(metadata) = self.metadata {
            record.metadata = metadata;
        }

        Ok(record)
    }
}

#[derive(Debug, Serialize)]
pub struct FavoritesResponse {
    pub favorites: Vec<FavoriteWithTags>,
}

#[derive(Debug, Serialize)]
pub struct AddFavoriteResponse {
    pub id: Uuid,
    pub created: bool,
    pub favorite: Favorite,
}

/// `GET /api/favorites?artist&museum&tag`
pub async fn list_favorites(
    State(state): State<AppState>,
    user: AuthUser,
    Query(filter): Query<FavoriteFilter>,
) -> Result<Json<FavoritesResponse>> {
    let favorites = state.repo.list_favorites(user.user_id, &filter).await?;
    Ok(Json(FavoritesResponse { favorites }))
}

/// `POST /api/favorites`, 201 when new and 200 when already saved
pub async fn add_favorite(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<AddFavoriteRequest>,
) -> Result<(StatusCode, Json<AddFavoriteResponse>)> {
    request.validate()?;
    let record = request.into_record()?;

    let (favorite, created) = state.repo.add_favorite(user.user_id, &record).await?;
    let status = if created { StatusCode::CREATED } else { StatusCode::OK };

    Ok((
        status,
        Json(AddFavoriteResponse {
            id: favorite.id,
            created,
            favorite,
        }),
    ))
}

/// `GET /api/favorites/{id}` with tags and journal entries
pub async fn get_favorite(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<FavoriteDetail>> {
    state
        .repo
        .get_favorite(user.user_id, id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::FavoriteNotFound { id: id.to_string() })
}

pub async fn delete_favorite(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>> {
    if state.repo.delete_favorite(user.user_id, id).await? {
        Ok(Json(MessageResponse::new("Removed from favorites")))
    } else {
        Err(AppError::FavoriteNotFound { id: id.to_string() })
    }
}
