//! Tag handlers

use super::MessageResponse;
use crate::AppState;
use artstuff_common::{
    auth::AuthUser,
    db::TagCount,
    errors::{AppError, Result},
};
use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Serialize)]
pub struct TagsResponse {
    pub tags: Vec<TagCount>,
}

#[derive(Debug, Deserialize)]
pub struct AddTagRequest {
    pub tag: String,
}

#[derive(Debug, Serialize)]
pub struct AddTagResponse {
    pub added: bool,
    pub message: String,
}

/// `GET /api/tags`, most used first
pub async fn list_tags(State(state): State<AppState>, user: AuthUser) -> Result<Json<TagsResponse>> {
    let tags = state.repo.list_tags(user.user_id).await?;
    Ok(Json(TagsResponse { tags }))
}

/// `POST /api/favorites/{id}/tags`
pub async fn add_tag(
    State(state): State<AppState>,
    user: AuthUser,
    Path(favorite_id): Path<Uuid>,
    Json(request): Json<AddTagRequest>,
) -> Result<Json<AddTagResponse>> {
    let added = state
        .repo
        .add_tag_to_favorite(user.user_id, favorite_id, &request.tag)
        .await?;

    let message = if added { "Tag added" } else { "Tag already exists" };
    Ok(Json(AddTagResponse {
        added,
        message: message.to_string(),
    }))
}

/// `DELETE /api/favorites/{id}/tags/{name}`
pub async fn remove_tag(
    State(state): State<AppState>,
    user: AuthUser,
    Path((favorite_id, name)): Path<(Uuid, String)>,
) -> Result<Json<MessageResponse>> {
    if state
        .repo
        .remove_tag_from_favorite(user.user_id, favorite_id, &name)
        .await?
    {
        Ok(Json(MessageResponse::new("Tag removed")))
    } else {
        Err(AppError::TagNotFound { name })
    }
}
