//! Journal handlers

use super::MessageResponse;
use crate::AppState;
use artstuff_common::{
    auth::AuthUser,
    db::models::JournalEntry,
    errors::{AppError, Result},
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Serialize)]
pub struct EntriesResponse {
    pub entries: Vec<JournalEntry>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct NewEntryRequest {
    #[validate(length(min = 1, max = 10000))]
    pub entry_text: String,
    pub is_public: Option<bool>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateEntryRequest {
    #[validate(length(min = 1, max = 10000))]
    pub entry_text: Option<String>,
    pub is_public: Option<bool>,
}

/// `GET /api/favorites/{id}/journal`, newest first
pub async fn list_entries(
    State(state): State<AppState>,
    user: AuthUser,
    Path(favorite_id): Path<Uuid>,
) -> Result<Json<EntriesResponse>> {
    let entries = state.repo.list_journal_entries(user.user_id, favorite_id).await?;
    Ok(Json(EntriesResponse { entries }))
}

/// `POST /api/favorites/{id}/journal`
pub async fn add_entry(
    State(state): State<AppState>,
    user: AuthUser,
    Path(favorite_id): Path<Uuid>,
    Json(request): Json<NewEntryRequest>,
) -> Result<(StatusCode, Json<JournalEntry>)> {
    request.validate()?;

    let entry = state
        .repo
        .add_journal_entry(user.user_id, favorite_id, request.entry_text, request.is_public)
        .await?;

    Ok((StatusCode::CREATED, Json(entry)))
}

/// `PUT /api/journal/{id}`
pub async fn update_entry(
    State(state): State<AppState>,
    user: AuthUser,
    Path(entry_id): Path<Uuid>,
    Json(request): Json<UpdateEntryRequest>,
) -> Result<Json<JournalEntry>> {
    request.validate()?;
    if request.entry_text.is_none() && request.is_public.is_none() {
        return Err(AppError::validation("entry_text", "Nothing to update"));
    }

    state
        .repo
        .update_journal_entry(user.user_id, entry_id, request.entry_text, request.is_public)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::JournalEntryNotFound {
            id: entry_id.to_string(),
        })
}

/// `DELETE /api/journal/{id}`
pub async fn delete_entry(
    State(state): State<AppState>,
    user: AuthUser,
    Path(entry_id): Path<Uuid>,
) -> Result<Json<MessageResponse>> {
    if state.repo.delete_journal_entry(user.user_id, entry_id).await? {
        Ok(Json(MessageResponse::new("Journal entry deleted")))
    } else {
        Err(AppError::JournalEntryNotFound {
            id: entry_id.to_string(),
        })
    }
}
