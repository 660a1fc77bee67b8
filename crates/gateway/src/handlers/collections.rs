//! Collection handlers

use super::MessageResponse;
use crate::AppState;
use artstuff_common::{
    auth::AuthUser,
    db::{
        models::{Collection, CollectionItem},
        CollectionSummary, CollectionUpdate, CollectionWithItems, NewCollectionItem,
    },
    errors::{AppError, Result},
    museums::Museum,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateCollectionRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,

    #[validate(length(max = 2000))]
    pub description: Option<String>,

    #[serde(default)]
    pub is_public: bool,
}

#[derive(Debug, Deserialize)]
pub struct ReorderRequest {
    pub item_ids: Vec<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct CollectionsResponse {
    pub collections: Vec<CollectionSummary>,
}

#[derive(Debug, Serialize)]
pub struct AddItemResponse {
    pub created: bool,
    pub item: CollectionItem,
}

fn not_found(id: Uuid) -> AppError {
    AppError::CollectionNotFound { id: id.to_string() }
}

/// `GET /api/collections`
pub async fn list_collections(State(state): State<AppState>, user: AuthUser) -> Result<Json<CollectionsResponse>> {
    let collections = state.repo.list_collections(user.user_id).await?;
    Ok(Json(CollectionsResponse { collections }))
}

/// `POST /api/collections`
pub async fn create_collection(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<CreateCollectionRequest>,
) -> Result<(StatusCode, Json<Collection>)> {
    request.validate()?;

    let description = request.description.filter(|d| !d.trim().is_empty());
    let collection = state
        .repo
        .create_collection(user.user_id, &request.name, description, request.is_public)
        .await?;

    Ok((StatusCode::CREATED, Json(collection)))
}

/// `GET /api/collections/{id}` with items in order
pub async fn get_collection(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<CollectionWithItems>> {
    state
        .repo
        .get_collection(user.user_id, id)
        .await?
        .map(Json)
        .ok_or_else(|| not_found(id))
}

/// `PUT /api/collections/{id}`
pub async fn update_collection(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(update): Json<CollectionUpdate>,
) -> Result<Json<Collection>> {
    state
        .repo
        .update_collection(user.user_id, id, update)
        .await?
        .map(Json)
        .ok_or_else(|| not_found(id))
}

pub async fn delete_collection(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>> {
    if state.repo.delete_collection(user.user_id, id).await? {
        Ok(Json(MessageResponse::new("Collection deleted")))
    } else {
        Err(not_found(id))
    }
}

/// `POST /api/collections/{id}/items`, 201 when new and 200 when already present
pub async fn add_item(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(item): Json<NewCollectionItem>,
) -> Result<(StatusCode, Json<AddItemResponse>)> {
    let museum: Museum = item.museum.parse()?;
    let external_id = item.external_id.trim().to_string();
    if external_id.is_empty() {
        return Err(AppError::validation("external_id", "external_id must not be empty"));
    }
    let item = NewCollectionItem {
        museum: museum.as_str().to_string(),
        external_id,
        ..item
    };

    let (item, created) = state.repo.add_collection_item(user.user_id, id, item).await?;
    let status = if created { StatusCode::CREATED } else { StatusCode::OK };

    Ok((status, Json(AddItemResponse { created, item })))
}

/// `DELETE /api/collections/{id}/items/{item_id}`
pub async fn remove_item(
    State(state): State<AppState>,
    user: AuthUser,
    Path((id, item_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<MessageResponse>> {
    if state.repo.remove_collection_item(user.user_id, id, item_id).await? {
        Ok(Json(MessageResponse::new("Item removed")))
    } else {
        Err(AppError::NotFound {
            resource_type: "collection item".to_string(),
            id: item_id.to_string(),
        })
    }
}

/// `PUT /api/collections/{id}/items/order`
pub async fn reorder_items(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(request): Json<ReorderRequest>,
) -> Result<Json<CollectionWithItems>> {
    let collection = state
        .repo
        .reorder_collection_items(user.user_id, id, request.item_ids)
        .await?;
    Ok(Json(collection))
}

/// `GET /api/shared/collections/{slug}`, public collections only
pub async fn get_shared_collection(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<CollectionWithItems>> {
    state
        .repo
        .get_public_collection_by_slug(&slug)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound {
            resource_type: "collection".to_string(),
            id: slug,
        })
}
