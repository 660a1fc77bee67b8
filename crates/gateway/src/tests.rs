//! Route tests over an in-memory SQLite database

use crate::{build_state, create_router, AppState};
use artstuff_common::{
    config::{AppConfig, CacheBackend},
    db::DbPool,
    museums::{Museum, PaintingRecord},
    Repository,
};
use artstuff_migration::{Migrator, MigratorTrait};
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use sea_orm::Database;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;
use uuid::Uuid;

fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.auth.jwt_secret = Some("gateway-test-secret".to_string());
    config.cache.backend = CacheBackend::None;
    // No live museum sources in route tests
    config.museums.enabled = vec!["offline".to_string()];
    config.rate_limit.enabled = false;
    config
}

async fn setup(config: AppConfig) -> (Router, AppState) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    Migrator::up(&db, None).await.unwrap();
    let repo = Repository::new(DbPool::from_connection(db));

    let state = build_state(Arc::new(config), repo).await.unwrap();
    (create_router(state.clone()), state)
}

fn token(state: &AppState, user_id: Uuid) -> String {
    state
        .jwt
        .generate_token(user_id, None, chrono::Duration::hours(1))
        .unwrap()
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

fn painting(external_id: &str, title: &str, artist: &str) -> PaintingRecord {
    let mut record = PaintingRecord::new(Museum::Aic, external_id)
        .title(Some(title.to_string()))
        .artist(Some(artist.to_string()));
    record.image_url = Some(format!("https://www.artic.edu/iiif/2/{}/full/1686,/0/default.jpg", external_id));
    record.date_display = Some("1884".to_string());
    record
}

#[tokio::test]
async fn test_health_and_ready() {
    let (app, _) = setup(test_config()).await;

    let (status, body) = send(&app, Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");

    let (status, body) = send(&app, Method::GET, "/ready", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["checks"]["database"]["status"], "up");
}

#[tokio::test]
async fn test_search_validation_and_catalogue_hits() {
    let (app, state) = setup(test_config()).await;
    state
        .repo
        .upsert_painting(&painting("27992", "A Sunday on La Grande Jatte", "Georges Seurat"))
        .await
        .unwrap();

    let (status, body) = send(&app, Method::GET, "/api/search?q=%20", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

    let (status, body) = send(&app, Method::GET, "/api/search?q=seurat&mode=catalogue", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 1);
    assert_eq!(body["mode"], "catalogue");
    assert_eq!(body["paintings"][0]["title"], "A Sunday on La Grande Jatte");

    let (status, body) = send(&app, Method::GET, "/api/search?q=rembrant", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 0);
    assert_eq!(body["suggestion"], "Rembrandt");

    let (status, _) = send(&app, Method::GET, "/api/search?q=monet&museum=louvre", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_signed_in_routes_require_token() {
    let (app, _) = setup(test_config()).await;

    let (status, body) = send(&app, Method::GET, "/api/favorites", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["error"]["message"].is_string());

    let (status, _) = send(&app, Method::GET, "/api/tags", Some("garbage"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_favorite_tag_and_journal_flow() {
    let (app, state) = setup(test_config()).await;
    state
        .repo
        .upsert_painting(&painting("27992", "A Sunday on La Grande Jatte", "Georges Seurat"))
        .await
        .unwrap();
    let user = token(&state, Uuid::new_v4());
    let user = Some(user.as_str());

    let favorite = json!({
        "external_id": "27992",
        "museum": "aic",
        "title": "A Sunday on La Grande Jatte",
        "artist": "Georges Seurat",
        "image_url": "https://www.artic.edu/iiif/2/27992/full/1686,/0/default.jpg"
    });
    let (status, body) = send(&app, Method::POST, "/api/favorites", user, Some(favorite.clone())).await;
    assert_eq!(status, StatusCode::CREATED);
    let id = body["id"].as_str().unwrap().to_string();

    let (status, body) = send(&app, Method::POST, "/api/favorites", user, Some(favorite)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["created"], false);
    assert_eq!(body["id"], id.as_str());

    let (status, body) = send(
        &app,
        Method::POST,
        &format!("/api/favorites/{}/tags", id),
        user,
        Some(json!({"tag": " Pointillism "})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["added"], true);

    let (status, body) = send(
        &app,
        Method::POST,
        &format!("/api/favorites/{}/journal", id),
        user,
        Some(json!({"entry_text": "All those dots"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["is_public"], false);

    let (status, body) = send(&app, Method::GET, "/api/painting/aic/27992", user, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["is_favorite"], true);
    assert_eq!(body["favorite_id"], id.as_str());
    assert_eq!(body["tags"], json!(["pointillism"]));

    let (_, body) = send(&app, Method::GET, "/api/painting/aic/27992", None, None).await;
    assert_eq!(body["is_favorite"], false);

    let (status, body) = send(&app, Method::GET, "/api/favorites?tag=pointillism", user, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["favorites"].as_array().unwrap().len(), 1);

    let (status, body) = send(&app, Method::GET, "/api/painting-of-the-day", user, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["painting"]["id"], id.as_str());

    let (status, _) = send(&app, Method::DELETE, &format!("/api/favorites/{}", id), user, None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, Method::GET, &format!("/api/favorites/{}", id), user, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "FAVORITE_NOT_FOUND");

    let (_, body) = send(&app, Method::GET, "/api/painting-of-the-day", user, None).await;
    assert!(body["painting"].is_null());
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn test_missing_painting_is_404() {
    let (app, _) = setup(test_config()).await;

    let (status, body) = send(&app, Method::GET, "/api/painting/aic/1", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "PAINTING_NOT_FOUND");
}

#[tokio::test]
async fn test_collections_and_sharing() {
    let (app, state) = setup(test_config()).await;
    let owner = token(&state, Uuid::new_v4());
    let owner = Some(owner.as_str());

    let (status, body) = send(&app, Method::POST, "/api/collections", owner, Some(json!({"name": ""}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_object());

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/collections",
        owner,
        Some(json!({"name": "Sunday Afternoons"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = body["id"].as_str().unwrap().to_string();
    let slug = body["slug"].as_str().unwrap().to_string();

    let item = json!({
        "external_id": "27992",
        "museum": "aic",
        "title": "A Sunday on La Grande Jatte",
        "artist": "Georges Seurat"
    });
    let items_uri = format!("/api/collections/{}/items", id);
    let (status, _) = send(&app, Method::POST, &items_uri, owner, Some(item.clone())).await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, body) = send(&app, Method::POST, &items_uri, owner, Some(item)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["created"], false);

    let padded = json!({
        "external_id": " 27992 ",
        "museum": "AIC",
        "title": "A Sunday on La Grande Jatte",
        "artist": "Georges Seurat"
    });
    let (status, body) = send(&app, Method::POST, &items_uri, owner, Some(padded)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["created"], false);

    let shared_uri = format!("/api/shared/collections/{}", slug);
    let (status, _) = send(&app, Method::GET, &shared_uri, None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(
        &app,
        Method::PUT,
        &format!("/api/collections/{}", id),
        owner,
        Some(json!({"is_public": true})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["is_public"], true);

    let (status, body) = send(&app, Method::GET, &shared_uri, None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["items"].as_array().unwrap().len(), 1);

    let (_, body) = send(&app, Method::GET, "/api/collections", owner, None).await;
    assert_eq!(body["collections"][0]["item_count"], 1);

    let stranger = token(&state, Uuid::new_v4());
    let (status, _) = send(
        &app,
        Method::GET,
        &format!("/api/collections/{}", id),
        Some(stranger.as_str()),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_explore_and_stats() {
    let (app, state) = setup(test_config()).await;
    state
        .repo
        .upsert_painting(&painting("1", "Luncheon of the Boating Party", "Pierre-Auguste Renoir"))
        .await
        .unwrap();

    let (status, body) = send(&app, Method::GET, "/api/explore/categories", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["eras"].as_array().unwrap().len() >= 8);
    assert!(body["featured_artist"]["name"].is_string());

    let (status, body) = send(&app, Method::GET, "/api/explore/era/impressionism", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 1);

    let (status, _) = send(&app, Method::GET, "/api/explore/genre/impressionism", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(&app, Method::GET, "/api/explore/artist/renoir", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["paintings"].as_array().unwrap().len(), 1);

    let (status, body) = send(&app, Method::GET, "/api/explore/surprise", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["external_id"], "1");

    let (status, body) = send(&app, Method::GET, "/api/stats", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["paintings"], 1);
    assert_eq!(body["by_museum"]["aic"], 1);
}

#[tokio::test]
async fn test_rate_limit_rejects_excess() {
    let mut config = test_config();
    config.rate_limit.enabled = true;
    config.rate_limit.requests_per_second = 1;
    config.rate_limit.burst = 1;
    let (app, _) = setup(config).await;

    let (status, _) = send(&app, Method::GET, "/api/stats", None, None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, body) = send(&app, Method::GET, "/api/stats", None, None).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["error"]["code"], "RATE_LIMITED");

    // Probes bypass the limiter
    let (status, _) = send(&app, Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
}
