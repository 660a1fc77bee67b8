//! Art Stuff API Gateway
//!
//! The HTTP entry point for the browser client.
//! Handles:
//! - Authentication (Supabase access tokens)
//! - Rate limiting
//! - Request routing
//! - Observability (logging, metrics, request ids)

mod handlers;
mod middleware;
#[cfg(test)]
mod tests;

use artstuff_common::{
    auth::JwtManager,
    cache::{create_cache, ResponseCache},
    config::AppConfig,
    db::DbPool,
    explore::ExploreService,
    logging::init_tracing,
    metrics,
    museums::{create_sources, MuseumClient},
    Repository, SearchService,
};
use artstuff_migration::{Migrator, MigratorTrait};
use axum::{
    extract::{FromRef, Request},
    http::{HeaderValue, Method},
    middleware::Next,
    routing::{delete, get, post, put},
    Router,
};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::{info, warn};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub repo: Repository,
    pub search: SearchService,
    pub explore: ExploreService,
    pub jwt: Arc<JwtManager>,
    pub cache: Arc<dyn ResponseCache>,
}

impl FromRef<AppState> for Arc<JwtManager> {
    fn from_ref(state: &AppState) -> Self {
        state.jwt.clone()
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Load configuration
    let config = AppConfig::load().map_err(|e| {
        eprintln!("Failed to load configuration: {}", e);
        e
    })?;

    init_tracing(&config.observability);

    info!("Starting Art Stuff API Gateway v{}", artstuff_common::VERSION);

    let config = Arc::new(config);

    // Initialize metrics
    if config.observability.metrics_port != 0 {
        let metrics_addr = SocketAddr::from(([0, 0, 0, 0], config.observability.metrics_port));
        let mut builder = PrometheusBuilder::new().with_http_listener(metrics_addr);
        for (name, buckets) in metrics::histogram_buckets() {
            builder = builder.set_buckets_for_metric(Matcher::Full(name), buckets)?;
        }
        builder.install()?;
        info!(addr = %metrics_addr, "Prometheus exporter listening");
    }
    metrics::register_metrics();

    // Initialize database connection
    info!("Connecting to database...");
    let db = DbPool::new(&config.database).await?;
    if config.database.run_migrations {
        info!("Running migrations...");
        Migrator::up(db.write(), None).await?;
    }

    let state = build_state(config.clone(), Repository::new(db)).await?;
    if !state.jwt.is_configured() {
        warn!("auth.jwt_secret is not set, signed-in routes will answer 401");
    }

    // Build the router
    let app = create_router(state);

    // Start the server
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Wire the cache, museum sources and services around a repository
pub async fn build_state(config: Arc<AppConfig>, repo: Repository) -> artstuff_common::Result<AppState> {
    let cache = create_cache(&config.cache, &repo).await?;

    let client = MuseumClient::new(
        config.museums.timeout(),
        cache.clone(),
        config.cache.ttl(),
        config.cache.key_prefix.clone(),
    )?;
    let sources = create_sources(&config.museums, client);
    info!(
        sources = sources.len(),
        enabled = sources.iter().filter(|s| s.is_enabled()).count(),
        "Museum sources configured"
    );

    let search = SearchService::new(
        repo.clone(),
        sources,
        config.search.clone(),
        config.museums.fanout_timeout(),
    );

    let jwt = Arc::new(JwtManager::new(
        config.auth.jwt_secret.as_deref(),
        &config.auth.jwt_audience,
    ));

    Ok(AppState {
        explore: ExploreService::new(repo.clone()),
        config,
        repo,
        search,
        jwt,
        cache,
    })
}

/// Create the main application router
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let origins: Vec<HeaderValue> = state
        .config
        .server
        .cors_origins
        .iter()
        .filter_map(|o| o.parse().ok())
        .collect();
    let cors = if origins.is_empty() {
        CorsLayer::new().allow_origin(Any)
    } else {
        CorsLayer::new().allow_origin(origins)
    }
    .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
    .allow_headers(Any);

    // Request ID propagation
    let request_id = SetRequestIdLayer::x_request_id(MakeRequestUuid);
    let propagate_id = PropagateRequestIdLayer::x_request_id();

    // API routes
    let api_routes = Router::new()
        // Search and painting detail (no auth)
        .route("/search", get(handlers::search::search))
        .route("/painting/{museum}/{*external_id}", get(handlers::paintings::get_painting))
        .route("/stats", get(handlers::stats::stats))

        // Painting of the day
        .route("/painting-of-the-day", get(handlers::paintings::painting_of_the_day))

        // Favorite endpoints
        .route(
            "/favorites",
            get(handlers::favorites::list_favorites).post(handlers::favorites::add_favorite),
        )
        .route(
            "/favorites/{id}",
            get(handlers::favorites::get_favorite).delete(handlers::favorites::delete_favorite),
        )

        // Tag endpoints
        .route("/tags", get(handlers::tags::list_tags))
        .route("/favorites/{id}/tags", post(handlers::tags::add_tag))
        .route("/favorites/{id}/tags/{name}", delete(handlers::tags::remove_tag))

        // Journal endpoints
        .route(
            "/favorites/{id}/journal",
            get(handlers::journal::list_entries).post(handlers::journal::add_entry),
        )
        .route(
            "/journal/{id}",
            put(handlers::journal::update_entry).delete(handlers::journal::delete_entry),
        )

        // Collection endpoints
        .route(
            "/collections",
            get(handlers::collections::list_collections).post(handlers::collections::create_collection),
        )
        .route(
            "/collections/{id}",
            get(handlers::collections::get_collection)
                .put(handlers::collections::update_collection)
                .delete(handlers::collections::delete_collection),
        )
        .route("/collections/{id}/items", post(handlers::collections::add_item))
        .route("/collections/{id}/items/order", put(handlers::collections::reorder_items))
        .route(
            "/collections/{id}/items/{item_id}",
            delete(handlers::collections::remove_item),
        )
        .route("/shared/collections/{slug}", get(handlers::collections::get_shared_collection))

        // Explore endpoints (no auth)
        .route("/explore/categories", get(handlers::explore::categories))
        .route("/explore/surprise", get(handlers::explore::surprise))
        .route("/explore/preview", get(handlers::explore::preview))
        .route("/explore/artist/{name}", get(handlers::explore::artist_works))
        .route("/explore/{kind}/{key}", get(handlers::explore::category));

    let mut app = Router::new()
        .route("/health", get(handlers::health::health))
        .route("/ready", get(handlers::health::ready))
        .nest("/api", api_routes);

    if state.config.rate_limit.enabled {
        let limiter = middleware::rate_limit::create_rate_limiter(
            state.config.rate_limit.requests_per_second,
            state.config.rate_limit.burst,
        );
        app = app.layer(axum::middleware::from_fn(move |request: Request, next: Next| {
            middleware::rate_limit::rate_limit_middleware(request, next, limiter.clone())
        }));
    }

    // Compose the app
    app.layer(axum::middleware::from_fn(middleware::metrics::track_requests))
        .layer(TimeoutLayer::new(state.config.request_timeout()))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(request_id)
        .layer(propagate_id)
        .with_state(state)
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, starting shutdown..."),
        _ = terminate => info!("Received SIGTERM, starting shutdown..."),
    }
}
