//! Configuration management for Art Stuff services
//!
//! Supports loading configuration from:
//! - Environment variables (prefixed with APP__)
//! - Configuration files (config/default, config/{APP_ENV}, config/local)
//! - Default values

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// Supabase JWT verification
    #[serde(default)]
    pub auth: AuthConfig,

    /// Museum API endpoints and credentials
    #[serde(default)]
    pub museums: MuseumsConfig,

    /// Response cache configuration
    #[serde(default)]
    pub cache: CacheConfig,

    /// Search defaults
    #[serde(default)]
    pub search: SearchConfig,

    /// Harvester behaviour
    #[serde(default)]
    pub harvest: HarvestConfig,

    /// Observability configuration
    #[serde(default)]
    pub observability: ObservabilityConfig,

    /// Rate limiting configuration
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Host to bind to
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,

    /// Request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Shutdown timeout in seconds
    #[serde(default = "default_shutdown_timeout")]
    pub shutdown_timeout_secs: u64,

    /// Allowed CORS origins; empty means any
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    /// Primary database URL (for writes)
    pub url: String,

    /// Read replica URL (optional, falls back to primary)
    pub read_url: Option<String>,

    /// Maximum number of connections
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// Minimum number of connections
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,

    /// Connection timeout in seconds
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    /// Idle timeout in seconds
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,

    /// Run pending migrations on startup
    #[serde(default)]
    pub run_migrations: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthConfig {
    /// Supabase project JWT secret (HS256)
    pub jwt_secret: Option<String>,

    /// Expected audience claim
    #[serde(default = "default_jwt_audience")]
    pub jwt_audience: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MuseumsConfig {
    /// Per-request timeout for museum APIs in seconds
    #[serde(default = "default_museum_timeout")]
    pub timeout_secs: u64,

    /// Upper bound for a whole fan-out search in seconds
    #[serde(default = "default_fanout_timeout")]
    pub fanout_timeout_secs: u64,

    /// Museums to query; empty means every configured source
    #[serde(default)]
    pub enabled: Vec<String>,

    #[serde(default = "default_aic_base")]
    pub aic_base_url: String,

    #[serde(default = "default_aic_iiif")]
    pub aic_iiif_url: String,

    #[serde(default = "default_met_base")]
    pub met_base_url: String,

    /// Met department filter (11 = European Paintings)
    #[serde(default = "default_met_department")]
    pub met_department_id: u32,

    #[serde(default = "default_rijks_oai")]
    pub rijks_oai_url: String,

    /// OAI-PMH set holding the paintings
    #[serde(default = "default_rijks_set")]
    pub rijks_set: String,

    /// Maximum resumption pages loaded into the Rijks catalogue
    #[serde(default = "default_rijks_max_pages")]
    pub rijks_max_pages: u32,

    #[serde(default = "default_cleveland_base")]
    pub cleveland_base_url: String,

    #[serde(default = "default_harvard_base")]
    pub harvard_base_url: String,
    pub harvard_api_key: Option<String>,

    #[serde(default = "default_europeana_base")]
    pub europeana_base_url: String,
    pub europeana_api_key: Option<String>,

    #[serde(default = "default_smithsonian_base")]
    pub smithsonian_base_url: String,
    pub smithsonian_api_key: Option<String>,

    #[serde(default = "default_smk_base")]
    pub smk_base_url: String,
}

/// Which store backs the museum response cache
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackend {
    /// `api_cache` table
    Database,
    Redis,
    /// Process-local map, lost on restart
    Memory,
    None,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CacheConfig {
    #[serde(default = "default_cache_backend")]
    pub backend: CacheBackend,

    /// Time to live for cached museum responses in hours
    #[serde(default = "default_cache_ttl_hours")]
    pub ttl_hours: u64,

    /// Redis URL when backend = redis
    #[serde(default = "default_redis_url")]
    pub redis_url: String,

    /// Key prefix for cache entries
    #[serde(default = "default_cache_prefix")]
    pub key_prefix: String,

    /// Days after which stale api_cache rows are purged
    #[serde(default = "default_cache_retention_days")]
    pub retention_days: i64,
}

/// How /api/search resolves a query
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SearchMode {
    /// Local harvested paintings table only
    Catalogue,
    /// Live fan-out to the museum APIs
    Live,
    /// Catalogue first, live fan-out when nothing matched
    #[default]
    Auto,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SearchConfig {
    #[serde(default)]
    pub default_mode: SearchMode,

    #[serde(default = "default_search_limit")]
    pub default_limit: u64,

    #[serde(default = "default_search_max_limit")]
    pub max_limit: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HarvestConfig {
    /// Result pages fetched per search term
    #[serde(default = "default_harvest_pages")]
    pub pages_per_term: u32,

    /// Results requested per page
    #[serde(default = "default_harvest_page_size")]
    pub page_size: u64,

    /// Pause between museum requests in milliseconds
    #[serde(default = "default_harvest_pause")]
    pub pause_ms: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ObservabilityConfig {
    /// Log level (debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Enable JSON logging
    #[serde(default = "default_json_logging")]
    pub json_logging: bool,

    /// Metrics port (0 to disable)
    #[serde(default = "default_metrics_port")]
    pub metrics_port: u16,

    /// Service name for tracing
    #[serde(default = "default_service_name")]
    pub service_name: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RateLimitConfig {
    /// Requests per second
    #[serde(default = "default_rate_limit")]
    pub requests_per_second: u32,

    /// Burst capacity
    #[serde(default = "default_burst")]
    pub burst: u32,

    /// Enable rate limiting
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

// Default value functions
fn default_host() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16 { 8080 }
fn default_request_timeout() -> u64 { 30 }
fn default_shutdown_timeout() -> u64 { 30 }
fn default_max_connections() -> u32 { 20 }
fn default_min_connections() -> u32 { 2 }
fn default_connect_timeout() -> u64 { 10 }
fn default_idle_timeout() -> u64 { 300 }
fn default_jwt_audience() -> String { "authenticated".to_string() }
fn default_museum_timeout() -> u64 { 15 }
fn default_fanout_timeout() -> u64 { 20 }
fn default_aic_base() -> String { "https://api.artic.edu/api/v1".to_string() }
fn default_aic_iiif() -> String { "https://www.artic.edu/iiif/2".to_string() }
fn default_met_base() -> String { "https://collectionapi.metmuseum.org/public/collection/v1".to_string() }
fn default_met_department() -> u32 { 11 }
fn default_rijks_oai() -> String { "https://data.rijksmuseum.nl/oai".to_string() }
fn default_rijks_set() -> String { "261208".to_string() }
fn default_rijks_max_pages() -> u32 { 50 }
fn default_cleveland_base() -> String { "https://openaccess-api.clevelandart.org/api".to_string() }
fn default_harvard_base() -> String { "https://api.harvardartmuseums.org".to_string() }
fn default_europeana_base() -> String { "https://api.europeana.eu/record/v2".to_string() }
fn default_smithsonian_base() -> String { "https://api.si.edu/openaccess/api/v1.0".to_string() }
fn default_smk_base() -> String { "https://api.smk.dk/api/v1".to_string() }
fn default_cache_backend() -> CacheBackend { CacheBackend::Database }
fn default_cache_ttl_hours() -> u64 { 24 }
fn default_redis_url() -> String { "redis://localhost:6379".to_string() }
fn default_cache_prefix() -> String { "artstuff".to_string() }
fn default_cache_retention_days() -> i64 { 7 }
fn default_search_limit() -> u64 { 20 }
fn default_search_max_limit() -> u64 { 100 }
fn default_harvest_pages() -> u32 { 3 }
fn default_harvest_page_size() -> u64 { 20 }
fn default_harvest_pause() -> u64 { 500 }
fn default_log_level() -> String { "info".to_string() }
fn default_json_logging() -> bool { true }
fn default_metrics_port() -> u16 { 9090 }
fn default_service_name() -> String { "artstuff".to_string() }
fn default_rate_limit() -> u32 { 50 }
fn default_burst() -> u32 { 100 }
fn default_enabled() -> bool { true }

impl AppConfig {
    /// Load configuration from environment and files
    pub fn load() -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());

        let config = Config::builder()
            // Load base config file
            .add_source(File::with_name("config/default").required(false))
            // Load environment-specific config
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            // Load local overrides
            .add_source(File::with_name("config/local").required(false))
            // e.g., APP__SERVER__PORT=8081, APP__MUSEUMS__HARVARD_API_KEY=...
            .add_source(
                Environment::with_prefix("APP")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("museums.enabled")
                    .with_list_parse_key("server.cors_origins")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Load from a specific TOML file
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(File::with_name(path))
            .add_source(
                Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Get request timeout as Duration
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.server.request_timeout_secs)
    }

    /// Get shutdown timeout as Duration
    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.server.shutdown_timeout_secs)
    }

    /// Get the read database URL (falls back to primary)
    pub fn read_database_url(&self) -> &str {
        self.database.read_url.as_deref().unwrap_or(&self.database.url)
    }
}

impl MuseumsConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn fanout_timeout(&self) -> Duration {
        Duration::from_secs(self.fanout_timeout_secs)
    }

    /// Whether a museum id is allowed by the `enabled` list
    pub fn allows(&self, museum: &str) -> bool {
        self.enabled.is_empty() || self.enabled.iter().any(|m| m.eq_ignore_ascii_case(museum))
    }
}

impl SearchMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchMode::Catalogue => "catalogue",
            SearchMode::Live => "live",
            SearchMode::Auto => "auto",
        }
    }
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_hours * 3600)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            request_timeout_secs: default_request_timeout(),
            shutdown_timeout_secs: default_shutdown_timeout(),
            cors_origins: Vec::new(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "postgres://localhost/artstuff".to_string(),
            read_url: None,
            max_connections: default_max_connections(),
            min_connections: default_min_connections(),
            connect_timeout_secs: default_connect_timeout(),
            idle_timeout_secs: default_idle_timeout(),
            run_migrations: false,
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: None,
            jwt_audience: default_jwt_audience(),
        }
    }
}

impl Default for MuseumsConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_museum_timeout(),
            fanout_timeout_secs: default_fanout_timeout(),
            enabled: Vec::new(),
            aic_base_url: default_aic_base(),
            aic_iiif_url: default_aic_iiif(),
            met_base_url: default_met_base(),
            met_department_id: default_met_department(),
            rijks_oai_url: default_rijks_oai(),
            rijks_set: default_rijks_set(),
            rijks_max_pages: default_rijks_max_pages(),
            cleveland_base_url: default_cleveland_base(),
            harvard_base_url: default_harvard_base(),
            harvard_api_key: None,
            europeana_base_url: default_europeana_base(),
            europeana_api_key: None,
            smithsonian_base_url: default_smithsonian_base(),
            smithsonian_api_key: None,
            smk_base_url: default_smk_base(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            backend: default_cache_backend(),
            ttl_hours: default_cache_ttl_hours(),
            redis_url: default_redis_url(),
            key_prefix: default_cache_prefix(),
            retention_days: default_cache_retention_days(),
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_mode: SearchMode::default(),
            default_limit: default_search_limit(),
            max_limit: default_search_max_limit(),
        }
    }
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            pages_per_term: default_harvest_pages(),
            page_size: default_harvest_page_size(),
            pause_ms: default_harvest_pause(),
        }
    }
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            json_logging: default_json_logging(),
            metrics_port: default_metrics_port(),
            service_name: default_service_name(),
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            requests_per_second: default_rate_limit(),
            burst: default_burst(),
            enabled: default_enabled(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            database: DatabaseConfig::default(),
            auth: AuthConfig::default(),
            museums: MuseumsConfig::default(),
            cache: CacheConfig::default(),
            search: SearchConfig::default(),
            harvest: HarvestConfig::default(),
            observability: ObservabilityConfig::default(),
            rate_limit: RateLimitConfig::default(),
        }
    }
}
