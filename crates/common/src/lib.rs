//! Art Stuff Common Library
//!
//! Shared code for the gateway and the harvester including:
//! - Museum API sources and the response cache
//! - Catalogue and live search
//! - Database models and repository patterns
//! - Curated explore categories
//! - Error types and handling
//! - Configuration management
//! - Authentication utilities
//! - Metrics and observability

pub mod auth;
pub mod cache;
pub mod config;
pub mod db;
pub mod errors;
pub mod explore;
pub mod logging;
pub mod metrics;
pub mod museums;
pub mod search;

// Re-export commonly used types
pub use config::AppConfig;
pub use db::Repository;
pub use errors::{AppError, Result};
pub use museums::{Museum, MuseumSource, PaintingRecord};
pub use search::SearchService;

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
