//! Repository pattern for database operations
//!
//! One `Repository` wraps the pool; its methods are grouped by table in the
//! submodules. Every user-owned query is scoped by `user_id`.

mod cache;
mod collections;
mod favorites;
mod harvest;
mod journal;
mod paintings;
mod tags;

pub use collections::{CollectionSummary, CollectionUpdate, CollectionWithItems, NewCollectionItem};
pub use favorites::{FavoriteDetail, FavoriteFilter, FavoriteWithTags};
pub use paintings::{CatalogueStats, PaintingPage};
pub use tags::TagCount;

use crate::db::DbPool;
use crate::errors::Result;
use sea_orm::sea_query::LikeExpr;
use sea_orm::{DatabaseConnection, DbErr, SqlErr};

/// Repository for data access operations
#[derive(Clone)]
pub struct Repository {
    pool: DbPool,
}

impl Repository {
    /// Create a new repository with the given connection pool
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Get the read connection
    fn read_conn(&self) -> &DatabaseConnection {
        self.pool.read()
    }

    /// Get the write connection
    fn write_conn(&self) -> &DatabaseConnection {
        self.pool.write()
    }

    /// Ping the database
    pub async fn ping(&self) -> Result<()> {
        self.pool.ping().await
    }
}

/// Offset for a 1-based page
pub(crate) fn page_offset(page: u64, limit: u64) -> u64 {
    page.saturating_sub(1) * limit
}

/// `LIKE` pattern matching `needle` anywhere, lowercased, with `%` and `_` taken literally
pub(crate) fn contains_pattern(needle: &str) -> LikeExpr {
    let mut escaped = String::with_capacity(needle.len() + 2);
    escaped.push('%');
    for c in needle.to_lowercase().chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    LikeExpr::new(escaped).escape('\\')
}

fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::museums::{Museum, PaintingRecord};
    use artstuff_migration::{Migrator, MigratorTrait};
    use sea_orm::Database;

    /// Repository over a migrated in-memory SQLite database
    pub async fn repository() -> Repository {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        Migrator::up(&db, None).await.unwrap();
        Repository::new(DbPool::from_connection(db))
    }

    pub fn record(museum: Museum, external_id: &str, title: &str, artist: &str) -> PaintingRecord {
        let mut record = PaintingRecord::new(museum, external_id)
            .title(Some(title.to_string()))
            .artist(Some(artist.to_string()));
        record.image_url = Some(format!("https://img.example/{}.jpg", external_id));
        record
    }
}
