pub use sea_orm_migration::prelude::*;

mod m20250101_000001_paintings;
mod m20250101_000002_favorites;
mod m20250101_000003_tags;
mod m20250101_000004_journal_entries;
mod m20250101_000005_collections;
mod m20250101_000006_operations;
mod m20250101_000007_row_level_security;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250101_000001_paintings::Migration),
            Box::new(m20250101_000002_favorites::Migration),
            Box::new(m20250101_000003_tags::Migration),
            Box::new(m20250101_000004_journal_entries::Migration),
            Box::new(m20250101_000005_collections::Migration),
            Box::new(m20250101_000006_operations::Migration),
            Box::new(m20250101_000007_row_level_security::Migration),
        ]
    }
}
