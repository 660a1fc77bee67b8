use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::{ConnectionTrait, DatabaseBackend};

/// Owner-only policies keyed on Supabase's `auth.uid()`.
///
/// Installed only on Postgres databases that expose the `auth` schema, so the
/// same migrations run unchanged against a plain Postgres or SQLite.
const ENABLE_RLS: &str = r#"
DO $$
BEGIN
    IF EXISTS (SELECT 1 FROM pg_namespace WHERE nspname = 'auth') THEN
        ALTER TABLE favorites ENABLE ROW LEVEL SECURITY;
        ALTER TABLE tags ENABLE ROW LEVEL SECURITY;
        ALTER TABLE favorite_tags ENABLE ROW LEVEL SECURITY;
        ALTER TABLE journal_entries ENABLE ROW LEVEL SECURITY;
        ALTER TABLE collections ENABLE ROW LEVEL SECURITY;
        ALTER TABLE collection_items ENABLE ROW LEVEL SECURITY;

        CREATE POLICY favorites_owner ON favorites
            USING (user_id = auth.uid()) WITH CHECK (user_id = auth.uid());
        CREATE POLICY tags_owner ON tags
            USING (user_id = auth.uid()) WITH CHECK (user_id = auth.uid());
        CREATE POLICY favorite_tags_owner ON favorite_tags
            USING (EXISTS (SELECT 1 FROM favorites f WHERE f.id = favorite_id AND f.user_id = auth.uid()));
        CREATE POLICY journal_entries_owner ON journal_entries
            USING (user_id = auth.uid()) WITH CHECK (user_id = auth.uid());
        CREATE POLICY journal_entries_public_read ON journal_entries
            FOR SELECT USING (is_public);
        CREATE POLICY collections_owner ON collections
            USING (user_id = auth.uid()) WITH CHECK (user_id = auth.uid());
        CREATE POLICY collections_public_read ON collections
            FOR SELECT USING (is_public);
        CREATE POLICY collection_items_owner ON collection_items
            USING (EXISTS (SELECT 1 FROM collections c WHERE c.id = collection_id AND c.user_id = auth.uid()));
        CREATE POLICY collection_items_public_read ON collection_items
            FOR SELECT USING (EXISTS (SELECT 1 FROM collections c WHERE c.id = collection_id AND c.is_public));
    END IF;
END
$$;
"#;

const DISABLE_RLS: &str = r#"
DROP POLICY IF EXISTS favorites_owner ON favorites;
DROP POLICY IF EXISTS tags_owner ON tags;
DROP POLICY IF EXISTS favorite_tags_owner ON favorite_tags;
DROP POLICY IF EXISTS journal_entries_owner ON journal_entries;
DROP POLICY IF EXISTS journal_entries_public_read ON journal_entries;
DROP POLICY IF EXISTS collections_owner ON collections;
DROP POLICY IF EXISTS collections_public_read ON collections;
DROP POLICY IF EXISTS collection_items_owner ON collection_items;
DROP POLICY IF EXISTS collection_items_public_read ON collection_items;
ALTER TABLE favorites DISABLE ROW LEVEL SECURITY;
ALTER TABLE tags DISABLE ROW LEVEL SECURITY;
ALTER TABLE favorite_tags DISABLE ROW LEVEL SECURITY;
ALTER TABLE journal_entries DISABLE ROW LEVEL SECURITY;
ALTER TABLE collections DISABLE ROW LEVEL SECURITY;
ALTER TABLE collection_items DISABLE ROW LEVEL SECURITY;
"#;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        if manager.get_database_backend() != DatabaseBackend::Postgres {
            return Ok(());
        }

        manager.get_connection().execute_unprepared(ENABLE_RLS).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        if manager.get_database_backend() != DatabaseBackend::Postgres {
            return Ok(());
        }

        manager.get_connection().execute_unprepared(DISABLE_RLS).await?;

        Ok(())
    }
}
