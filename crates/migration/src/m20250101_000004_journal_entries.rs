use sea_orm_migration::{prelude::*, schema::*};

use crate::m20250101_000002_favorites::Favorites;

static IDX_JOURNAL_ENTRIES_FAVORITE_ID: &str = "idx-journal_entries-favorite_id";
static FK_JOURNAL_ENTRIES_FAVORITE_ID: &str = "fk-journal_entries-favorite_id";

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(JournalEntries::Table)
                    .if_not_exists()
                    .col(pk_uuid(JournalEntries::Id))
                    .col(uuid(JournalEntries::FavoriteId))
                    .col(uuid(JournalEntries::UserId))
                    .col(text(JournalEntries::EntryText))
                    .col(boolean(JournalEntries::IsPublic).default(false))
                    .col(timestamp_with_time_zone(JournalEntries::CreatedAt))
                    .col(timestamp_with_time_zone(JournalEntries::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name(FK_JOURNAL_ENTRIES_FAVORITE_ID)
                            .from(JournalEntries::Table, JournalEntries::FavoriteId)
                            .to(Favorites::Table, Favorites::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name(IDX_JOURNAL_ENTRIES_FAVORITE_ID)
                    .table(JournalEntries::Table)
                    .col(JournalEntries::FavoriteId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(JournalEntries::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
pub enum JournalEntries {
    Table,
    Id,
    FavoriteId,
    UserId,
    EntryText,
    IsPublic,
    CreatedAt,
    UpdatedAt,
}
