use sea_orm_migration::{prelude::*, schema::*};

use crate::m20250101_000002_favorites::Favorites;

static IDX_TAGS_USER_NAME: &str = "idx-tags-user_id-name";
static FK_FAVORITE_TAGS_FAVORITE_ID: &str = "fk-favorite_tags-favorite_id";
static FK_FAVORITE_TAGS_TAG_ID: &str = "fk-favorite_tags-tag_id";

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Tags::Table)
                    .if_not_exists()
                    .col(pk_uuid(Tags::Id))
                    .col(uuid(Tags::UserId))
                    .col(text(Tags::Name))
                    .col(timestamp_with_time_zone(Tags::CreatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name(IDX_TAGS_USER_NAME)
                    .table(Tags::Table)
                    .col(Tags::UserId)
                    .col(Tags::Name)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Foreign keys are declared inline so the table also builds on SQLite
        manager
            .create_table(
                Table::create()
                    .table(FavoriteTags::Table)
                    .if_not_exists()
                    .col(uuid(FavoriteTags::FavoriteId))
                    .col(uuid(FavoriteTags::TagId))
                    .primary_key(
                        Index::create()
                            .col(FavoriteTags::FavoriteId)
                            .col(FavoriteTags::TagId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name(FK_FAVORITE_TAGS_FAVORITE_ID)
                            .from(FavoriteTags::Table, FavoriteTags::FavoriteId)
                            .to(Favorites::Table, Favorites::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name(FK_FAVORITE_TAGS_TAG_ID)
                            .from(FavoriteTags::Table, FavoriteTags::TagId)
                            .to(Tags::Table, Tags::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(FavoriteTags::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Tags::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
pub enum Tags {
    Table,
    Id,
    UserId,
    Name,
    CreatedAt,
}

#[derive(DeriveIden)]
pub enum FavoriteTags {
    Table,
    FavoriteId,
    TagId,
}
