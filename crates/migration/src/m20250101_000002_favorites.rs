use sea_orm_migration::{prelude::*, schema::*};

static IDX_FAVORITES_USER_MUSEUM_EXTERNAL_ID: &str = "idx-favorites-user_id-museum-external_id";
static IDX_FAVORITES_USER_CREATED_AT: &str = "idx-favorites-user_id-created_at";

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Favorites::Table)
                    .if_not_exists()
                    .col(pk_uuid(Favorites::Id))
                    .col(uuid(Favorites::UserId))
                    .col(text(Favorites::ExternalId))
                    .col(text(Favorites::Museum))
                    .col(text_null(Favorites::MuseumName))
                    .col(text(Favorites::Title))
                    .col(text(Favorites::Artist))
                    .col(text_null(Favorites::DateDisplay))
                    .col(text_null(Favorites::Medium))
                    .col(text_null(Favorites::Dimensions))
                    .col(text_null(Favorites::Description))
                    .col(text_null(Favorites::ImageUrl))
                    .col(text_null(Favorites::ThumbnailUrl))
                    .col(text_null(Favorites::MuseumUrl))
                    .col(json_binary(Favorites::Metadata))
                    .col(timestamp_with_time_zone(Favorites::CreatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name(IDX_FAVORITES_USER_MUSEUM_EXTERNAL_ID)
                    .table(Favorites::Table)
                    .col(Favorites::UserId)
                    .col(Favorites::Museum)
                    .col(Favorites::ExternalId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name(IDX_FAVORITES_USER_CREATED_AT)
                    .table(Favorites::Table)
                    .col(Favorites::UserId)
                    .col(Favorites::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Favorites::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
pub enum Favorites {
    Table,
    Id,
    UserId,
    ExternalId,
    Museum,
    MuseumName,
    Title,
    Artist,
    DateDisplay,
    Medium,
    Dimensions,
    Description,
    ImageUrl,
    ThumbnailUrl,
    MuseumUrl,
    Metadata,
    CreatedAt,
}
