use sea_orm_migration::{prelude::*, schema::*};

static IDX_PAINTINGS_MUSEUM_EXTERNAL_ID: &str = "idx-paintings-museum-external_id";
static IDX_PAINTINGS_ARTIST: &str = "idx-paintings-artist";

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Paintings::Table)
                    .if_not_exists()
                    .col(pk_uuid(Paintings::Id))
                    .col(text(Paintings::ExternalId))
                    .col(text(Paintings::Museum))
                    .col(text_null(Paintings::MuseumName))
                    .col(text(Paintings::Title))
                    .col(text(Paintings::Artist))
                    .col(text_null(Paintings::DateDisplay))
                    .col(text_null(Paintings::Medium))
                    .col(text_null(Paintings::Dimensions))
                    .col(text_null(Paintings::Description))
                    .col(text_null(Paintings::ImageUrl))
                    .col(text_null(Paintings::ThumbnailUrl))
                    .col(text_null(Paintings::MuseumUrl))
                    .col(json_binary(Paintings::Metadata))
                    .col(timestamp_with_time_zone(Paintings::CreatedAt))
                    .col(timestamp_with_time_zone(Paintings::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name(IDX_PAINTINGS_MUSEUM_EXTERNAL_ID)
                    .table(Paintings::Table)
                    .col(Paintings::Museum)
                    .col(Paintings::ExternalId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name(IDX_PAINTINGS_ARTIST)
                    .table(Paintings::Table)
                    .col(Paintings::Artist)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Paintings::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
pub enum Paintings {
    Table,
    Id,
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
    UpdatedAt,
}
