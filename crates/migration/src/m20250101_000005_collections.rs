use sea_orm_migration::{prelude::*, schema::*};

static IDX_COLLECTIONS_USER_ID: &str = "idx-collections-user_id";
static IDX_COLLECTION_ITEMS_UNIQUE: &str = "idx-collection_items-collection_id-museum-external_id";
static FK_COLLECTION_ITEMS_COLLECTION_ID: &str = "fk-collection_items-collection_id";

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Collections::Table)
                    .if_not_exists()
                    .col(pk_uuid(Collections::Id))
                    .col(uuid(Collections::UserId))
                    .col(text(Collections::Name))
                    .col(text_null(Collections::Description))
                    .col(boolean(Collections::IsPublic).default(false))
                    .col(text_uniq(Collections::Slug))
                    .col(timestamp_with_time_zone(Collections::CreatedAt))
                    .col(timestamp_with_time_zone(Collections::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name(IDX_COLLECTIONS_USER_ID)
                    .table(Collections::Table)
                    .col(Collections::UserId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(CollectionItems::Table)
                    .if_not_exists()
                    .col(pk_uuid(CollectionItems::Id))
                    .col(uuid(CollectionItems::CollectionId))
                    .col(text(CollectionItems::ExternalId))
                    .col(text(CollectionItems::Museum))
                    .col(text(CollectionItems::Title))
                    .col(text(CollectionItems::Artist))
                    .col(text_null(CollectionItems::ImageUrl))
                    .col(text_null(CollectionItems::ThumbnailUrl))
                    .col(text_null(CollectionItems::Note))
                    .col(integer(CollectionItems::Position).default(0))
                    .col(timestamp_with_time_zone(CollectionItems::CreatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name(FK_COLLECTION_ITEMS_COLLECTION_ID)
                            .from(CollectionItems::Table, CollectionItems::CollectionId)
                            .to(Collections::Table, Collections::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name(IDX_COLLECTION_ITEMS_UNIQUE)
                    .table(CollectionItems::Table)
                    .col(CollectionItems::CollectionId)
                    .col(CollectionItems::Museum)
                    .col(CollectionItems::ExternalId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(CollectionItems::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Collections::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
pub enum Collections {
    Table,
    Id,
    UserId,
    Name,
    Description,
    IsPublic,
    Slug,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
pub enum CollectionItems {
    Table,
    Id,
    CollectionId,
    ExternalId,
    Museum,
    Title,
    Artist,
    ImageUrl,
    ThumbnailUrl,
    Note,
    Position,
    CreatedAt,
}
