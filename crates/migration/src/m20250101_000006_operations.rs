use sea_orm_migration::{prelude::*, schema::*};

static IDX_HARVEST_LOGS_MUSEUM: &str = "idx-harvest_logs-museum";
static IDX_API_CACHE_EXPIRES_AT: &str = "idx-api_cache-expires_at";

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(HarvestLogs::Table)
                    .if_not_exists()
                    .col(pk_uuid(HarvestLogs::Id))
                    .col(text(HarvestLogs::Museum))
                    .col(text(HarvestLogs::Status))
                    .col(integer(HarvestLogs::PaintingsHarvested).default(0))
                    .col(text_null(HarvestLogs::Message))
                    .col(timestamp_with_time_zone(HarvestLogs::CreatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name(IDX_HARVEST_LOGS_MUSEUM)
                    .table(HarvestLogs::Table)
                    .col(HarvestLogs::Museum)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ApiCache::Table)
                    .if_not_exists()
                    .col(text(ApiCache::CacheKey).primary_key())
                    .col(json_binary(ApiCache::ResponseData))
                    .col(timestamp_with_time_zone(ApiCache::ExpiresAt))
                    .col(timestamp_with_time_zone(ApiCache::CreatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name(IDX_API_CACHE_EXPIRES_AT)
                    .table(ApiCache::Table)
                    .col(ApiCache::ExpiresAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ApiCache::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(HarvestLogs::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
pub enum HarvestLogs {
    Table,
    Id,
    Museum,
    Status,
    PaintingsHarvested,
    Message,
    CreatedAt,
}

#[derive(DeriveIden)]
pub enum ApiCache {
    Table,
    CacheKey,
    ResponseData,
    ExpiresAt,
    CreatedAt,
}
