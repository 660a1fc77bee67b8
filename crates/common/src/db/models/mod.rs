//! SeaORM entity models
//!
//! Database entities for Art Stuff

mod api_cache;
mod collection;
mod collection_item;
mod favorite;
mod favorite_tag;
mod harvest_log;
mod journal_entry;
mod painting;
mod tag;

pub use painting::{
    Entity as PaintingEntity,
    Model as Painting,
    ActiveModel as PaintingActiveModel,
    Column as PaintingColumn,
};

pub use favorite::{
    Entity as FavoriteEntity,
    Model as Favorite,
    ActiveModel as FavoriteActiveModel,
    Column as FavoriteColumn,
};

pub use journal_entry::{
    Entity as JournalEntryEntity,
    Model as JournalEntry,
    ActiveModel as JournalEntryActiveModel,
    Column as JournalEntryColumn,
};

pub use tag::{
    Entity as TagEntity,
    Model as Tag,
    ActiveModel as TagActiveModel,
    Column as TagColumn,
};

pub use favorite_tag::{
    Entity as FavoriteTagEntity,
    Model as FavoriteTag,
    ActiveModel as FavoriteTagActiveModel,
    Column as FavoriteTagColumn,
};

pub use collection::{
    Entity as CollectionEntity,
    Model as Collection,
    ActiveModel as CollectionActiveModel,
    Column as CollectionColumn,
};

pub use collection_item::{
    Entity as CollectionItemEntity,
    Model as CollectionItem,
    ActiveModel as CollectionItemActiveModel,
    Column as CollectionItemColumn,
};

pub use harvest_log::{
    Entity as HarvestLogEntity,
    Model as HarvestLog,
    ActiveModel as HarvestLogActiveModel,
    Column as HarvestLogColumn,
    HarvestStatus,
};

pub use api_cache::{
    Entity as ApiCacheEntity,
    Model as ApiCache,
    ActiveModel as ApiCacheActiveModel,
    Column as ApiCacheColumn,
};
