//! Item storage.
//!
//! Pluggable backing store for the item catalog. Implementations exist for
//! SQLite and PostgreSQL, feature-gated on their respective backends.

use std::sync::Arc;

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::info;

use crate::model::InventoryItem;
use crate::page::PageRequest;

// Implementation modules
#[cfg(any(feature = "sqlite", feature = "postgres"))]
pub mod schema;
#[cfg(feature = "sqlite")]
pub mod sqlite;
#[cfg(feature = "postgres")]
pub mod postgres;
pub mod seed;

// Re-exports
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteItemStore;
#[cfg(feature = "postgres")]
pub use postgres::PostgresItemStore;

/// First id handed out by a freshly initialized store.
///
/// The identity sequence starts well above zero so item ids are never
/// mistaken for page indexes or counts in logs and test data.
pub const FIRST_ITEM_ID: i64 = 13401;

// ============================================================================
// Traits
// ============================================================================

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors from item store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(String),

    #[error("corrupt stored value: {0}")]
    Corrupt(String),
}

#[cfg(any(feature = "sqlite", feature = "postgres"))]
impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        StoreError::Database(err.to_string())
    }
}

/// A persisted inventory item row.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemRecord {
    pub id: i64,
    pub stock: i64,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub img_alt: Option<String>,
    pub img: String,
}

/// Item fields before an id has been assigned.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemDraft {
    pub stock: i64,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub img_alt: Option<String>,
    pub img: String,
}

impl From<ItemRecord> for InventoryItem {
    fn from(record: ItemRecord) -> Self {
        InventoryItem {
            id: record.id,
            name: record.name,
            description: record.description,
            price: record.price,
            stock: record.stock,
            img: record.img,
            img_alt: record.img_alt,
        }
    }
}

impl From<InventoryItem> for ItemDraft {
    /// Drops any client-supplied id; the store assigns one on insert.
    fn from(item: InventoryItem) -> Self {
        ItemDraft {
            stock: item.stock,
            name: item.name,
            description: item.description,
            price: item.price,
            img_alt: item.img_alt,
            img: item.img,
        }
    }
}

impl From<InventoryItem> for ItemRecord {
    fn from(item: InventoryItem) -> Self {
        ItemRecord {
            id: item.id,
            stock: item.stock,
            name: item.name,
            description: item.description,
            price: item.price,
            img_alt: item.img_alt,
            img: item.img,
        }
    }
}

/// Pluggable backing store for the item catalog.
///
/// Ids come from the database identity sequence starting at
/// [`FIRST_ITEM_ID`] and are never reused after deletion.
#[async_trait]
pub trait ItemStore: Send + Sync + 'static {
    /// Create the items table and its identity seed if they don't exist.
    async fn init_schema(&self) -> Result<()>;

    /// Fetch one item by id.
    async fn get(&self, id: i64) -> Result<Option<ItemRecord>>;

    /// Fetch one page window of items, ordered by id.
    async fn page(&self, request: PageRequest) -> Result<Vec<ItemRecord>>;

    /// Total number of items.
    async fn count(&self) -> Result<u64>;

    /// Insert a new item, returning its stored form with the assigned id.
    async fn create(&self, draft: &ItemDraft) -> Result<ItemRecord>;

    /// Replace the stored fields of an existing item.
    ///
    /// Returns false if no row with the record's id exists.
    async fn update(&self, record: &ItemRecord) -> Result<bool>;

    /// Delete an item by id. Deleting an absent id is not an error.
    ///
    /// Returns true if a row was removed.
    async fn delete(&self, id: i64) -> Result<bool>;

    /// Atomically subtract `count` units from an item's stock.
    ///
    /// The deduction happens in a single statement so concurrent orders for
    /// the same item never read stale stock. Returns the stock level after
    /// the deduction, or `None` if the item does not exist. Stock may go
    /// negative; overselling is a business condition, not a storage error.
    async fn deduct_stock(&self, id: i64, count: i64) -> Result<Option<i64>>;
}

// ============================================================================
// Configuration
// ============================================================================

/// Storage type discriminator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageType {
    /// SQLite file database.
    #[default]
    Sqlite,
    /// PostgreSQL.
    Postgres,
}

impl std::fmt::Display for StorageType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageType::Sqlite => write!(f, "sqlite"),
            StorageType::Postgres => write!(f, "postgres"),
        }
    }
}

/// Storage configuration (discriminated union).
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Storage type discriminator.
    #[serde(rename = "type")]
    pub storage_type: StorageType,
    /// SQLite database file path.
    pub path: String,
    /// PostgreSQL connection URI.
    pub uri: String,
    /// Seed the demo catalog into an empty store on startup.
    pub seed: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            storage_type: StorageType::Sqlite,
            path: "data/stockroom.db".to_string(),
            uri: "postgres://localhost:5432/stockroom".to_string(),
            seed: true,
        }
    }
}

// ============================================================================
// Factory
// ============================================================================

/// Initialize the item store based on configuration.
///
/// Connects, then runs schema init before returning, so callers can treat a
/// returned store as ready to serve. Requires the corresponding feature:
/// - SQLite: `--features sqlite` (included in default)
/// - PostgreSQL: `--features postgres`
pub async fn init_item_store(
    config: &StorageConfig,
) -> std::result::Result<Arc<dyn ItemStore>, Box<dyn std::error::Error + Send + Sync>> {
    match config.storage_type {
        StorageType::Sqlite => {
            #[cfg(feature = "sqlite")]
            {
                if let Some(parent) = std::path::Path::new(&config.path).parent() {
                    std::fs::create_dir_all(parent)?;
                }

                let pool =
                    sqlx::SqlitePool::connect(&format!("sqlite:{}?mode=rwc", config.path)).await?;
                let store = Arc::new(SqliteItemStore::new(pool));
                store.init_schema().await?;

                info!(storage = "sqlite", path = %config.path, "Item store initialized");
                Ok(store)
            }

            #[cfg(not(feature = "sqlite"))]
            {
                Err("SQLite support requires the 'sqlite' feature. Rebuild with --features sqlite"
                    .into())
            }
        }
        StorageType::Postgres => {
            #[cfg(feature = "postgres")]
            {
                let pool = sqlx::PgPool::connect(&config.uri).await?;
                let store = Arc::new(PostgresItemStore::new(pool));
                store.init_schema().await?;

                info!(storage = "postgres", "Item store initialized");
                Ok(store)
            }

            #[cfg(not(feature = "postgres"))]
            {
                Err(
                    "PostgreSQL support requires the 'postgres' feature. Rebuild with --features postgres"
                        .into(),
                )
            }
        }
    }
}

#[cfg(all(test, feature = "sqlite"))]
mod tests;
