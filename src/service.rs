//! Inventory service facade.
//!
//! Sits between the REST surface / order handler and the item store, and
//! keeps storage records out of both: callers work purely in terms of
//! [`InventoryItem`].

use std::sync::Arc;

use crate::model::InventoryItem;
use crate::page::{Page, PageRequest};
use crate::store::{ItemDraft, ItemRecord, ItemStore, Result};

/// Query/command facade over the item store.
#[derive(Clone)]
pub struct InventoryService {
    store: Arc<dyn ItemStore>,
}

impl InventoryService {
    pub fn new(store: Arc<dyn ItemStore>) -> Self {
        Self { store }
    }

    /// One page of the catalog, ordered by item id.
    pub async fn get_inventory(&self, request: PageRequest) -> Result<Page<InventoryItem>> {
        let content = self.store.page(request).await?;
        let total = self.store.count().await?;
        Ok(Page::new(content, request, total).map(InventoryItem::from))
    }

    /// Fetch one item, or `None` when the id is unknown.
    pub async fn get_item(&self, id: i64) -> Result<Option<InventoryItem>> {
        Ok(self.store.get(id).await?.map(InventoryItem::from))
    }

    /// Persist a new item, returning a copy with its assigned id.
    pub async fn create_item(&self, item: InventoryItem) -> Result<InventoryItem> {
        let record = self.store.create(&ItemDraft::from(item)).await?;
        Ok(record.into())
    }

    /// Replace a stored item's fields. Returns false for an unknown id.
    pub async fn update_item(&self, item: InventoryItem) -> Result<bool> {
        self.store.update(&ItemRecord::from(item)).await
    }

    /// Delete an item. Deleting an unknown id is a no-op.
    pub async fn delete_item(&self, id: i64) -> Result<bool> {
        self.store.delete(id).await
    }

    /// Atomically remove `count` units of an item's stock.
    ///
    /// Returns the stock level after the deduction, or `None` for an
    /// unknown item.
    pub async fn deduct_stock(&self, item_id: i64, count: i64) -> Result<Option<i64>> {
        self.store.deduct_stock(item_id, count).await
    }
}
