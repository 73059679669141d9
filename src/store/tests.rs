//! Item store contract tests (SQLite in-memory).

use rust_decimal::Decimal;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

use crate::page::PageRequest;
use crate::store::seed::seed_demo_items;
use crate::store::{
    init_item_store, ItemDraft, ItemStore, SqliteItemStore, StorageConfig, FIRST_ITEM_ID,
};

async fn test_store() -> SqliteItemStore {
    let opts = SqliteConnectOptions::new()
        .filename(":memory:")
        .create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(opts)
        .await
        .expect("failed to create in-memory pool");

    let store = SqliteItemStore::new(pool);
    store.init_schema().await.expect("failed to init schema");
    store
}

fn draft(name: &str, price_cents: i64, stock: i64) -> ItemDraft {
    ItemDraft {
        stock,
        name: name.to_string(),
        description: format!("{} description", name),
        price: Decimal::new(price_cents, 2),
        img_alt: None,
        img: "item.jpg".to_string(),
    }
}

#[tokio::test]
async fn test_init_schema_is_idempotent() {
    let store = test_store().await;
    store.init_schema().await.expect("second init failed");

    let created = store.create(&draft("Keyboard", 8950, 5)).await.unwrap();
    assert_eq!(created.id, FIRST_ITEM_ID);

    // Re-running init after inserts must not rewind the id sequence
    store.init_schema().await.expect("third init failed");
    let next = store.create(&draft("Mouse", 2475, 5)).await.unwrap();
    assert_eq!(next.id, FIRST_ITEM_ID + 1);
}

#[tokio::test]
async fn test_create_assigns_sequential_ids_from_offset() {
    let store = test_store().await;

    let first = store.create(&draft("Keyboard", 8950, 5)).await.unwrap();
    let second = store.create(&draft("Mouse", 2475, 9)).await.unwrap();

    assert_eq!(first.id, FIRST_ITEM_ID);
    assert_eq!(second.id, FIRST_ITEM_ID + 1);
}

#[tokio::test]
async fn test_get_round_trips_all_fields() {
    let store = test_store().await;

    let mut wanted = draft("Monitor", 38900, 18);
    wanted.img_alt = Some("27 inch monitor".to_string());
    let created = store.create(&wanted).await.unwrap();

    let fetched = store.get(created.id).await.unwrap().expect("item missing");
    assert_eq!(fetched, created);
    assert_eq!(fetched.price.to_string(), "389.00");
    assert_eq!(fetched.img_alt.as_deref(), Some("27 inch monitor"));
}

#[tokio::test]
async fn test_get_missing_returns_none() {
    let store = test_store().await;
    assert!(store.get(99999).await.unwrap().is_none());
}

#[tokio::test]
async fn test_page_windows_are_ordered_by_id() {
    let store = test_store().await;
    for i in 0..5 {
        store.create(&draft(&format!("Item {}", i), 1000, 1)).await.unwrap();
    }

    let first = store.page(PageRequest::of(0, 2)).await.unwrap();
    let second = store.page(PageRequest::of(1, 2)).await.unwrap();
    let last = store.page(PageRequest::of(2, 2)).await.unwrap();

    assert_eq!(first.len(), 2);
    assert_eq!(second.len(), 2);
    assert_eq!(last.len(), 1);
    assert_eq!(first[0].id, FIRST_ITEM_ID);
    assert_eq!(second[0].id, FIRST_ITEM_ID + 2);
    assert!(first[0].id < first[1].id);
}

#[tokio::test]
async fn test_page_beyond_range_is_empty() {
    let store = test_store().await;
    store.create(&draft("Solo", 1000, 1)).await.unwrap();

    assert!(store.page(PageRequest::of(7, 6)).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_count() {
    let store = test_store().await;
    assert_eq!(store.count().await.unwrap(), 0);

    store.create(&draft("A", 100, 1)).await.unwrap();
    store.create(&draft("B", 200, 1)).await.unwrap();
    assert_eq!(store.count().await.unwrap(), 2);
}

#[tokio::test]
async fn test_update_replaces_fields() {
    let store = test_store().await;
    let mut record = store.create(&draft("Webcam", 5975, 80)).await.unwrap();

    record.stock = 75;
    record.price = Decimal::new(4950, 2);
    record.description = "Discounted webcam".to_string();

    assert!(store.update(&record).await.unwrap());

    let fetched = store.get(record.id).await.unwrap().unwrap();
    assert_eq!(fetched.stock, 75);
    assert_eq!(fetched.price.to_string(), "49.50");
    assert_eq!(fetched.description, "Discounted webcam");
}

#[tokio::test]
async fn test_update_missing_returns_false() {
    let store = test_store().await;
    let mut record = store.create(&draft("Webcam", 5975, 80)).await.unwrap();
    record.id = 99999;

    assert!(!store.update(&record).await.unwrap());
}

#[tokio::test]
async fn test_delete_is_idempotent() {
    let store = test_store().await;
    let created = store.create(&draft("Desk Mat", 1925, 150)).await.unwrap();

    assert!(store.delete(created.id).await.unwrap());
    assert!(!store.delete(created.id).await.unwrap());
    assert!(store.get(created.id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_deleted_ids_are_not_reissued() {
    let store = test_store().await;
    let first = store.create(&draft("A", 100, 1)).await.unwrap();
    store.delete(first.id).await.unwrap();

    let second = store.create(&draft("B", 200, 1)).await.unwrap();
    assert!(second.id > first.id);
}

#[tokio::test]
async fn test_deduct_stock_returns_new_level() {
    let store = test_store().await;
    let created = store.create(&draft("SSD", 11950, 95)).await.unwrap();

    let remaining = store.deduct_stock(created.id, 10).await.unwrap();
    assert_eq!(remaining, Some(85));

    let fetched = store.get(created.id).await.unwrap().unwrap();
    assert_eq!(fetched.stock, 85);
}

#[tokio::test]
async fn test_deduct_stock_may_go_negative() {
    let store = test_store().await;
    let created = store.create(&draft("Cable", 975, 3)).await.unwrap();

    let remaining = store.deduct_stock(created.id, 10).await.unwrap();
    assert_eq!(remaining, Some(-7));
}

#[tokio::test]
async fn test_deduct_stock_missing_item_returns_none() {
    let store = test_store().await;
    assert_eq!(store.deduct_stock(99999, 1).await.unwrap(), None);
}

#[tokio::test]
async fn test_concurrent_deductions_are_not_lost() {
    let store = test_store().await;
    let created = store.create(&draft("Chair", 44900, 50)).await.unwrap();

    let deductions = (0..20).map(|_| store.deduct_stock(created.id, 1));
    for result in futures::future::join_all(deductions).await {
        result.unwrap().expect("item should exist");
    }

    let fetched = store.get(created.id).await.unwrap().unwrap();
    assert_eq!(fetched.stock, 30);
}

#[tokio::test]
async fn test_seed_fills_empty_store_once() {
    let store = test_store().await;

    assert_eq!(seed_demo_items(&store).await.unwrap(), 12);
    assert_eq!(store.count().await.unwrap(), 12);

    let first = store.get(FIRST_ITEM_ID).await.unwrap().expect("first seed item");
    assert!(!first.name.is_empty());

    // Second call is a no-op
    assert_eq!(seed_demo_items(&store).await.unwrap(), 0);
    assert_eq!(store.count().await.unwrap(), 12);
}

#[tokio::test]
async fn test_seed_skips_populated_store() {
    let store = test_store().await;
    store.create(&draft("Existing", 100, 1)).await.unwrap();

    assert_eq!(seed_demo_items(&store).await.unwrap(), 0);
    assert_eq!(store.count().await.unwrap(), 1);
}

#[tokio::test]
async fn test_init_item_store_creates_file_and_parent_dirs() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let path = dir.path().join("data").join("stockroom.db");

    let config = StorageConfig {
        path: path.to_string_lossy().into_owned(),
        ..StorageConfig::default()
    };
    let store = init_item_store(&config).await.expect("init failed");

    let created = store.create(&draft("Keyboard", 8950, 5)).await.unwrap();
    assert_eq!(created.id, FIRST_ITEM_ID);
    assert!(path.exists());

    // A second init against the same file finds the existing data
    let reopened = init_item_store(&config).await.expect("re-init failed");
    assert_eq!(reopened.count().await.unwrap(), 1);
}
