//! PostgreSQL item store integration tests using testcontainers.
//!
//! Run with: cargo test --test store_postgres --features postgres -- --nocapture
//!
//! Spins up PostgreSQL in a container and runs the store contract against
//! it: schema init, identity seeding, paging windows, atomic deduction.

#![cfg(feature = "postgres")]

use std::sync::Arc;
use std::time::Duration;

use rust_decimal::Decimal;
use testcontainers::{
    core::{IntoContainerPort, WaitFor},
    runners::AsyncRunner,
    GenericImage, ImageExt,
};

use stockroom::page::PageRequest;
use stockroom::store::seed::seed_demo_items;
use stockroom::store::{ItemDraft, ItemStore, PostgresItemStore, FIRST_ITEM_ID};

/// Start PostgreSQL container.
///
/// Returns (container, connection_string) where connection_string is suitable
/// for sqlx PgPool connection.
async fn start_postgres() -> (testcontainers::ContainerAsync<GenericImage>, String) {
    // PostgreSQL prints "database system is ready to accept connections" twice:
    // once during initial setup and once when fully ready.
    let image = GenericImage::new("postgres", "16")
        .with_exposed_port(5432.tcp())
        .with_wait_for(WaitFor::message_on_stdout(
            "database system is ready to accept connections",
        ));

    let container = image
        .with_env_var("POSTGRES_USER", "stockroom")
        .with_env_var("POSTGRES_PASSWORD", "stockroom")
        .with_env_var("POSTGRES_DB", "stockroom")
        .with_startup_timeout(Duration::from_secs(60))
        .start()
        .await
        .expect("Failed to start postgres container");

    // Brief delay to ensure PostgreSQL is fully ready to accept connections
    tokio::time::sleep(Duration::from_secs(1)).await;

    let host_port = container
        .get_host_port_ipv4(5432)
        .await
        .expect("Failed to get mapped port");
    let host = container
        .get_host()
        .await
        .expect("Failed to get container host");

    let connection_string = format!(
        "postgres://stockroom:stockroom@{}:{}/stockroom",
        host, host_port
    );
    println!("PostgreSQL available at: {}", connection_string);

    (container, connection_string)
}

async fn connect_store(connection_string: &str) -> PostgresItemStore {
    let pool = sqlx::PgPool::connect(connection_string)
        .await
        .expect("Failed to connect to PostgreSQL");
    let store = PostgresItemStore::new(pool);
    store.init_schema().await.expect("Failed to init schema");
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
async fn test_postgres_schema_and_identity() {
    let (_container, connection_string) = start_postgres().await;
    let store = connect_store(&connection_string).await;

    // Re-running schema init against a live table is harmless
    store.init_schema().await.expect("re-init failed");

    let first = store.create(&draft("Keyboard", 8950, 40)).await.unwrap();
    assert_eq!(first.id, FIRST_ITEM_ID);

    let second = store.create(&draft("Mouse", 2475, 120)).await.unwrap();
    assert_eq!(second.id, FIRST_ITEM_ID + 1);

    // A deleted id is never reissued
    assert!(store.delete(second.id).await.unwrap());
    let third = store.create(&draft("Monitor", 38900, 18)).await.unwrap();
    assert_eq!(third.id, FIRST_ITEM_ID + 2);
}

#[tokio::test]
async fn test_postgres_round_trip_preserves_fields() {
    let (_container, connection_string) = start_postgres().await;
    let store = connect_store(&connection_string).await;

    let mut wanted = draft("Webcam", 5975, 80);
    wanted.img_alt = Some("Full HD webcam".to_string());

    let created = store.create(&wanted).await.unwrap();
    let fetched = store.get(created.id).await.unwrap().expect("item missing");

    assert_eq!(fetched, created);
    assert_eq!(fetched.price, Decimal::new(5975, 2));
    assert_eq!(fetched.img_alt.as_deref(), Some("Full HD webcam"));

    assert!(store.get(created.id + 1000).await.unwrap().is_none());
}

#[tokio::test]
async fn test_postgres_paging_windows() {
    let (_container, connection_string) = start_postgres().await;
    let store = connect_store(&connection_string).await;

    assert_eq!(seed_demo_items(&store).await.unwrap(), 12);
    // Seeding twice never duplicates
    assert_eq!(seed_demo_items(&store).await.unwrap(), 0);
    assert_eq!(store.count().await.unwrap(), 12);

    let first = store.page(PageRequest::of(0, 7)).await.unwrap();
    assert_eq!(first.len(), 7);
    assert_eq!(first[0].id, FIRST_ITEM_ID);

    let second = store.page(PageRequest::of(1, 7)).await.unwrap();
    assert_eq!(second.len(), 5);
    assert_eq!(second[0].id, FIRST_ITEM_ID + 7);

    // Windows tile the listing in id order without gaps or overlap
    let ids: Vec<i64> = first.iter().chain(second.iter()).map(|r| r.id).collect();
    let expected: Vec<i64> = (FIRST_ITEM_ID..FIRST_ITEM_ID + 12).collect();
    assert_eq!(ids, expected);

    assert!(store.page(PageRequest::of(9, 7)).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_postgres_update_and_delete_contract() {
    let (_container, connection_string) = start_postgres().await;
    let store = connect_store(&connection_string).await;

    let mut record = store.create(&draft("Dock", 14925, 35)).await.unwrap();
    record.stock = 30;
    record.price = Decimal::new(13900, 2);

    assert!(store.update(&record).await.unwrap());
    assert_eq!(store.get(record.id).await.unwrap().unwrap(), record);

    // Update is replace, never upsert
    let mut phantom = record.clone();
    phantom.id = record.id + 1000;
    assert!(!store.update(&phantom).await.unwrap());
    assert!(store.get(phantom.id).await.unwrap().is_none());

    assert!(store.delete(record.id).await.unwrap());
    assert!(store.get(record.id).await.unwrap().is_none());
    assert!(!store.delete(record.id).await.unwrap());
}

#[tokio::test]
async fn test_postgres_deduct_stock_is_atomic() {
    let (_container, connection_string) = start_postgres().await;
    let store = Arc::new(connect_store(&connection_string).await);

    let item = store.create(&draft("SSD", 11950, 95)).await.unwrap();

    // Concurrent deductions race at the row, not in application code; a
    // read-modify-write implementation would lose updates here.
    let mut tasks = Vec::new();
    for _ in 0..20 {
        let store = store.clone();
        let id = item.id;
        tasks.push(tokio::spawn(async move {
            store.deduct_stock(id, 3).await.expect("deduct failed")
        }));
    }
    for task in tasks {
        assert!(task.await.unwrap().is_some());
    }

    let final_stock = store.get(item.id).await.unwrap().unwrap().stock;
    assert_eq!(final_stock, 95 - 20 * 3);
}

#[tokio::test]
async fn test_postgres_deduct_stock_edge_cases() {
    let (_container, connection_string) = start_postgres().await;
    let store = connect_store(&connection_string).await;

    let item = store.create(&draft("Desk Mat", 1925, 3)).await.unwrap();

    // No floor: overselling drives stock negative and reports it
    assert_eq!(store.deduct_stock(item.id, 10).await.unwrap(), Some(-7));
    assert_eq!(store.get(item.id).await.unwrap().unwrap().stock, -7);

    assert_eq!(store.deduct_stock(99999, 1).await.unwrap(), None);
}
