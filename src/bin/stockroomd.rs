//! stockroomd: Inventory microservice
//!
//! Serves the paginated item catalog over REST and keeps stock in sync with
//! completed orders arriving over the notice bus. Every consumed order yields
//! exactly one outcome notice on the inventory topic.
//!
//! ## Architecture
//! ```text
//! [REST API :8080] -> [InventoryService] -> [SQLite/Postgres]
//!                             ^
//!                             |
//! [orders topic] -> [OrderCompletionHandler] -> [inventory topic]
//! ```
//!
//! ## Configuration
//! Optional YAML config file as the first argument (default: config.yaml),
//! overridable via STOCKROOM__ environment variables:
//! - STOCKROOM__HTTP__PORT: REST port (default: 8080)
//! - STOCKROOM__HTTP__ORDER_ENDPOINT: expose the dev order simulator (default: false)
//! - STOCKROOM__STORAGE__TYPE: "sqlite" or "postgres" (default: sqlite)
//! - STOCKROOM__MESSAGING__TYPE: "channel" or "kafka" (default: channel)
//! - STOCKROOM__MESSAGING__KAFKA__BOOTSTRAP_SERVERS: broker list

use tokio::sync::broadcast;
use tracing::{error, info};

use stockroom::bus::init_notice_bus;
use stockroom::config::Config;
use stockroom::orders::{InventoryEvent, OrderCompletionHandler};
use stockroom::rest::{self, AppState};
use stockroom::service::InventoryService;
use stockroom::store::seed::seed_demo_items;
use stockroom::store::{init_item_store, StorageType};
use stockroom::utils::bootstrap::{connect_with_retry, init_tracing, parse_config_path};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    init_tracing();

    let config_path = parse_config_path();
    let config = Config::load(config_path.as_deref()).map_err(|e| {
        error!("Failed to load configuration: {}", e);
        e
    })?;

    info!(
        storage = %config.storage.storage_type,
        messaging = ?config.messaging.messaging_type,
        "Starting stockroomd"
    );

    // Storage and seeding come first; nothing serves until the catalog is ready
    let address = match config.storage.storage_type {
        StorageType::Sqlite => config.storage.path.clone(),
        StorageType::Postgres => config.storage.uri.clone(),
    };
    let store = connect_with_retry("item store", &address, || init_item_store(&config.storage))
        .await?;

    if config.storage.seed {
        let seeded = seed_demo_items(store.as_ref()).await?;
        if seeded > 0 {
            info!(items = seeded, "Seeded demo catalog");
        }
    }

    let service = InventoryService::new(store);

    // Bus next: the consumer must be draining orders before HTTP traffic lands
    let bus = init_notice_bus(&config.messaging).await?;

    let (events, _) = broadcast::channel::<InventoryEvent>(16);
    let handler = OrderCompletionHandler::new(service.clone(), bus.clone(), events);

    bus.subscribe(Box::new(handler)).await?;
    bus.start_consuming().await?;

    let state = AppState {
        service,
        publisher: bus,
    };

    rest::serve(state, &config.http).await?;

    Ok(())
}
