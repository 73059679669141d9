//! Order-completion handling.
//!
//! Consumes order-completed notices from the bus, removes the ordered count
//! from stock, and publishes exactly one outcome notice per order: an
//! inventory update when the item exists, an invalid-order report when it
//! does not. Any other notice kind is logged and dropped.

use std::sync::Arc;

use futures::future::BoxFuture;
use tokio::sync::broadcast;
use tracing::{info, warn};

use crate::bus::{BusError, NoticeBus, NoticeHandler};
use crate::messages::Notice;
use crate::service::InventoryService;

/// In-process record of a processed order, for observers inside this service.
///
/// Mirrors the outcome notice that went out on the bus. Emitted after the
/// outcome was published, so a received event means the order is fully
/// processed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InventoryEvent {
    /// Stock was deducted for a known item.
    Updated {
        item_id: i64,
        current_stock_units: i64,
    },
    /// A completed order referenced an unknown item.
    InvalidItem { item_id: i64 },
}

/// Notice handler driving stock deduction from completed orders.
///
/// The deduction is a single atomic statement in the store, so concurrent
/// orders for one item never lose updates. The outcome is published once,
/// without retry; a failed publish surfaces as a handler error and the
/// deduction stands.
pub struct OrderCompletionHandler {
    service: InventoryService,
    publisher: Arc<dyn NoticeBus>,
    events: broadcast::Sender<InventoryEvent>,
}

impl OrderCompletionHandler {
    pub fn new(
        service: InventoryService,
        publisher: Arc<dyn NoticeBus>,
        events: broadcast::Sender<InventoryEvent>,
    ) -> Self {
        Self {
            service,
            publisher,
            events,
        }
    }
}

impl NoticeHandler for OrderCompletionHandler {
    fn handle(&self, notice: Notice) -> BoxFuture<'static, Result<(), BusError>> {
        let service = self.service.clone();
        let publisher = self.publisher.clone();
        let events = self.events.clone();

        Box::pin(async move {
            let (item_id, count) = match notice {
                Notice::OrderCompleted { item_id, count } => (item_id, count),
                other => {
                    // Not for us; consumed topics may carry other kinds
                    info!(kind = other.kind(), "Received unknown notice, ignoring");
                    return Ok(());
                }
            };

            info!(item_id, count, "Order completed, deducting stock");

            let (outcome, event) = match service.deduct_stock(item_id, count).await {
                Ok(Some(current_stock_units)) => {
                    info!(item_id, current_stock_units, "Stock updated");
                    (
                        Notice::InventoryUpdated {
                            item_id,
                            current_stock_units,
                        },
                        InventoryEvent::Updated {
                            item_id,
                            current_stock_units,
                        },
                    )
                }
                Ok(None) => {
                    warn!(item_id, "Invalid item id received");
                    (
                        Notice::InvalidOrder { item_id },
                        InventoryEvent::InvalidItem { item_id },
                    )
                }
                Err(e) => {
                    return Err(BusError::Handler(format!(
                        "Stock deduction failed for item {}: {}",
                        item_id, e
                    )));
                }
            };

            publisher.publish(&outcome).await?;

            // In-process observers are optional; no receiver is fine
            let _ = events.send(event);

            Ok(())
        })
    }
}
