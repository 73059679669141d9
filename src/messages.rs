//! Wire messages exchanged over the notice bus.
//!
//! Every notice shares one JSON envelope discriminated by a `kind` tag, so
//! consumers dispatch on the tag instead of sniffing payload fields. Field
//! names are camelCase on the wire.

use serde::{Deserialize, Serialize};

/// A notice on the bus, discriminated by the `kind` field.
///
/// `OrderCompleted` arrives on the orders topic; the two outcome variants
/// are published to the inventory topic, exactly one per order processed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Notice {
    /// An order was completed downstream; remove `count` units from stock.
    #[serde(rename_all = "camelCase")]
    OrderCompleted { item_id: i64, count: i64 },
    /// Stock for an item changed in response to a completed order.
    #[serde(rename_all = "camelCase")]
    InventoryUpdated {
        item_id: i64,
        current_stock_units: i64,
    },
    /// A completed order referenced an item that does not exist.
    #[serde(rename_all = "camelCase")]
    InvalidOrder { item_id: i64 },
}

impl Notice {
    /// The `kind` discriminator as it appears on the wire.
    pub fn kind(&self) -> &'static str {
        match self {
            Notice::OrderCompleted { .. } => "orderCompleted",
            Notice::InventoryUpdated { .. } => "inventoryUpdated",
            Notice::InvalidOrder { .. } => "invalidOrder",
        }
    }

    /// The item this notice concerns.
    ///
    /// Used as the message key so notices for one item stay ordered.
    pub fn item_id(&self) -> i64 {
        match self {
            Notice::OrderCompleted { item_id, .. }
            | Notice::InventoryUpdated { item_id, .. }
            | Notice::InvalidOrder { item_id } => *item_id,
        }
    }
}
