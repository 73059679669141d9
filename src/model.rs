//! API model types for inventory items.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// An inventory item as exposed over the REST API.
///
/// `id` is assigned by the item store; values supplied by clients on create
/// are ignored. Prices are decimal to the cent, serialized as JSON numbers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InventoryItem {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub stock: i64,
    pub img: String,
    pub img_alt: Option<String>,
}

/// A request-body constraint violation.
///
/// Displays as `"field" message`, e.g. `"name" must not be blank`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("\"{field}\" {message}")]
pub struct FieldViolation {
    pub field: &'static str,
    pub message: &'static str,
}

impl InventoryItem {
    /// Validate the fields a client must supply when creating an item.
    ///
    /// Returns the first violation found; name is checked before price.
    pub fn validate(&self) -> Result<(), FieldViolation> {
        if self.name.trim().is_empty() {
            return Err(FieldViolation {
                field: "name",
                message: "must not be blank",
            });
        }
        if self.price <= Decimal::ZERO {
            return Err(FieldViolation {
                field: "price",
                message: "must be greater than 0",
            });
        }
        Ok(())
    }
}
