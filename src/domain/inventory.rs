use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::types::DocumentId;

pub const STOCK_IN: &str = "in_stock";
pub const STOCK_LOW: &str = "low_stock";
pub const STOCK_OUT: &str = "out_of_stock";

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct InventoryItem {
    #[serde(rename = "$id")]
    pub id: DocumentId,
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub unit: Option<String>,
    pub quantity: i64,
    #[serde(default)]
    pub min_quantity: i64,
    #[serde(default)]
    pub unit_price: f64,
    #[serde(default)]
    pub branch: Option<String>,
    /// Stock status used by the status tabs, derived on every write.
    #[serde(default)]
    pub status: String,
    #[serde(rename = "$createdAt")]
    pub created_at: NaiveDateTime,
    #[serde(rename = "$updatedAt")]
    pub updated_at: NaiveDateTime,
    #[serde(rename = "$version")]
    pub version: i32,
}

impl InventoryItem {
    pub fn stock_status(&self) -> &'static str {
        stock_status(self.quantity, self.min_quantity)
    }
}

/// Payload persisted when adding an item to the inventory.
#[derive(Clone, Debug, Default, Serialize, PartialEq)]
pub struct NewInventoryItem {
    pub code: String,
    pub name: String,
    pub category: Option<String>,
    pub unit: Option<String>,
    pub quantity: i64,
    pub min_quantity: i64,
    pub unit_price: f64,
    pub branch: Option<String>,
    /// Overwritten from the quantities when the item is saved.
    pub status: String,
}

/// Quantity change; `status` follows the new quantity.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct StockLevel {
    pub quantity: i64,
    pub status: String,
}

/// Stock status for the given quantity and reorder threshold.
pub fn stock_status(quantity: i64, min_quantity: i64) -> &'static str {
    if quantity <= 0 {
        STOCK_OUT
    } else if quantity <= min_quantity {
        STOCK_LOW
    } else {
        STOCK_IN
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stock_status_thresholds() {
        assert_eq!(stock_status(0, 5), STOCK_OUT);
        assert_eq!(stock_status(-1, 0), STOCK_OUT);
        assert_eq!(stock_status(5, 5), STOCK_LOW);
        assert_eq!(stock_status(6, 5), STOCK_IN);
    }
}
