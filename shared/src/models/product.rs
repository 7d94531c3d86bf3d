//! Product Model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

fn default_true() -> bool {
    true
}

/// Product entity (菜品)
///
/// `stock` is the on-hand quantity. It only changes through the inventory
/// ledger and never goes below zero.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub price: Decimal,
    pub stock: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default = "default_true")]
    pub is_available: bool,
    #[serde(default)]
    pub updated_at: i64,
}

impl Product {
    /// Whether the product may be put on an order
    pub fn is_orderable(&self) -> bool {
        self.is_active && self.is_available
    }
}

/// Stock level as shown to waiter dashboards
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StockLevel {
    pub product_id: i64,
    pub name: String,
    pub stock: u32,
    pub price: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl From<&Product> for StockLevel {
    fn from(p: &Product) -> Self {
        Self {
            product_id: p.id,
            name: p.name.clone(),
            stock: p.stock,
            price: p.price,
            category: p.category.clone(),
        }
    }
}
