//! Dining Table Model

use serde::{Deserialize, Serialize};

/// Table number reserved for delivery orders (domicilio)
pub const DELIVERY_TABLE_NUMBER: u32 = 0;
/// Table number reserved for to-go orders
pub const TAKEAWAY_TABLE_NUMBER: u32 = 50;

/// Table occupancy state
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TableStatus {
    #[default]
    Free,
    Occupied,
}

/// Dining table entity (桌台)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DiningTable {
    pub id: i64,
    pub number: u32,
    #[serde(default)]
    pub capacity: u32,
    #[serde(default)]
    pub status: TableStatus,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}

impl DiningTable {
    /// Whether `number` is one of the synthetic delivery / to-go slots
    pub fn is_virtual_number(number: u32) -> bool {
        number == DELIVERY_TABLE_NUMBER || number == TAKEAWAY_TABLE_NUMBER
    }

    /// Virtual tables are never marked occupied
    pub fn is_virtual(&self) -> bool {
        Self::is_virtual_number(self.number)
    }

    pub fn is_free(&self) -> bool {
        self.status == TableStatus::Free
    }

    /// Label used by dashboards
    pub fn label(&self) -> String {
        Self::label_for(self.number)
    }

    pub fn label_for(number: u32) -> String {
        match number {
            DELIVERY_TABLE_NUMBER => "Delivery".to_string(),
            TAKEAWAY_TABLE_NUMBER => "To-go".to_string(),
            n => format!("Table {}", n),
        }
    }
}
