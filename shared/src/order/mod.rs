//! Order Module
//!
//! This module provides types for the order lifecycle:
//! - Commands: Requests from clients to modify orders and invoices
//! - Events: Immutable facts recorded after command processing
//! - Records: The persisted order aggregate (order + line items)
//! - Views: Read models for kitchen, waiter and cashier dashboards

pub mod command;
pub mod event;
pub mod record;
pub mod types;
pub mod view;

// Re-exports
pub use command::{OrderCommand, OrderCommandPayload};
pub use event::{EventPayload, OrderEvent, OrderEventType};
pub use record::{LineItem, Order};
pub use types::*;
pub use view::*;
