//! Order lifecycle engine
//!
//! - **manager**: OrdersManager, command processing and event generation
//! - **actions**: one handler per command
//! - **storage**: redb persistence for catalog, orders, invoices and events
//! - **traits**: command context and handler trait
//! - **views**: kitchen, waiter and cashier read models
//!
//! # Architecture
//!
//! ```text
//! Command → OrdersManager → Action → Events → Storage (redb)
//!                 ↓                              ↓
//!        Channel versions (watch)        Committed atomically
//!                 ↓
//!        Long-poll waiters / Broadcast subscribers
//! ```
//!
//! # Data Flow
//!
//! 1. Client sends an OrderCommand over HTTP
//! 2. OrdersManager validates and executes it in one redb transaction
//! 3. Events get global sequence numbers, affected channels get new versions
//! 4. After commit, channel versions are published and events broadcast
//! 5. CommandResponse is returned to the client

pub mod actions;
pub mod manager;
pub mod storage;
pub mod traits;
pub mod views;

// Re-exports
pub use manager::{EngineRules, EngineStats, ManagerError, ManagerResult, OrdersManager};
pub use storage::{OrderStorage, StorageError};
pub use traits::OrderError;

// Re-export shared types for convenience
pub use shared::order::{
    CommandError, CommandErrorCode, CommandResponse, EventPayload, OrderCommand,
    OrderCommandPayload, OrderEvent, OrderEventType, OrderStatus,
};
