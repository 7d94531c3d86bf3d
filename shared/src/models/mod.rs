//! Data models
//!
//! Catalog and billing entities shared between the server and dashboards.
//! All IDs are `i64`; timestamps are Unix milliseconds.

pub mod dining_table;
pub mod invoice;
pub mod product;

// Re-exports
pub use dining_table::*;
pub use invoice::*;
pub use product::*;
