//! Shared types for the Comanda engine
//!
//! Domain models, order commands/events, dashboard views, poll types and the
//! unified error system used by the server and its clients.

pub mod error;
pub mod models;
pub mod order;
pub mod sync;
pub mod util;

// Re-exports
pub use http;
pub use serde::{Deserialize, Serialize};

pub use error::{ApiResponse, AppError, AppResult, ErrorCode, FailureKind};
pub use sync::{PollResult, SyncChannel};
