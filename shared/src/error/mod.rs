//! Unified error system
//!
//! [`ErrorCode`] values are grouped by [`FailureKind`], the same failure
//! classes the order engine rejects commands with. The class decides the HTTP
//! status; [`AppError`] renders as an [`ApiResponse`] envelope.
//!
//! ```
//! use shared::error::{AppError, ErrorCode, FailureKind};
//!
//! let err = AppError::new(ErrorCode::ProductOutOfStock)
//!     .with_detail("product_id", 2);
//! assert_eq!(err.kind(), FailureKind::Resource);
//! assert_eq!(err.http_status().as_u16(), 409);
//! ```

mod codes;
mod http;
mod kind;
mod types;

pub use codes::{ErrorCode, InvalidErrorCode, SUCCESS_CODE};
pub use kind::FailureKind;
pub use types::{ApiResponse, AppError, AppResult};
