//! Wire error codes
//!
//! Codes are grouped by failure class (see [`FailureKind`](super::FailureKind)):
//! - 1xxx: validation (bad input, unknown ids)
//! - 2xxx: state conflicts
//! - 3xxx: exhausted resources
//! - 4xxx: transient guards
//! - 9xxx: internal / storage
//!
//! `0` is reserved for success on the wire and is not an [`ErrorCode`].

use serde::{Deserialize, Serialize};
use std::fmt;

/// Wire code carried in success responses
pub const SUCCESS_CODE: u16 = 0;

/// Error code, serialized as its u16 value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 1xxx: Validation ====================
    ValidationFailed = 1000,
    OrderNotFound = 1001,
    OrderItemNotFound = 1002,
    InvoiceNotFound = 1003,
    ProductNotFound = 1004,
    TableNotFound = 1005,
    /// Any other missing resource (REST lookups)
    NotFound = 1006,
    ProductUnavailable = 1007,
    PaymentInvalidAmount = 1008,

    // ==================== 2xxx: State conflict ====================
    OrderNotActive = 2001,
    OrderNotReady = 2002,
    OrderClosed = 2003,
    OrderItemsPending = 2004,
    OrderAlreadyReady = 2005,
    ItemAlreadyReady = 2006,
    ItemAtMinimum = 2007,
    ItemNotPending = 2008,
    InvoiceExists = 2009,
    InvoiceAlreadyPaid = 2010,
    InvoiceRefunded = 2011,
    InvoiceNotPaid = 2012,
    RefundExceedsTotal = 2013,

    // ==================== 3xxx: Resource ====================
    ProductOutOfStock = 3001,
    TableOccupied = 3002,

    // ==================== 4xxx: Transient guard ====================
    /// Repeated submission inside the cooldown window
    TooManyRequests = 4001,

    // ==================== 9xxx: Internal ====================
    InternalError = 9001,
    /// Disk space insufficient
    StorageFull = 9002,
    /// Data file damaged
    StorageCorrupted = 9003,
    /// IO error, retry later
    SystemBusy = 9004,
}

impl ErrorCode {
    pub const ALL: [ErrorCode; 29] = [
        Self::ValidationFailed,
        Self::OrderNotFound,
        Self::OrderItemNotFound,
        Self::InvoiceNotFound,
        Self::ProductNotFound,
        Self::TableNotFound,
        Self::NotFound,
        Self::ProductUnavailable,
        Self::PaymentInvalidAmount,
        Self::OrderNotActive,
        Self::OrderNotReady,
        Self::OrderClosed,
        Self::OrderItemsPending,
        Self::OrderAlreadyReady,
        Self::ItemAlreadyReady,
        Self::ItemAtMinimum,
        Self::ItemNotPending,
        Self::InvoiceExists,
        Self::InvoiceAlreadyPaid,
        Self::InvoiceRefunded,
        Self::InvoiceNotPaid,
        Self::RefundExceedsTotal,
        Self::ProductOutOfStock,
        Self::TableOccupied,
        Self::TooManyRequests,
        Self::InternalError,
        Self::StorageFull,
        Self::StorageCorrupted,
        Self::SystemBusy,
    ];

    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Unknown-id codes, answered with 404 on the REST surface
    pub const fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::OrderNotFound
                | Self::OrderItemNotFound
                | Self::InvoiceNotFound
                | Self::ProductNotFound
                | Self::TableNotFound
                | Self::NotFound
        )
    }

    /// Default English message, used when the caller gives none
    pub const fn message(&self) -> &'static str {
        match self {
            Self::ValidationFailed => "Validation failed",
            Self::OrderNotFound => "Order not found",
            Self::OrderItemNotFound => "Order item not found",
            Self::InvoiceNotFound => "Invoice not found",
            Self::ProductNotFound => "Product not found",
            Self::TableNotFound => "Table not found",
            Self::NotFound => "Resource not found",
            Self::ProductUnavailable => "Product is not available",
            Self::PaymentInvalidAmount => "Invalid payment amount",

            Self::OrderNotActive => "Order is not active",
            Self::OrderNotReady => "Order is not ready",
            Self::OrderClosed => "Order is closed for modification",
            Self::OrderItemsPending => "Order still has pending items",
            Self::OrderAlreadyReady => "Order is already ready",
            Self::ItemAlreadyReady => "Item is already ready",
            Self::ItemAtMinimum => "Item is at its minimum quantity",
            Self::ItemNotPending => "Item is not pending",
            Self::InvoiceExists => "Order already has an invoice",
            Self::InvoiceAlreadyPaid => "Invoice has already been paid",
            Self::InvoiceRefunded => "Invoice has been refunded",
            Self::InvoiceNotPaid => "Invoice has not been paid",
            Self::RefundExceedsTotal => "Refund amount exceeds invoice total",

            Self::ProductOutOfStock => "Insufficient stock",
            Self::TableOccupied => "Table is occupied",

            Self::TooManyRequests => "Request repeated too soon, please wait",

            Self::InternalError => "Internal server error",
            Self::StorageFull => "Storage full (disk space insufficient)",
            Self::StorageCorrupted => "Storage corrupted (data file damaged)",
            Self::SystemBusy => "System busy, please retry later",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error when converting from an unassigned u16 to ErrorCode
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("invalid error code: {0}")]
pub struct InvalidErrorCode(pub u16);

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        Self::ALL
            .into_iter()
            .find(|code| code.code() == value)
            .ok_or(InvalidErrorCode(value))
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_unique_and_round_trip() {
        let mut seen = std::collections::HashSet::new();
        for code in ErrorCode::ALL {
            assert!(seen.insert(code.code()), "duplicate {}", code);
            assert_eq!(ErrorCode::try_from(code.code()), Ok(code));
        }
    }

    #[test]
    fn test_success_code_is_not_an_error() {
        assert_eq!(ErrorCode::try_from(SUCCESS_CODE), Err(InvalidErrorCode(0)));
        assert_eq!(ErrorCode::try_from(2999), Err(InvalidErrorCode(2999)));
    }

    #[test]
    fn test_not_found_subset() {
        assert!(ErrorCode::InvoiceNotFound.is_not_found());
        assert!(ErrorCode::NotFound.is_not_found());
        assert!(!ErrorCode::ProductUnavailable.is_not_found());
        assert!(!ErrorCode::ValidationFailed.is_not_found());
    }

    #[test]
    fn test_serialize_as_number() {
        let json = serde_json::to_string(&ErrorCode::ItemAlreadyReady).unwrap();
        assert_eq!(json, "2006");
        let code: ErrorCode = serde_json::from_str("2012").unwrap();
        assert_eq!(code, ErrorCode::InvoiceNotPaid);
        assert!(serde_json::from_str::<ErrorCode>("7003").is_err());
    }
}
