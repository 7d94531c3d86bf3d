//! Failure classes
//!
//! Every [`ErrorCode`] belongs to exactly one class, encoded in its thousands
//! digit. Clients branch on the class; the code narrows down the cause.

use super::codes::ErrorCode;
use serde::{Deserialize, Serialize};

/// Failure class of a rejected request or command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FailureKind {
    /// Malformed input or unknown id, rejected before any mutation (1xxx)
    Validation,
    /// Illegal transition for the current state (2xxx)
    StateConflict,
    /// Insufficient stock or table unavailable (3xxx)
    Resource,
    /// De-duplication cooldown, retry later (4xxx)
    TransientGuard,
    /// Storage or other system failure (9xxx)
    Internal,
}

impl FailureKind {
    /// Class of a wire code, `None` for the success code and unassigned ranges
    pub fn from_code(code: u16) -> Option<Self> {
        match code / 1000 {
            1 => Some(Self::Validation),
            2 => Some(Self::StateConflict),
            3 => Some(Self::Resource),
            4 => Some(Self::TransientGuard),
            9 => Some(Self::Internal),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::StateConflict => "state_conflict",
            Self::Resource => "resource",
            Self::TransientGuard => "transient_guard",
            Self::Internal => "internal",
        }
    }

    /// Whether resubmitting the same request later may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::TransientGuard)
    }
}

impl ErrorCode {
    pub fn kind(&self) -> FailureKind {
        FailureKind::from_code(self.code()).unwrap_or(FailureKind::Internal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_from_code() {
        assert_eq!(FailureKind::from_code(0), None);
        assert_eq!(FailureKind::from_code(1003), Some(FailureKind::Validation));
        assert_eq!(FailureKind::from_code(2010), Some(FailureKind::StateConflict));
        assert_eq!(FailureKind::from_code(3001), Some(FailureKind::Resource));
        assert_eq!(FailureKind::from_code(4001), Some(FailureKind::TransientGuard));
        assert_eq!(FailureKind::from_code(9004), Some(FailureKind::Internal));
        assert_eq!(FailureKind::from_code(7001), None);
    }

    #[test]
    fn test_every_code_agrees_with_its_range() {
        for code in ErrorCode::ALL {
            assert_eq!(FailureKind::from_code(code.code()), Some(code.kind()), "{:?}", code);
        }
    }

    #[test]
    fn test_only_guard_is_retryable() {
        assert!(ErrorCode::TooManyRequests.kind().is_retryable());
        assert!(!ErrorCode::ProductOutOfStock.kind().is_retryable());
        assert!(!ErrorCode::SystemBusy.kind().is_retryable());
        assert_eq!(ErrorCode::RefundExceedsTotal.kind().name(), "state_conflict");
    }
}
