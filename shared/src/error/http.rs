//! HTTP status per failure class

use super::codes::ErrorCode;
use super::kind::FailureKind;
use http::StatusCode;

impl FailureKind {
    pub fn http_status(&self) -> StatusCode {
        match self {
            Self::Validation => StatusCode::BAD_REQUEST,
            Self::StateConflict | Self::Resource => StatusCode::CONFLICT,
            Self::TransientGuard => StatusCode::TOO_MANY_REQUESTS,
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl ErrorCode {
    /// Class status, narrowed for unknown ids (404) and busy storage (503)
    pub fn http_status(&self) -> StatusCode {
        match self {
            code if code.is_not_found() => StatusCode::NOT_FOUND,
            Self::SystemBusy => StatusCode::SERVICE_UNAVAILABLE,
            code => code.kind().http_status(),
        }
    }
}
