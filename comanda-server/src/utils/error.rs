//! 统一错误处理
//!
//! Re-exports the shared error system and maps engine errors onto it:
//! - [`AppError`] - 应用错误 (code + message + details)
//! - [`ApiResponse`] - API 响应结构
//!
//! | 来源 | HTTP |
//! |------|------|
//! | 校验失败 / 未找到 | 400 / 404 |
//! | 状态冲突 / 资源不足 | 409 |
//! | 防重冷却 | 429 (`retry_after_ms`) |
//! | 存储 / 内部错误 | 500 / 503 |

pub use shared::error::{ApiResponse, AppError, AppResult, ErrorCode, FailureKind};

use crate::guard::GuardError;
use crate::orders::ManagerError;
use shared::order::CommandError;

/// 成功响应
pub fn ok<T>(data: T) -> AppResult<ApiResponse<T>> {
    Ok(ApiResponse::success(data))
}

/// 带消息的成功响应
pub fn ok_with_message<T>(message: impl Into<String>, data: T) -> AppResult<ApiResponse<T>> {
    Ok(ApiResponse::success_with_message(message, data))
}

/// Rejected command → unified error, keeping the command code and failure class
pub fn command_error(err: CommandError) -> AppError {
    AppError::with_message(err.code.error_code(), err.message)
        .with_detail("command_code", format!("{:?}", err.code))
        .with_detail("kind", format!("{:?}", err.code.kind()))
}

impl From<GuardError> for AppError {
    fn from(err: GuardError) -> Self {
        match err {
            GuardError::TooSoon { retry_after } => {
                AppError::too_many_requests(retry_after.as_millis() as u64)
            }
        }
    }
}

impl From<ManagerError> for AppError {
    fn from(err: ManagerError) -> Self {
        command_error(err.into())
    }
}
