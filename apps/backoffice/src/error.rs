//! # API Error Type
//!
//! Unified error type for back-office commands.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in the Back-office                        │
//! │                                                                         │
//! │  UI host                     Rust Backend                               │
//! │  ───────                     ────────────                               │
//! │                                                                         │
//! │  dispatch(ChangeQuantity)                                               │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  Command Function                                                │  │
//! │  │  Result<T, ApiError>                                             │  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Editor rejects? ──── CoreError::ExceedsStock ─────┐            │  │
//! │  │         │                                          │            │  │
//! │  │         ▼                                          ▼            │  │
//! │  │  Backend rejects? ─── ClientError::Validation ─── ApiError ────►│  │
//! │  │         │                                          ▲            │  │
//! │  │         ▼                                          │            │  │
//! │  │  Local store fails? ─ DbError::QueryFailed ────────┘            │  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Success ──────────────────────────────────────────────────────►│  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │  { "code": "INSUFFICIENT_STOCK",                                        │
//! │    "message": "Trứng gà (lô L01) chỉ còn 50 quả trong kho, ..." }       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Messages are Vietnamese and shown as-is. Backend messages pass through
//! verbatim; internal failures are logged and replaced by a generic text.

use serde::Serialize;

use kho_client::error::GENERIC_ERROR_MESSAGE;
use kho_client::ClientError;
use kho_core::{CoreError, FormField};
use kho_db::DbError;

use crate::config::ConfigError;

/// Error returned from commands.
///
/// ## Serialization
/// ```json
/// {
///   "code": "VALIDATION_ERROR",
///   "message": "Vui lòng chọn khách hàng",
///   "field": "customer"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,

    /// Form field to highlight
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<FormField>,
}

/// Error codes for command responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Resource not found (404)
    NotFound,

    /// Input validation failed (400)
    ValidationError,

    /// Quantity above the batch's stock
    InsufficientStock,

    /// Action not allowed in the editor's current step
    InvalidTransition,

    /// Business rule refused the operation (422)
    BusinessLogic,

    /// Session rejected (401/403)
    Unauthorized,

    /// Backend unreachable
    Network,

    /// Backend failed (5xx or malformed body)
    Backend,

    /// Local store failed
    DatabaseError,

    /// Configuration could not be loaded
    ConfigError,

    /// Internal error
    Internal,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
            field: None,
        }
    }

    pub fn with_field(mut self, field: Option<FormField>) -> Self {
        self.field = field;
        self
    }

    /// Creates a not found error.
    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::new(
            ErrorCode::NotFound,
            format!("Không tìm thấy {}: {}", resource, id),
        )
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }
}

/// Converts local store errors to API errors.
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => ApiError::not_found(&entity, &id),
            DbError::InvalidValue { key, message } => {
                tracing::warn!(%key, %message, "Stored value is unreadable");
                ApiError::new(ErrorCode::DatabaseError, GENERIC_ERROR_MESSAGE)
            }
            DbError::PoolExhausted => {
                ApiError::new(ErrorCode::DatabaseError, "Bộ nhớ cục bộ đang bận, vui lòng thử lại")
            }
            other => {
                // Log the actual error but return a generic message
                tracing::error!(error = %other, "Local store operation failed");
                ApiError::new(ErrorCode::DatabaseError, GENERIC_ERROR_MESSAGE)
            }
        }
    }
}

/// Converts editor and validation errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        let code = match &err {
            CoreError::ExceedsStock { .. } | CoreError::PackUnavailable { .. } => {
                ErrorCode::InsufficientStock
            }
            CoreError::LineNotFound(_) => ErrorCode::NotFound,
            CoreError::MissingBatch { .. }
            | CoreError::UnknownReference { .. }
            | CoreError::Validation(_) => {
                ErrorCode::ValidationError
            }
            CoreError::InvalidTransition { .. } => ErrorCode::InvalidTransition,
            CoreError::NotEditable { .. } => ErrorCode::BusinessLogic,
        };
        ApiError::new(code, err.to_string()).with_field(err.highlight())
    }
}

/// Converts backend errors to API errors; the message is the banner text.
impl From<ClientError> for ApiError {
    fn from(err: ClientError) -> Self {
        let code = match &err {
            ClientError::Http(_) => ErrorCode::Network,
            ClientError::Unauthorized | ClientError::Forbidden(_) => ErrorCode::Unauthorized,
            ClientError::NotFound(_) => ErrorCode::NotFound,
            ClientError::Validation(_) => ErrorCode::ValidationError,
            ClientError::Server { .. }
            | ClientError::InvalidResponse(_)
            | ClientError::Serialization(_) => ErrorCode::Backend,
        };
        ApiError::new(code, err.user_message())
    }
}

impl From<ConfigError> for ApiError {
    fn from(err: ConfigError) -> Self {
        ApiError::new(ErrorCode::ConfigError, err.to_string())
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

/// Result type for commands.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use kho_core::ValidationError;

    #[test]
    fn test_required_field_is_highlighted() {
        let err: ApiError = CoreError::from(ValidationError::required(FormField::Customer)).into();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(err.field, Some(FormField::Customer));

        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["code"], "VALIDATION_ERROR");
        assert_eq!(json["field"], "customer");
    }

    #[test]
    fn test_backend_message_passes_through() {
        let err: ApiError = ClientError::Validation("Mã phiếu đã tồn tại".to_string()).into();
        assert_eq!(err.message, "Mã phiếu đã tồn tại");
        assert_eq!(err.field, None);
    }

    #[test]
    fn test_db_details_are_hidden() {
        let err: ApiError = DbError::QueryFailed("disk I/O error".to_string()).into();
        assert_eq!(err.code, ErrorCode::DatabaseError);
        assert_eq!(err.message, GENERIC_ERROR_MESSAGE);
    }
}
