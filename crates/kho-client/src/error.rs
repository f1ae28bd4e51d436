//! Client error types

use thiserror::Error;

/// Banner text when the backend gives no usable message.
pub const GENERIC_ERROR_MESSAGE: &str = "Đã xảy ra lỗi, vui lòng thử lại";

/// Banner text when the backend cannot be reached.
pub const NETWORK_ERROR_MESSAGE: &str = "Không thể kết nối tới máy chủ, vui lòng thử lại";

/// Banner text when the session is rejected.
pub const UNAUTHORIZED_MESSAGE: &str = "Phiên đăng nhập đã hết hạn, vui lòng đăng nhập lại";

/// Client error type
///
/// String payloads hold the backend's `message` field, or are empty when
/// the body carried none.
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body had an unexpected shape
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Authentication required
    #[error("Authentication required")]
    Unauthorized,

    /// Permission denied
    #[error("Permission denied: {0}")]
    Forbidden(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Backend rejected the input (400/409/422)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Any other non-success status
    #[error("Server error {status}: {message}")]
    Server { status: u16, message: String },

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ClientError {
    /// The backend's own message, when it sent one.
    pub fn backend_message(&self) -> Option<&str> {
        let message = match self {
            ClientError::Forbidden(m)
            | ClientError::NotFound(m)
            | ClientError::Validation(m)
            | ClientError::Server { message: m, .. } => m.as_str(),
            _ => return None,
        };
        let message = message.trim();
        (!message.is_empty()).then_some(message)
    }

    /// Text for the error banner: backend message verbatim, else a fallback.
    pub fn user_message(&self) -> String {
        if let Some(message) = self.backend_message() {
            return message.to_string();
        }
        match self {
            ClientError::Http(_) => NETWORK_ERROR_MESSAGE,
            ClientError::Unauthorized => UNAUTHORIZED_MESSAGE,
            _ => GENERIC_ERROR_MESSAGE,
        }
        .to_string()
    }
}

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;
