//! Typed errors returned by the remote API.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Remote error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[non_exhaustive]
pub enum ApiErrorCode {
    /// The addressed resource does not exist.
    NotFound,
    /// The request was rejected as invalid.
    BadRequest,
    /// Credentials are missing or lack permission.
    Unauthorized,
    /// Another writer modified the resource concurrently.
    ConcurrentModification,
    /// The service is rate limiting.
    Throttled,
    /// The service could not be reached.
    Network,
    /// The service failed internally.
    Internal,
}

impl ApiErrorCode {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::NotFound => "NOT_FOUND",
            Self::BadRequest => "BAD_REQUEST",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::ConcurrentModification => "CONCURRENT_MODIFICATION",
            Self::Throttled => "THROTTLED",
            Self::Network => "NETWORK",
            Self::Internal => "INTERNAL",
        }
    }
}

impl fmt::Display for ApiErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An error reported by the remote API.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("[{code}] {message}")]
pub struct ApiError {
    pub code: ApiErrorCode,
    pub message: String,
}

impl ApiError {
    pub fn new(code: ApiErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn not_found(resource: impl fmt::Display) -> Self {
        Self::new(ApiErrorCode::NotFound, format!("{resource} not found"))
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(ApiErrorCode::BadRequest, message)
    }

    pub fn is_not_found(&self) -> bool {
        self.code == ApiErrorCode::NotFound
    }
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_wire_names() {
        assert_eq!(ApiErrorCode::ConcurrentModification.as_str(), "CONCURRENT_MODIFICATION");
        assert_eq!(
            serde_json::to_value(ApiErrorCode::NotFound).unwrap(),
            serde_json::json!("NOT_FOUND")
        );
        assert!(!ApiError::bad_request("bad template").is_not_found());
    }

    #[test]
    fn test_error_display() {
        let err = ApiError::not_found("resolver Query.getX");
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "[NOT_FOUND] resolver Query.getX not found");
    }
}
