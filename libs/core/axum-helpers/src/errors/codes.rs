//! Machine-readable error codes carried in every error response.
//!
//! Each code has three faces: a SCREAMING_SNAKE_CASE string clients branch
//! on, a numeric identifier for structured logs and dashboards, and a
//! fallback message for when the error site has nothing more specific to say.
//!
//! # Example
//!
//! ```rust
//! use axum_helpers::errors::ErrorCode;
//!
//! let code = ErrorCode::ValidationError;
//! assert_eq!(code.as_str(), "VALIDATION_ERROR");
//! assert_eq!(code.code(), 1001);
//! assert_eq!(code.default_message(), "Request validation failed");
//! ```

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Stable error identifiers shared by every API in the workspace.
///
/// Numeric ranges: 1000s for HTTP-level client and server errors, 2000s for
/// database errors, 4000s for I/O, 5000s for serialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Request validation failed
    ValidationError,
    /// Malformed UUID in a path or query parameter
    InvalidUuid,
    /// Request body could not be parsed as JSON
    JsonExtraction,
    /// Requested resource does not exist
    NotFound,
    /// Unexpected internal failure
    InternalError,
    /// Missing or unusable identity
    Unauthorized,
    /// Principal is not allowed to see or do this
    Forbidden,
    /// Request conflicts with current resource state
    Conflict,
    /// Payload parsed but is semantically unusable
    UnprocessableEntity,
    /// Temporarily unable to serve the request
    ServiceUnavailable,
    /// Upstream service returned an error
    BadGateway,
    /// Uniqueness constraint violated
    DatabaseDuplicateKey,
    /// Database query or write failed
    DatabaseError,
    /// Database unreachable or server selection timed out
    DatabaseUnavailable,
    /// File system I/O error
    IoError,
    /// JSON serialization or deserialization error
    SerdeJsonError,
}

impl ErrorCode {
    const fn entry(&self) -> (&'static str, i32, &'static str) {
        match self {
            Self::ValidationError => ("VALIDATION_ERROR", 1001, "Request validation failed"),
            Self::InvalidUuid => ("INVALID_UUID", 1002, "Invalid UUID format"),
            Self::JsonExtraction => ("JSON_EXTRACTION", 1003, "Failed to parse request body"),
            Self::NotFound => ("NOT_FOUND", 1004, "Resource not found"),
            Self::InternalError => (
                "INTERNAL_ERROR",
                1005,
                "An internal server error occurred",
            ),
            Self::Unauthorized => ("UNAUTHORIZED", 1006, "Authentication required"),
            Self::Forbidden => ("FORBIDDEN", 1007, "Access forbidden"),
            Self::Conflict => ("CONFLICT", 1008, "Resource already exists"),
            Self::UnprocessableEntity => (
                "UNPROCESSABLE_ENTITY",
                1009,
                "Request cannot be processed",
            ),
            Self::ServiceUnavailable => (
                "SERVICE_UNAVAILABLE",
                1011,
                "Service is temporarily unavailable",
            ),
            Self::BadGateway => ("BAD_GATEWAY", 1012, "Upstream service error"),
            Self::DatabaseDuplicateKey => (
                "DATABASE_DUPLICATE_KEY",
                2002,
                "Duplicate database record",
            ),
            Self::DatabaseError => ("DATABASE_ERROR", 2003, "Database error occurred"),
            Self::DatabaseUnavailable => ("DATABASE_UNAVAILABLE", 2004, "Database is unreachable"),
            Self::IoError => ("IO_ERROR", 4001, "I/O error occurred"),
            Self::SerdeJsonError => ("SERDE_JSON_ERROR", 5001, "JSON serialization error"),
        }
    }

    /// The identifier clients branch on.
    pub fn as_str(&self) -> &'static str {
        self.entry().0
    }

    /// The numeric identifier used in structured logs.
    pub fn code(&self) -> i32 {
        self.entry().1
    }

    /// Fallback message when the error site provides nothing more specific.
    pub fn default_message(&self) -> &'static str {
        self.entry().2
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
