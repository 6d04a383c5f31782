pub mod codes;
pub mod handlers;
pub mod responses;

pub use codes::ErrorCode;

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use mongodb::error::{ErrorKind, WriteFailure};
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;
use uuid::Error as UuidError;
use validator::ValidationErrors;

/// The wire shape of every error this workspace returns.
///
/// # JSON Example
///
/// ```json
/// {
///   "code": 1008,
///   "error": "CONFLICT",
///   "message": "Resource already exists",
///   "details": null
/// }
/// ```
#[derive(Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Numeric identifier for logs and monitoring
    pub code: i32,
    /// Machine-readable identifier clients branch on
    pub error: String,
    /// Human-readable description
    pub message: String,
    /// Structured extras, e.g. per-field validation failures
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// Transport-level error every domain error funnels into.
///
/// Domain crates define their own `thiserror` enums and implement
/// `From<DomainError> for AppError`; handlers then return `Result<_, DomainError>`
/// and the conversion picks the status and code here.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppError {
    #[error("JSON parsing error: {0}")]
    SerdeJson(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    Database(#[from] mongodb::error::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON extraction error: {0}")]
    JsonExtractorRejection(#[from] JsonRejection),

    #[error("Validation error: {0}")]
    ValidationError(#[from] ValidationErrors),

    #[error("UUID error: {0}")]
    UuidError(#[from] UuidError),

    #[error("Bad Request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not Found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unprocessable Entity: {0}")]
    UnprocessableEntity(String),

    #[error("Bad Gateway: {0}")]
    BadGateway(String),

    #[error("Internal Server Error: {0}")]
    InternalServerError(String),

    #[error("Service Unavailable: {0}")]
    ServiceUnavailable(String),
}

type ResponseParts = (StatusCode, ErrorCode, String, Option<serde_json::Value>);

impl AppError {
    fn into_parts(self) -> ResponseParts {
        use ErrorCode as C;
        use StatusCode as S;

        match self {
            Self::SerdeJson(e) => {
                tracing::error!("JSON parsing error: {:?}", e);
                default_parts(S::INTERNAL_SERVER_ERROR, C::SerdeJsonError)
            }
            Self::Database(e) => map_mongo_error(&e),
            Self::Io(e) => {
                tracing::error!("I/O error: {:?}", e);
                default_parts(S::INTERNAL_SERVER_ERROR, C::IoError)
            }
            Self::JsonExtractorRejection(e) => {
                // The rejection already knows whether the body was missing,
                // malformed, or mismatched; reuse its status and text.
                (e.status(), C::JsonExtraction, e.body_text(), None)
            }
            Self::ValidationError(e) => {
                let details = serde_json::to_value(&e).ok();
                (
                    S::BAD_REQUEST,
                    C::ValidationError,
                    C::ValidationError.default_message().to_string(),
                    details,
                )
            }
            Self::UuidError(_) => default_parts(S::BAD_REQUEST, C::InvalidUuid),
            Self::BadRequest(msg) => (S::BAD_REQUEST, C::ValidationError, msg, None),
            Self::Unauthorized(msg) => (S::UNAUTHORIZED, C::Unauthorized, msg, None),
            Self::Forbidden(msg) => (S::FORBIDDEN, C::Forbidden, msg, None),
            Self::NotFound(msg) => (S::NOT_FOUND, C::NotFound, msg, None),
            Self::Conflict(msg) => (S::CONFLICT, C::Conflict, msg, None),
            Self::UnprocessableEntity(msg) => (S::UNPROCESSABLE_ENTITY, C::UnprocessableEntity, msg, None),
            Self::BadGateway(msg) => (S::BAD_GATEWAY, C::BadGateway, msg, None),
            Self::InternalServerError(msg) => (S::INTERNAL_SERVER_ERROR, C::InternalError, msg, None),
            Self::ServiceUnavailable(msg) => (S::SERVICE_UNAVAILABLE, C::ServiceUnavailable, msg, None),
        }
    }
}

fn default_parts(status: StatusCode, code: ErrorCode) -> ResponseParts {
    (status, code, code.default_message().to_string(), None)
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message, details) = self.into_parts();

        if status.is_server_error() {
            tracing::error!(error_code = code.code(), status = %status, "{}", message);
        } else {
            tracing::info!(error_code = code.code(), status = %status, "{}", message);
        }

        let body = Json(ErrorResponse {
            code: code.code(),
            error: code.as_str().to_string(),
            message,
            details,
        });

        (status, body).into_response()
    }
}

/// Classify a MongoDB driver error.
///
/// Duplicate-key violations become 409 so uniqueness indexes read as
/// conflicts; unreachable-server conditions become 503 so callers and
/// orchestrators treat them as transient rather than as application bugs.
fn map_mongo_error(error: &mongodb::error::Error) -> ResponseParts {
    let duplicate_key = match error.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(we)) => we.code == 11000,
        ErrorKind::Command(ce) => ce.code == 11000,
        _ => false,
    };
    if duplicate_key {
        return default_parts(StatusCode::CONFLICT, ErrorCode::DatabaseDuplicateKey);
    }

    match error.kind.as_ref() {
        ErrorKind::ServerSelection { .. } | ErrorKind::Io(_) => {
            tracing::error!("Database unreachable: {:?}", error);
            default_parts(StatusCode::SERVICE_UNAVAILABLE, ErrorCode::DatabaseUnavailable)
        }
        _ => {
            tracing::error!("Database error: {:?}", error);
            default_parts(StatusCode::INTERNAL_SERVER_ERROR, ErrorCode::DatabaseError)
        }
    }
}

/// Build an error response outside the `AppError` flow, e.g. in fallbacks.
///
/// # Example
///
/// ```rust,ignore
/// use axum_helpers::errors::{error_response, ErrorCode};
/// use axum::http::StatusCode;
///
/// let response = error_response(
///     StatusCode::BAD_REQUEST,
///     "Invalid input".to_string(),
///     ErrorCode::ValidationError,
/// );
/// ```
pub fn error_response(status: StatusCode, message: String, error_code: ErrorCode) -> Response {
    let body = Json(ErrorResponse {
        code: error_code.code(),
        error: error_code.as_str().to_string(),
        message,
        details: None,
    });

    (status, body).into_response()
}
