use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum EventError {
    #[error("Event not found: {0}")]
    NotFound(Uuid),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error("Already registered for this event")]
    DuplicateRegistration,

    #[error("Event is full: {requested} seat(s) requested, {available} available")]
    CapacityExceeded { requested: u32, available: u32 },

    #[error("Access denied: {0}")]
    Forbidden(String),

    #[error("Event was modified concurrently, retries exhausted")]
    ConcurrentModification,

    #[error("Database error: {0}")]
    Database(#[from] mongodb::error::Error),
}

pub type EventResult<T> = Result<T, EventError>;

/// Convert EventError to AppError for standardized error responses
impl From<EventError> for AppError {
    fn from(err: EventError) -> Self {
        match err {
            EventError::NotFound(id) => AppError::NotFound(format!("Event {} not found", id)),
            EventError::Validation(msg) => AppError::BadRequest(msg),
            EventError::InvalidOperation(msg) => AppError::BadRequest(msg),
            EventError::DuplicateRegistration => {
                AppError::Conflict("Already registered for this event".to_string())
            }
            EventError::CapacityExceeded {
                requested,
                available,
            } => AppError::Conflict(format!(
                "Event is full: {} seat(s) requested, {} available",
                requested, available
            )),
            EventError::Forbidden(msg) => AppError::Forbidden(msg),
            EventError::ConcurrentModification => AppError::ServiceUnavailable(
                "Registration is contended, please retry".to_string(),
            ),
            EventError::Database(e) => AppError::Database(e),
        }
    }
}

impl IntoResponse for EventError {
    fn into_response(self) -> Response {
        // Convert to AppError for the standardized error response format
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}
