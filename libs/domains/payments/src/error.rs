use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use domain_events::EventError;
use mongodb::error::{ErrorKind, WriteFailure};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PaymentError {
    #[error("Payment not found for order {0}")]
    OrderNotFound(String),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error("Payment already completed for this event")]
    AlreadyPaid,

    #[error("Payment verification failed")]
    VerificationFailed,

    #[error("Payment gateway error: {0}")]
    Gateway(String),

    #[error(transparent)]
    Event(#[from] EventError),

    #[error("Database error: {0}")]
    Database(#[from] mongodb::error::Error),

    #[error("Payment was modified concurrently, retries exhausted")]
    ConcurrentModification,

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type PaymentResult<T> = Result<T, PaymentError>;

/// Duplicate-key violations surface either as write errors or as command
/// errors depending on the operation, both carry server code 11000.
pub(crate) fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    match err.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(write_error)) => write_error.code == 11000,
        ErrorKind::Command(command_error) => command_error.code == 11000,
        _ => false,
    }
}

/// Convert PaymentError to AppError for standardized error responses
impl From<PaymentError> for AppError {
    fn from(err: PaymentError) -> Self {
        match err {
            PaymentError::OrderNotFound(order_id) => {
                AppError::NotFound(format!("Payment not found for order {}", order_id))
            }
            PaymentError::Validation(msg) => AppError::BadRequest(msg),
            PaymentError::InvalidOperation(msg) => AppError::BadRequest(msg),
            PaymentError::AlreadyPaid => {
                AppError::Conflict("Payment already completed for this event".to_string())
            }
            PaymentError::VerificationFailed => {
                AppError::BadRequest("Payment verification failed".to_string())
            }
            PaymentError::Gateway(msg) => AppError::BadGateway(msg),
            PaymentError::Event(e) => e.into(),
            PaymentError::Database(e) => AppError::Database(e),
            PaymentError::ConcurrentModification => {
                AppError::ServiceUnavailable("Payment is contended, please retry".to_string())
            }
            PaymentError::Internal(msg) => AppError::InternalServerError(msg),
        }
    }
}

impl IntoResponse for PaymentError {
    fn into_response(self) -> Response {
        // Convert to AppError for the standardized error response format
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}
