//! Payment repository trait

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::PaymentResult;
use crate::models::Payment;

/// Repository trait for payment storage operations
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PaymentRepository: Send + Sync {
    /// Store a new payment record
    async fn insert(&self, payment: &Payment) -> PaymentResult<()>;

    /// Fetch a payment by its gateway order id
    async fn find_by_order_id(&self, order_id: &str) -> PaymentResult<Option<Payment>>;

    /// Fetch the completed payment a user holds for an event, if any
    async fn find_paid_for_event(
        &self,
        user_id: Uuid,
        event_id: Uuid,
    ) -> PaymentResult<Option<Payment>>;

    /// Conditionally move a payment to `paid`, recording the gateway
    /// payment id and signature.
    ///
    /// The write applies only while the payment is still open (`created`
    /// or `pending`). Returns the updated payment, or `None` when the
    /// payment had already reached a settled status and the caller must
    /// re-read to find out which.
    async fn mark_paid(
        &self,
        id: Uuid,
        gateway_payment_id: &str,
        signature: &str,
    ) -> PaymentResult<Option<Payment>>;

    /// Conditionally move a payment to `failed`.
    ///
    /// Same conditional semantics as [`Self::mark_paid`]: settled payments
    /// are left untouched and `None` is returned.
    async fn mark_failed(&self, id: Uuid) -> PaymentResult<Option<Payment>>;
}
