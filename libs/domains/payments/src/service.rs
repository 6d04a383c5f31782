//! Payment service - business logic layer
//!
//! Orders are created at the gateway first and persisted only once the
//! gateway confirms, so an abandoned checkout leaves no record. No seat is
//! held while a payment is open; the seat is claimed when the callback
//! signature verifies.

use std::sync::Arc;

use tracing::instrument;
use uuid::Uuid;
use validator::Validate;

use crate::error::{PaymentError, PaymentResult, is_duplicate_key};
use crate::gateway::PaymentGateway;
use crate::ledger::EventLedger;
use crate::models::{
    CreateOrderRequest, CreateOrderResponse, Payment, PaymentStatus, VerifyPaymentRequest,
    VerifyPaymentResponse,
};
use crate::repository::PaymentRepository;
use crate::signature::verify_signature;

/// Payment service providing business logic operations
///
/// Coordinates the gateway, the payment store, and the event ledger
/// through the created -> paid | failed state machine.
pub struct PaymentService<P: PaymentRepository, G: PaymentGateway, L: EventLedger> {
    payments: Arc<P>,
    gateway: Arc<G>,
    ledger: Arc<L>,
    signing_secret: String,
}

impl<P: PaymentRepository, G: PaymentGateway, L: EventLedger> PaymentService<P, G, L> {
    /// Create a new PaymentService
    pub fn new(payments: P, gateway: G, ledger: L, signing_secret: String) -> Self {
        Self {
            payments: Arc::new(payments),
            gateway: Arc::new(gateway),
            ledger: Arc::new(ledger),
            signing_secret,
        }
    }

    /// Create a gateway order for a paid event.
    ///
    /// The charge must match the event price exactly. The payment record
    /// is written after the gateway accepts the order, in `created`
    /// status, and holds no seat.
    #[instrument(skip(self, request), fields(event_id = %request.event_id, user_id = %user_id))]
    pub async fn create_order(
        &self,
        user_id: Uuid,
        request: CreateOrderRequest,
    ) -> PaymentResult<CreateOrderResponse> {
        request
            .validate()
            .map_err(|e| PaymentError::Validation(e.to_string()))?;

        let pricing = self.ledger.event_pricing(request.event_id).await?;

        if pricing.price == 0 {
            return Err(PaymentError::InvalidOperation(
                "This event is free, register directly".to_string(),
            ));
        }
        if request.amount != pricing.price {
            return Err(PaymentError::Validation(format!(
                "Amount mismatch: event costs {} {}",
                pricing.price, pricing.currency
            )));
        }

        if self
            .payments
            .find_paid_for_event(user_id, request.event_id)
            .await?
            .is_some()
        {
            return Err(PaymentError::AlreadyPaid);
        }

        // Gateways charge in the smallest currency unit
        let amount_minor = pricing
            .price
            .checked_mul(100)
            .ok_or_else(|| PaymentError::Internal("Order amount overflow".to_string()))?;

        let receipt = Uuid::now_v7();
        let order = self
            .gateway
            .create_order(amount_minor, &pricing.currency, &receipt.to_string())
            .await?;

        let payment = Payment::new_order(
            receipt,
            user_id,
            request.event_id,
            pricing.price,
            pricing.currency.clone(),
            order.order_id.clone(),
        );
        self.payments.insert(&payment).await?;

        tracing::info!(order_id = %order.order_id, "Payment order created");

        Ok(CreateOrderResponse {
            order_id: order.order_id,
            amount: amount_minor,
            currency: pricing.currency,
            key_id: self.gateway.key_id(),
        })
    }

    /// Verify a gateway payment callback.
    ///
    /// A valid signature settles the payment as `paid` and claims the
    /// seat; an invalid one settles it as `failed`. Both settlements are
    /// one-way. Repeating a valid callback returns the same receipt
    /// without touching the roster again.
    #[instrument(skip(self, request), fields(order_id = %request.order_id))]
    pub async fn verify_payment(
        &self,
        request: VerifyPaymentRequest,
    ) -> PaymentResult<VerifyPaymentResponse> {
        request
            .validate()
            .map_err(|e| PaymentError::Validation(e.to_string()))?;

        let payment = self
            .payments
            .find_by_order_id(&request.order_id)
            .await?
            .ok_or_else(|| PaymentError::OrderNotFound(request.order_id.clone()))?;

        let signature_valid = verify_signature(
            &self.signing_secret,
            &request.order_id,
            &request.payment_id,
            &request.signature,
        )?;

        match payment.status {
            PaymentStatus::Paid => {
                if !signature_valid {
                    return Err(PaymentError::VerificationFailed);
                }
                // Duplicate callback for a settled payment: make sure the
                // seat is claimed, then hand back the stored receipt
                self.admit(&payment).await?;
                Ok(Self::receipt(&payment))
            }
            PaymentStatus::Failed | PaymentStatus::Refunded => {
                Err(PaymentError::VerificationFailed)
            }
            PaymentStatus::Created | PaymentStatus::Pending => {
                if !signature_valid {
                    // The conditional write loses quietly if another
                    // callback settled the payment first
                    self.payments.mark_failed(payment.id).await?;
                    tracing::warn!(order_id = %request.order_id, "Payment signature mismatch");
                    return Err(PaymentError::VerificationFailed);
                }

                let marked = match self
                    .payments
                    .mark_paid(payment.id, &request.payment_id, &request.signature)
                    .await
                {
                    Ok(marked) => marked,
                    // The paid-per-event constraint fired: the user holds
                    // another completed payment for this event
                    Err(PaymentError::Database(e)) if is_duplicate_key(&e) => {
                        return Err(PaymentError::AlreadyPaid);
                    }
                    Err(e) => return Err(e),
                };

                let paid = match marked {
                    Some(paid) => paid,
                    None => return self.reconcile_settled(&request.order_id).await,
                };

                self.admit(&paid).await?;

                tracing::info!(order_id = %paid.order_id, "Payment verified");
                Ok(Self::receipt(&paid))
            }
        }
    }

    /// Re-read a payment that settled under a concurrent callback and
    /// answer as that callback's outcome dictates
    async fn reconcile_settled(&self, order_id: &str) -> PaymentResult<VerifyPaymentResponse> {
        let settled = self
            .payments
            .find_by_order_id(order_id)
            .await?
            .ok_or_else(|| PaymentError::OrderNotFound(order_id.to_string()))?;

        match settled.status {
            PaymentStatus::Paid => {
                self.admit(&settled).await?;
                Ok(Self::receipt(&settled))
            }
            PaymentStatus::Failed | PaymentStatus::Refunded => {
                Err(PaymentError::VerificationFailed)
            }
            _ => Err(PaymentError::ConcurrentModification),
        }
    }

    /// Claim the seat for a paid event payment.
    ///
    /// The payment stays paid even when the event filled in the meantime;
    /// a charge without a seat is settled by refund tooling, not by
    /// rolling back the payment.
    async fn admit(&self, payment: &Payment) -> PaymentResult<()> {
        let event_id = payment.event_id.ok_or_else(|| {
            PaymentError::Internal("Event payment has no event reference".to_string())
        })?;
        self.ledger
            .admit_paid(event_id, payment.user_id, payment.id)
            .await
    }

    fn receipt(payment: &Payment) -> VerifyPaymentResponse {
        VerifyPaymentResponse {
            order_id: payment.order_id.clone(),
            status: payment.status,
            verified_at: payment.verified_at,
        }
    }
}

impl<P: PaymentRepository, G: PaymentGateway, L: EventLedger> Clone for PaymentService<P, G, L> {
    fn clone(&self) -> Self {
        Self {
            payments: Arc::clone(&self.payments),
            gateway: Arc::clone(&self.gateway),
            ledger: Arc::clone(&self.ledger),
            signing_secret: self.signing_secret.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PaymentError;
    use crate::gateway::{GatewayOrder, MockPaymentGateway};
    use crate::ledger::{EventPricing, MockEventLedger};
    use crate::models::tests::sample_order;
    use crate::repository::MockPaymentRepository;
    use crate::signature::compute_signature;
    use chrono::Utc;
    use domain_events::EventError;
    use mockall::predicate::eq;

    const SECRET: &str = "test_signing_secret";
    const GATEWAY_PAYMENT: &str = "pay_test_9";

    fn service(
        payments: MockPaymentRepository,
        gateway: MockPaymentGateway,
        ledger: MockEventLedger,
    ) -> PaymentService<MockPaymentRepository, MockPaymentGateway, MockEventLedger> {
        PaymentService::new(payments, gateway, ledger, SECRET.to_string())
    }

    fn pricing(event_id: Uuid, price: i64) -> EventPricing {
        EventPricing {
            event_id,
            name: "Tech Summit".to_string(),
            price,
            currency: "INR".to_string(),
        }
    }

    fn verify_request(order_id: &str, signature: String) -> VerifyPaymentRequest {
        VerifyPaymentRequest {
            order_id: order_id.to_string(),
            payment_id: GATEWAY_PAYMENT.to_string(),
            signature,
        }
    }

    fn valid_signature(order_id: &str) -> String {
        compute_signature(SECRET, order_id, GATEWAY_PAYMENT).unwrap()
    }

    // ====== Order creation ======

    #[tokio::test]
    async fn test_create_order_happy_path() {
        let event_id = Uuid::new_v4();
        let user_id = Uuid::new_v4();

        let mut ledger = MockEventLedger::new();
        ledger
            .expect_event_pricing()
            .with(eq(event_id))
            .returning(|id| Ok(pricing(id, 500)));

        let mut payments = MockPaymentRepository::new();
        payments
            .expect_find_paid_for_event()
            .with(eq(user_id), eq(event_id))
            .returning(|_, _| Ok(None));
        payments
            .expect_insert()
            .withf(move |p| {
                p.status == PaymentStatus::Created
                    && p.user_id == user_id
                    && p.event_id == Some(event_id)
                    && p.amount == 500
                    && p.order_id == "order_rzp_1"
            })
            .times(1)
            .returning(|_| Ok(()));

        let mut gateway = MockPaymentGateway::new();
        gateway
            .expect_create_order()
            .withf(|amount, currency, _receipt| *amount == 50_000 && currency == "INR")
            .times(1)
            .returning(|_, _, _| {
                Ok(GatewayOrder {
                    order_id: "order_rzp_1".to_string(),
                })
            });
        gateway
            .expect_key_id()
            .returning(|| "rzp_test_key".to_string());

        let service = service(payments, gateway, ledger);
        let response = service
            .create_order(user_id, CreateOrderRequest { event_id, amount: 500 })
            .await
            .unwrap();

        assert_eq!(response.order_id, "order_rzp_1");
        assert_eq!(response.amount, 50_000, "gateway amount should be in minor units");
        assert_eq!(response.currency, "INR");
        assert_eq!(response.key_id, "rzp_test_key");
    }

    #[tokio::test]
    async fn test_create_order_rejects_free_event() {
        let event_id = Uuid::new_v4();

        let mut ledger = MockEventLedger::new();
        ledger
            .expect_event_pricing()
            .returning(|id| Ok(pricing(id, 0)));

        let service = service(
            MockPaymentRepository::new(),
            MockPaymentGateway::new(),
            ledger,
        );
        let err = service
            .create_order(Uuid::new_v4(), CreateOrderRequest { event_id, amount: 500 })
            .await
            .unwrap_err();

        assert!(matches!(err, PaymentError::InvalidOperation(_)));
    }

    #[tokio::test]
    async fn test_create_order_rejects_amount_mismatch() {
        let event_id = Uuid::new_v4();

        let mut ledger = MockEventLedger::new();
        ledger
            .expect_event_pricing()
            .returning(|id| Ok(pricing(id, 500)));

        let service = service(
            MockPaymentRepository::new(),
            MockPaymentGateway::new(),
            ledger,
        );
        let err = service
            .create_order(Uuid::new_v4(), CreateOrderRequest { event_id, amount: 450 })
            .await
            .unwrap_err();

        assert!(matches!(err, PaymentError::Validation(_)));
    }

    #[tokio::test]
    async fn test_create_order_rejects_missing_event() {
        let event_id = Uuid::new_v4();

        let mut ledger = MockEventLedger::new();
        ledger
            .expect_event_pricing()
            .returning(|id| Err(PaymentError::Event(EventError::NotFound(id))));

        let service = service(
            MockPaymentRepository::new(),
            MockPaymentGateway::new(),
            ledger,
        );
        let err = service
            .create_order(Uuid::new_v4(), CreateOrderRequest { event_id, amount: 500 })
            .await
            .unwrap_err();

        assert!(matches!(err, PaymentError::Event(EventError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_create_order_rejects_when_already_paid() {
        let event_id = Uuid::new_v4();

        let mut ledger = MockEventLedger::new();
        ledger
            .expect_event_pricing()
            .returning(|id| Ok(pricing(id, 500)));

        let mut existing = sample_order();
        existing.status = PaymentStatus::Paid;
        let mut payments = MockPaymentRepository::new();
        payments
            .expect_find_paid_for_event()
            .returning(move |_, _| Ok(Some(existing.clone())));

        // No gateway expectations: a second charge must never reach it
        let service = service(payments, MockPaymentGateway::new(), ledger);
        let err = service
            .create_order(Uuid::new_v4(), CreateOrderRequest { event_id, amount: 500 })
            .await
            .unwrap_err();

        assert!(matches!(err, PaymentError::AlreadyPaid));
    }

    #[tokio::test]
    async fn test_create_order_persists_nothing_when_gateway_fails() {
        let event_id = Uuid::new_v4();

        let mut ledger = MockEventLedger::new();
        ledger
            .expect_event_pricing()
            .returning(|id| Ok(pricing(id, 500)));

        let mut payments = MockPaymentRepository::new();
        payments
            .expect_find_paid_for_event()
            .returning(|_, _| Ok(None));
        // No insert expectation: a gateway failure must persist nothing

        let mut gateway = MockPaymentGateway::new();
        gateway
            .expect_create_order()
            .returning(|_, _, _| Err(PaymentError::Gateway("connection refused".to_string())));

        let service = service(payments, gateway, ledger);
        let err = service
            .create_order(Uuid::new_v4(), CreateOrderRequest { event_id, amount: 500 })
            .await
            .unwrap_err();

        assert!(matches!(err, PaymentError::Gateway(_)));
    }

    // ====== Verification ======

    #[tokio::test]
    async fn test_verify_unknown_order() {
        let mut payments = MockPaymentRepository::new();
        payments
            .expect_find_by_order_id()
            .returning(|_| Ok(None));

        let service = service(payments, MockPaymentGateway::new(), MockEventLedger::new());
        let err = service
            .verify_payment(verify_request("order_missing", "sig".to_string()))
            .await
            .unwrap_err();

        assert!(matches!(err, PaymentError::OrderNotFound(_)));
    }

    #[tokio::test]
    async fn test_verify_marks_paid_and_claims_seat() {
        let order = sample_order();
        let order_id = order.order_id.clone();
        let payment_uuid = order.id;
        let event_id = order.event_id.unwrap();
        let user_id = order.user_id;

        let mut payments = MockPaymentRepository::new();
        let found = order.clone();
        let expected_order_id = order_id.clone();
        payments
            .expect_find_by_order_id()
            .withf(move |o| o == expected_order_id)
            .returning(move |_| Ok(Some(found.clone())));

        let mut paid = order.clone();
        paid.status = PaymentStatus::Paid;
        paid.payment_id = Some(GATEWAY_PAYMENT.to_string());
        paid.verified_at = Some(Utc::now());
        payments
            .expect_mark_paid()
            .withf(move |id, gateway_payment_id, _sig| {
                *id == payment_uuid && gateway_payment_id == GATEWAY_PAYMENT
            })
            .times(1)
            .returning(move |_, _, _| Ok(Some(paid.clone())));

        let mut ledger = MockEventLedger::new();
        ledger
            .expect_admit_paid()
            .with(eq(event_id), eq(user_id), eq(payment_uuid))
            .times(1)
            .returning(|_, _, _| Ok(()));

        let service = service(payments, MockPaymentGateway::new(), ledger);
        let receipt = service
            .verify_payment(verify_request(&order_id, valid_signature(&order_id)))
            .await
            .unwrap();

        assert_eq!(receipt.order_id, order_id);
        assert_eq!(receipt.status, PaymentStatus::Paid);
        assert!(receipt.verified_at.is_some());
    }

    #[tokio::test]
    async fn test_verify_bad_signature_fails_payment() {
        let order = sample_order();
        let order_id = order.order_id.clone();
        let payment_uuid = order.id;

        let mut payments = MockPaymentRepository::new();
        let found = order.clone();
        payments
            .expect_find_by_order_id()
            .returning(move |_| Ok(Some(found.clone())));

        let mut failed = order.clone();
        failed.status = PaymentStatus::Failed;
        payments
            .expect_mark_failed()
            .with(eq(payment_uuid))
            .times(1)
            .returning(move |_| Ok(Some(failed.clone())));

        // No ledger expectations: nobody is admitted on a bad signature
        let service = service(payments, MockPaymentGateway::new(), MockEventLedger::new());
        let err = service
            .verify_payment(verify_request(&order_id, "deadbeef".to_string()))
            .await
            .unwrap_err();

        assert!(matches!(err, PaymentError::VerificationFailed));
    }

    #[tokio::test]
    async fn test_verify_is_idempotent_once_paid() {
        let mut paid = sample_order();
        paid.status = PaymentStatus::Paid;
        paid.payment_id = Some(GATEWAY_PAYMENT.to_string());
        paid.verified_at = Some(Utc::now());
        let order_id = paid.order_id.clone();

        let mut payments = MockPaymentRepository::new();
        let found = paid.clone();
        payments
            .expect_find_by_order_id()
            .returning(move |_| Ok(Some(found.clone())));
        // No mark_paid expectation: the record is already settled

        let mut ledger = MockEventLedger::new();
        ledger
            .expect_admit_paid()
            .times(1)
            .returning(|_, _, _| Ok(()));

        let service = service(payments, MockPaymentGateway::new(), ledger);
        let receipt = service
            .verify_payment(verify_request(&order_id, valid_signature(&order_id)))
            .await
            .unwrap();

        assert_eq!(receipt.status, PaymentStatus::Paid);
    }

    #[tokio::test]
    async fn test_verify_rejects_paid_payment_with_bad_signature() {
        let mut paid = sample_order();
        paid.status = PaymentStatus::Paid;
        paid.payment_id = Some(GATEWAY_PAYMENT.to_string());
        let order_id = paid.order_id.clone();

        let mut payments = MockPaymentRepository::new();
        payments
            .expect_find_by_order_id()
            .returning(move |_| Ok(Some(paid.clone())));
        // No mark_failed expectation: a settled payment is left untouched

        let service = service(payments, MockPaymentGateway::new(), MockEventLedger::new());
        let err = service
            .verify_payment(verify_request(&order_id, "deadbeef".to_string()))
            .await
            .unwrap_err();

        assert!(matches!(err, PaymentError::VerificationFailed));
    }

    #[tokio::test]
    async fn test_verify_rejects_failed_payment_even_with_valid_signature() {
        let mut failed = sample_order();
        failed.status = PaymentStatus::Failed;
        let order_id = failed.order_id.clone();

        let mut payments = MockPaymentRepository::new();
        payments
            .expect_find_by_order_id()
            .returning(move |_| Ok(Some(failed.clone())));

        let service = service(payments, MockPaymentGateway::new(), MockEventLedger::new());
        let err = service
            .verify_payment(verify_request(&order_id, valid_signature(&order_id)))
            .await
            .unwrap_err();

        assert!(
            matches!(err, PaymentError::VerificationFailed),
            "failed is terminal, a late valid callback cannot revive it"
        );
    }

    #[tokio::test]
    async fn test_verify_reconciles_lost_settlement_race() {
        let order = sample_order();
        let order_id = order.order_id.clone();

        let mut paid = order.clone();
        paid.status = PaymentStatus::Paid;
        paid.payment_id = Some(GATEWAY_PAYMENT.to_string());
        paid.verified_at = Some(Utc::now());

        let mut seq = mockall::Sequence::new();
        let mut payments = MockPaymentRepository::new();
        let found = order.clone();
        payments
            .expect_find_by_order_id()
            .times(1)
            .in_sequence(&mut seq)
            .returning(move |_| Ok(Some(found.clone())));
        payments
            .expect_mark_paid()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _, _| Ok(None));
        payments
            .expect_find_by_order_id()
            .times(1)
            .in_sequence(&mut seq)
            .returning(move |_| Ok(Some(paid.clone())));

        let mut ledger = MockEventLedger::new();
        ledger
            .expect_admit_paid()
            .times(1)
            .returning(|_, _, _| Ok(()));

        let service = service(payments, MockPaymentGateway::new(), ledger);
        let receipt = service
            .verify_payment(verify_request(&order_id, valid_signature(&order_id)))
            .await
            .unwrap();

        assert_eq!(receipt.status, PaymentStatus::Paid);
    }

    #[tokio::test]
    async fn test_verify_propagates_full_event_after_payment() {
        let order = sample_order();
        let order_id = order.order_id.clone();

        let mut payments = MockPaymentRepository::new();
        let found = order.clone();
        payments
            .expect_find_by_order_id()
            .returning(move |_| Ok(Some(found.clone())));

        let mut paid = order.clone();
        paid.status = PaymentStatus::Paid;
        payments
            .expect_mark_paid()
            .returning(move |_, _, _| Ok(Some(paid.clone())));

        // No seat was held while the payment was open, so the event may
        // have filled in the meantime
        let mut ledger = MockEventLedger::new();
        ledger.expect_admit_paid().returning(|_, _, _| {
            Err(PaymentError::Event(EventError::CapacityExceeded {
                requested: 1,
                available: 0,
            }))
        });

        let service = service(payments, MockPaymentGateway::new(), ledger);
        let err = service
            .verify_payment(verify_request(&order_id, valid_signature(&order_id)))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            PaymentError::Event(EventError::CapacityExceeded { .. })
        ));
    }
}
