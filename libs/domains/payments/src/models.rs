use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Lifecycle of a payment record.
///
/// `created` is the only state a new record starts in. Verification moves
/// it to `paid` or `failed`, both one-way; `refunded` exists for records
/// written by back-office tooling and is terminal here.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    ToSchema,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PaymentStatus {
    Created,
    Pending,
    Paid,
    Failed,
    Refunded,
}

impl PaymentStatus {
    /// Whether the state machine allows moving from `self` to `next`
    pub fn can_transition(self, next: PaymentStatus) -> bool {
        use PaymentStatus::*;
        matches!(
            (self, next),
            (Created, Pending) | (Created, Paid) | (Created, Failed)
                | (Pending, Paid)
                | (Pending, Failed)
                | (Paid, Refunded)
        )
    }

    /// No further transitions leave this state
    pub fn is_terminal(self) -> bool {
        matches!(self, PaymentStatus::Failed | PaymentStatus::Refunded)
    }
}

/// What a payment pays for
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    ToSchema,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PaymentFor {
    Event,
    Listing,
    ClubMembership,
    Other,
}

/// Payment entity - represents a payment order stored in MongoDB
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Payment {
    /// Unique identifier (stored as _id in MongoDB); also used as the
    /// gateway receipt reference
    #[serde(rename = "_id", alias = "id")]
    pub id: Uuid,
    /// The paying user
    pub user_id: Uuid,
    pub payment_for: PaymentFor,
    /// Set when `payment_for` is an event
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_id: Option<Uuid>,
    /// Amount in major currency units, mirroring the event price
    pub amount: i64,
    pub currency: String,
    /// Gateway order id; unique per record
    pub order_id: String,
    /// Gateway payment id, present once a callback arrived
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_id: Option<String>,
    /// Gateway signature that verified this payment
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
    pub status: PaymentStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verified_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Payment {
    /// A freshly created event payment order.
    ///
    /// The caller supplies the id because it is sent to the gateway as the
    /// receipt reference before the record exists.
    pub fn new_order(
        id: Uuid,
        user_id: Uuid,
        event_id: Uuid,
        amount: i64,
        currency: String,
        order_id: String,
    ) -> Self {
        let now = Utc::now();
        Self {
            id,
            user_id,
            payment_for: PaymentFor::Event,
            event_id: Some(event_id),
            amount,
            currency,
            order_id,
            payment_id: None,
            signature: None,
            status: PaymentStatus::Created,
            verified_at: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// DTO for creating a payment order
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateOrderRequest {
    pub event_id: Uuid,
    /// Expected charge in major currency units; must equal the event price
    #[validate(range(min = 1))]
    pub amount: i64,
}

/// Gateway order handed back to the client for checkout
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateOrderResponse {
    pub order_id: String,
    /// Amount in minor currency units, as the gateway expects
    pub amount: i64,
    pub currency: String,
    /// Public gateway key the client checkout needs
    pub key_id: String,
}

/// DTO for verifying a gateway payment callback
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct VerifyPaymentRequest {
    #[validate(length(min = 1))]
    pub order_id: String,
    #[validate(length(min = 1))]
    pub payment_id: String,
    #[validate(length(min = 1))]
    pub signature: String,
}

/// Receipt returned after successful verification
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct VerifyPaymentResponse {
    pub order_id: String,
    pub status: PaymentStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verified_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    #[test]
    fn test_status_transitions_are_one_way() {
        use PaymentStatus::*;

        assert!(Created.can_transition(Paid));
        assert!(Created.can_transition(Failed));
        assert!(Created.can_transition(Pending));
        assert!(Pending.can_transition(Paid));
        assert!(Paid.can_transition(Refunded));

        assert!(!Paid.can_transition(Created));
        assert!(!Paid.can_transition(Failed));
        assert!(!Failed.can_transition(Paid));
        assert!(!Refunded.can_transition(Paid));
    }

    #[test]
    fn test_terminal_states() {
        assert!(PaymentStatus::Failed.is_terminal());
        assert!(PaymentStatus::Refunded.is_terminal());
        assert!(!PaymentStatus::Created.is_terminal());
        assert!(!PaymentStatus::Paid.is_terminal());
    }

    #[test]
    fn test_new_order_starts_created() {
        let payment = sample_order();
        assert_eq!(payment.status, PaymentStatus::Created);
        assert_eq!(payment.payment_for, PaymentFor::Event);
        assert!(payment.payment_id.is_none());
        assert!(payment.verified_at.is_none());
    }

    #[test]
    fn test_status_serializes_snake_case() {
        let json = serde_json::to_string(&PaymentStatus::Paid).unwrap();
        assert_eq!(json, "\"paid\"");
        assert_eq!(PaymentStatus::Created.to_string(), "created");
    }

    pub(crate) fn sample_order() -> Payment {
        Payment::new_order(
            Uuid::now_v7(),
            Uuid::new_v4(),
            Uuid::new_v4(),
            500,
            "INR".to_string(),
            "order_test_123".to_string(),
        )
    }
}
