use async_trait::async_trait;
use domain_events::directory::UserDirectory;
use domain_events::{EventRepository, EventService};
use uuid::Uuid;

use crate::error::PaymentResult;

/// Pricing facts a payment order needs from an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventPricing {
    pub event_id: Uuid,
    pub name: String,
    /// Ticket price in major currency units. Zero means the event is free.
    pub price: i64,
    pub currency: String,
}

/// The payment workflow's window into the events domain: read a price when
/// an order is created, claim a seat when a payment verifies.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EventLedger: Send + Sync {
    async fn event_pricing(&self, event_id: Uuid) -> PaymentResult<EventPricing>;

    /// Admit a paid attendee. Duplicate confirmations for a user already
    /// holding a seat are a no-op.
    async fn admit_paid(
        &self,
        event_id: Uuid,
        user_id: Uuid,
        payment_id: Uuid,
    ) -> PaymentResult<()>;
}

#[async_trait]
impl<R, D> EventLedger for EventService<R, D>
where
    R: EventRepository,
    D: UserDirectory,
{
    async fn event_pricing(&self, event_id: Uuid) -> PaymentResult<EventPricing> {
        let event = self.load_event(event_id).await?;
        Ok(EventPricing {
            event_id: event.id,
            name: event.name,
            price: event.price,
            currency: event.currency,
        })
    }

    async fn admit_paid(
        &self,
        event_id: Uuid,
        user_id: Uuid,
        payment_id: Uuid,
    ) -> PaymentResult<()> {
        self.admit_paid_attendee(event_id, user_id, payment_id)
            .await?;
        Ok(())
    }
}
