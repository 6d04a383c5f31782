//! Event repository trait

use async_trait::async_trait;
use mongodb::bson::Document;
use uuid::Uuid;

use crate::error::EventResult;
use crate::models::{Attendee, Event, EventFilter};

/// Repository trait for event storage operations
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EventRepository: Send + Sync {
    /// Store a new event
    async fn insert(&self, event: &Event) -> EventResult<()>;

    /// Fetch an event by id
    async fn get_by_id(&self, id: Uuid) -> EventResult<Option<Event>>;

    /// List events matching the filter, date-ascending, paginated.
    ///
    /// `visibility` is an extra predicate merged into the query; `None`
    /// means no visibility restriction.
    async fn list(
        &self,
        filter: &EventFilter,
        visibility: Option<Document>,
    ) -> EventResult<Vec<Event>>;

    /// Count events matching the same predicate as [`Self::list`]
    async fn count(&self, filter: &EventFilter, visibility: Option<Document>) -> EventResult<u64>;

    /// Conditionally replace the roster and derived seat count.
    ///
    /// The write applies only if the stored revision still equals
    /// `expected_revision`; the revision is incremented in the same
    /// operation. Returns the updated event, or `None` when a concurrent
    /// writer got there first and the caller must re-read and retry.
    async fn apply_roster(
        &self,
        event_id: Uuid,
        expected_revision: i64,
        attendees: Vec<Attendee>,
        available_seats: u32,
    ) -> EventResult<Option<Event>>;
}
