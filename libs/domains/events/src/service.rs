//! Event service - business logic layer
//!
//! Coordinates visibility checks, the capacity ledger, and conditional
//! roster writes. Every admission follows the same discipline: read the
//! event, plan the new roster in memory, persist it only if the stored
//! revision is unchanged, otherwise re-read and re-validate.

use std::sync::Arc;

use axum_helpers::extractors::Identity;
use tracing::instrument;
use uuid::Uuid;
use validator::Validate;

use crate::capacity::{self, DuplicatePolicy, plan_admission, plan_interest};
use crate::directory::UserDirectory;
use crate::error::{EventError, EventResult};
use crate::models::{
    Attendee, CreateEvent, Event, EventFilter, EventPage, RegistrationResponse, RsvpRequest,
};
use crate::repository::EventRepository;
use crate::visibility::{can_view, visibility_filter};

/// Attempts per admission before giving up on a contended roster.
///
/// Each retry re-reads and re-validates, so losers of a race exit with a
/// domain error (duplicate, full) as soon as the fresh state shows one;
/// only sustained write contention burns all attempts.
const ADMISSION_MAX_RETRIES: usize = 5;

/// Event service providing business logic operations
///
/// The service layer handles authorization, validation, and orchestrates
/// repository operations.
pub struct EventService<R: EventRepository, D: UserDirectory> {
    repository: Arc<R>,
    directory: Arc<D>,
}

impl<R: EventRepository, D: UserDirectory> EventService<R, D> {
    /// Create a new EventService with the given repository and directory
    pub fn new(repository: R, directory: D) -> Self {
        Self {
            repository: Arc::new(repository),
            directory: Arc::new(directory),
        }
    }

    /// Create a new event; admin only
    #[instrument(skip(self, input, actor), fields(event_name = %input.name, actor = %actor.user_id))]
    pub async fn create_event(&self, input: CreateEvent, actor: &Identity) -> EventResult<Event> {
        if !actor.is_elevated() {
            return Err(EventError::Forbidden(
                "Only admins can create events".to_string(),
            ));
        }

        input
            .validate()
            .map_err(|e| EventError::Validation(e.to_string()))?;

        if input.is_team_event {
            let (Some(min), Some(max)) = (input.min_team_size, input.max_team_size) else {
                return Err(EventError::Validation(
                    "Team events must declare min_team_size and max_team_size".to_string(),
                ));
            };
            if min > max {
                return Err(EventError::Validation(
                    "min_team_size cannot exceed max_team_size".to_string(),
                ));
            }
        }

        let event = Event::new(input, actor.user_id);
        self.repository.insert(&event).await?;
        Ok(event)
    }

    /// Get an event by ID, enforcing the actor's visibility
    #[instrument(skip(self, actor), fields(actor = %actor.user_id))]
    pub async fn get_event(&self, id: Uuid, actor: &Identity) -> EventResult<Event> {
        self.fetch_visible(id, actor).await
    }

    /// List events the actor may see, date-ascending, paginated
    #[instrument(skip(self, actor), fields(actor = %actor.user_id))]
    pub async fn list_events(
        &self,
        mut filter: EventFilter,
        actor: &Identity,
    ) -> EventResult<EventPage> {
        filter.page = filter.page.max(1);
        filter.per_page = filter.per_page.clamp(1, 100);

        let visibility = visibility_filter(actor);
        let total_count = self.repository.count(&filter, visibility.clone()).await?;
        let events = self.repository.list(&filter, visibility).await?;

        let total_pages =
            u32::try_from(total_count.div_ceil(u64::from(filter.per_page))).unwrap_or(u32::MAX);

        Ok(EventPage {
            events,
            page: filter.page,
            total_pages,
            total_count,
        })
    }

    /// Register for a free event, individually or as a team.
    ///
    /// Paid events reject this path; their seats are granted by the
    /// payment workflow. The admission is all-or-nothing per request.
    #[instrument(skip(self, actor, request), fields(actor = %actor.user_id))]
    pub async fn rsvp(
        &self,
        event_id: Uuid,
        actor: &Identity,
        request: RsvpRequest,
    ) -> EventResult<Event> {
        request
            .validate()
            .map_err(|e| EventError::Validation(e.to_string()))?;

        let mut event = self.fetch_visible(event_id, actor).await?;

        if !event.is_free() {
            return Err(EventError::InvalidOperation(
                "This event requires payment to register".to_string(),
            ));
        }

        // Teammate emails resolve once; a retry changes nothing about them
        let entries = if event.is_team_event {
            self.build_team_entries(&event, actor, &request).await?
        } else {
            vec![Attendee::going(actor.user_id)]
        };

        for _ in 0..ADMISSION_MAX_RETRIES {
            let plan = plan_admission(&event, entries.clone(), DuplicatePolicy::Reject)?;

            match self
                .repository
                .apply_roster(event.id, event.revision, plan.attendees, plan.available_seats)
                .await?
            {
                Some(updated) => return Ok(updated),
                None => event = self.fetch_visible(event_id, actor).await?,
            }
        }

        Err(EventError::ConcurrentModification)
    }

    /// Mark soft interest in an event; repeat calls are no-ops
    #[instrument(skip(self, actor), fields(actor = %actor.user_id))]
    pub async fn mark_interested(&self, event_id: Uuid, actor: &Identity) -> EventResult<Event> {
        for _ in 0..ADMISSION_MAX_RETRIES {
            let event = self.fetch_visible(event_id, actor).await?;

            let Some(plan) = plan_interest(&event, actor.user_id) else {
                return Ok(event);
            };

            if let Some(updated) = self
                .repository
                .apply_roster(event.id, event.revision, plan.attendees, plan.available_seats)
                .await?
            {
                return Ok(updated);
            }
        }

        Err(EventError::ConcurrentModification)
    }

    /// The actor's registration state on an event
    #[instrument(skip(self, actor), fields(actor = %actor.user_id))]
    pub async fn registration(
        &self,
        event_id: Uuid,
        actor: &Identity,
    ) -> EventResult<RegistrationResponse> {
        let event = self.fetch_visible(event_id, actor).await?;
        let attendee = capacity::find_registration(&event.attendees, actor.user_id).cloned();

        Ok(RegistrationResponse {
            registered: attendee.as_ref().is_some_and(|a| a.status.occupies_seat()),
            attendee,
        })
    }

    /// Fetch an event without a visibility gate.
    ///
    /// For trusted internal callers such as the payment workflow, which
    /// has its own authorization story.
    #[instrument(skip(self))]
    pub async fn load_event(&self, id: Uuid) -> EventResult<Event> {
        self.repository
            .get_by_id(id)
            .await?
            .ok_or(EventError::NotFound(id))
    }

    /// Admit a paid attendee, tolerating duplicate confirmations.
    ///
    /// Called by the payment workflow after a verified payment. A user
    /// already holding a seat is left untouched so repeated gateway
    /// callbacks cannot double-admit or double-decrement.
    #[instrument(skip(self))]
    pub async fn admit_paid_attendee(
        &self,
        event_id: Uuid,
        user_id: Uuid,
        payment_id: Uuid,
    ) -> EventResult<Event> {
        for _ in 0..ADMISSION_MAX_RETRIES {
            let event = self.load_event(event_id).await?;

            let plan = plan_admission(
                &event,
                vec![Attendee::paid(user_id, payment_id)],
                DuplicatePolicy::Skip,
            )?;
            if plan.admitted == 0 {
                return Ok(event);
            }

            if let Some(updated) = self
                .repository
                .apply_roster(event.id, event.revision, plan.attendees, plan.available_seats)
                .await?
            {
                return Ok(updated);
            }
        }

        Err(EventError::ConcurrentModification)
    }

    async fn fetch_visible(&self, id: Uuid, actor: &Identity) -> EventResult<Event> {
        let event = self
            .repository
            .get_by_id(id)
            .await?
            .ok_or(EventError::NotFound(id))?;

        if !can_view(&event.visibility, actor) {
            return Err(EventError::Forbidden(
                "You do not have access to this event".to_string(),
            ));
        }

        Ok(event)
    }

    async fn build_team_entries(
        &self,
        event: &Event,
        actor: &Identity,
        request: &RsvpRequest,
    ) -> EventResult<Vec<Attendee>> {
        let team_name = request.team_name.as_deref().ok_or_else(|| {
            EventError::Validation("team_name is required for team events".to_string())
        })?;

        for (i, email) in request.team_member_emails.iter().enumerate() {
            if request.team_member_emails[..i].contains(email) {
                return Err(EventError::Validation(format!(
                    "Duplicate teammate email: {email}"
                )));
            }
        }

        // The acting user counts toward the team size
        let (min, max) = event.team_size_bounds();
        let team_size = request.team_member_emails.len() + 1;
        if team_size < min as usize || team_size > max as usize {
            return Err(EventError::Validation(format!(
                "Team size must be between {min} and {max} members"
            )));
        }

        let resolved = self
            .directory
            .resolve_emails(&request.team_member_emails)
            .await?;

        if resolved.len() != request.team_member_emails.len() {
            let missing: Vec<&str> = request
                .team_member_emails
                .iter()
                .filter(|email| !resolved.iter().any(|user| &user.email == *email))
                .map(String::as_str)
                .collect();
            return Err(EventError::Validation(format!(
                "Unknown campus emails: {}",
                missing.join(", ")
            )));
        }

        let mut entries = vec![Attendee::team_leader(actor.user_id, team_name)];
        entries.extend(
            resolved
                .into_iter()
                .map(|user| Attendee::teammate(user.id, team_name)),
        );
        Ok(entries)
    }
}

impl<R: EventRepository, D: UserDirectory> Clone for EventService<R, D> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            directory: Arc::clone(&self.directory),
        }
    }
}
