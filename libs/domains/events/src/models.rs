use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

/// Attendance status of a single roster entry
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
pub enum AttendanceStatus {
    /// Free registration confirmed
    Going,
    /// Soft interest, no seat consumed
    Interested,
    /// Registration confirmed through a verified payment
    Paid,
}

impl AttendanceStatus {
    /// Whether this status consumes a seat
    pub fn occupies_seat(self) -> bool {
        matches!(self, AttendanceStatus::Going | AttendanceStatus::Paid)
    }
}

/// Who may see an event.
///
/// `Unknown` absorbs any unrecognized policy tag found in the store, so a
/// corrupt document deserializes instead of poisoning a whole list query.
/// The visibility resolver treats it as granting nothing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum VisibilityPolicy {
    /// Visible to every student
    All,
    /// Visible only to students of the listed branches
    Branch {
        #[serde(default)]
        branches: Vec<Uuid>,
    },
    /// Visible only to members of the listed clubs
    Club {
        #[serde(default)]
        clubs: Vec<Uuid>,
    },
    #[serde(other)]
    Unknown,
}

impl Default for VisibilityPolicy {
    fn default() -> Self {
        VisibilityPolicy::All
    }
}

/// One user's registration record on an event
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Attendee {
    pub user_id: Uuid,
    pub status: AttendanceStatus,
    /// Payment record backing a `paid` entry
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_id: Option<Uuid>,
    pub rsvp_date: DateTime<Utc>,
    /// Shared by every member of one team registration
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team_name: Option<String>,
    #[serde(default)]
    pub is_team_leader: bool,
}

impl Attendee {
    /// A confirmed free registration
    pub fn going(user_id: Uuid) -> Self {
        Self {
            user_id,
            status: AttendanceStatus::Going,
            payment_id: None,
            rsvp_date: Utc::now(),
            team_name: None,
            is_team_leader: false,
        }
    }

    /// A soft interest mark
    pub fn interested(user_id: Uuid) -> Self {
        Self {
            user_id,
            status: AttendanceStatus::Interested,
            payment_id: None,
            rsvp_date: Utc::now(),
            team_name: None,
            is_team_leader: false,
        }
    }

    /// A registration confirmed by a verified payment
    pub fn paid(user_id: Uuid, payment_id: Uuid) -> Self {
        Self {
            user_id,
            status: AttendanceStatus::Paid,
            payment_id: Some(payment_id),
            rsvp_date: Utc::now(),
            team_name: None,
            is_team_leader: false,
        }
    }

    fn team_member(user_id: Uuid, team_name: &str, is_team_leader: bool) -> Self {
        Self {
            user_id,
            status: AttendanceStatus::Going,
            payment_id: None,
            rsvp_date: Utc::now(),
            team_name: Some(team_name.to_string()),
            is_team_leader,
        }
    }

    /// The leader entry of a team registration
    pub fn team_leader(user_id: Uuid, team_name: &str) -> Self {
        Self::team_member(user_id, team_name, true)
    }

    /// A non-leader entry of a team registration
    pub fn teammate(user_id: Uuid, team_name: &str) -> Self {
        Self::team_member(user_id, team_name, false)
    }
}

/// Event entity - represents an event stored in MongoDB
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Event {
    /// Unique identifier (stored as _id in MongoDB)
    #[serde(rename = "_id", alias = "id")]
    pub id: Uuid,
    /// Event name
    pub name: String,
    /// Event description
    pub description: String,
    /// Image reference (URL or asset key)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// When the event takes place
    pub date: DateTime<Utc>,
    /// Venue
    pub location: String,
    /// Organizer display name
    pub organizer: String,
    /// Category label used by list filters
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Owning admin account
    pub account_id: Uuid,
    /// Owning club, when organized by a club
    #[serde(skip_serializing_if = "Option::is_none")]
    pub club_id: Option<Uuid>,
    /// Admin-set seat total
    pub capacity: u32,
    /// Derived seat count; recomputed inside every roster write
    pub available_seats: u32,
    /// Price in major currency units; 0 means free
    pub price: i64,
    pub currency: String,
    pub is_team_event: bool,
    /// Listed team price; informational in this core
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team_price: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_team_size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_team_size: Option<u32>,
    #[serde(default)]
    pub visibility: VisibilityPolicy,
    #[serde(default)]
    pub attendees: Vec<Attendee>,
    /// Optimistic-concurrency version; every roster write increments it
    pub revision: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Event {
    /// Create a new event from CreateEvent DTO
    pub fn new(input: CreateEvent, account_id: Uuid) -> Self {
        let now = Utc::now();
        let capacity = input.capacity;
        Self {
            id: Uuid::now_v7(),
            name: input.name,
            description: input.description,
            image: input.image,
            date: input.date,
            location: input.location,
            organizer: input.organizer,
            category: input.category,
            account_id,
            club_id: input.club_id,
            capacity,
            available_seats: capacity,
            price: input.price,
            currency: input.currency,
            is_team_event: input.is_team_event,
            team_price: input.team_price,
            min_team_size: input.min_team_size,
            max_team_size: input.max_team_size,
            visibility: input.visibility,
            attendees: Vec::new(),
            revision: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Price is the single source of truth; free means zero
    pub fn is_free(&self) -> bool {
        self.price == 0
    }

    /// Team size bounds, defaulting to single-member teams when unset
    pub fn team_size_bounds(&self) -> (u32, u32) {
        let min = self.min_team_size.unwrap_or(1).max(1);
        let max = self.max_team_size.unwrap_or(min).max(min);
        (min, max)
    }
}

fn default_currency() -> String {
    "INR".to_string()
}

/// DTO for creating a new event
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateEvent {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[serde(default)]
    #[validate(length(max = 2000))]
    pub description: String,
    pub image: Option<String>,
    pub date: DateTime<Utc>,
    #[validate(length(min = 1, max = 200))]
    pub location: String,
    #[validate(length(min = 1, max = 200))]
    pub organizer: String,
    pub category: Option<String>,
    pub club_id: Option<Uuid>,
    pub capacity: u32,
    #[validate(range(min = 0))]
    pub price: i64,
    #[serde(default = "default_currency")]
    #[validate(length(equal = 3))]
    pub currency: String,
    #[serde(default)]
    pub is_team_event: bool,
    #[validate(range(min = 0))]
    pub team_price: Option<i64>,
    #[validate(range(min = 1))]
    pub min_team_size: Option<u32>,
    #[validate(range(min = 1))]
    pub max_team_size: Option<u32>,
    #[serde(default)]
    pub visibility: VisibilityPolicy,
}

/// DTO for registering to a free event.
///
/// An empty body registers the acting user individually; team events
/// additionally require `team_name` and the teammates' campus emails.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct RsvpRequest {
    #[validate(length(min = 1, max = 100))]
    pub team_name: Option<String>,
    #[serde(default)]
    pub team_member_emails: Vec<String>,
}

/// Event type used by list filters
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
pub enum EventType {
    Individual,
    Team,
}

fn default_page() -> u32 {
    1
}

fn default_per_page() -> u32 {
    10
}

/// Query filters for listing events
#[derive(Debug, Clone, Deserialize, ToSchema, IntoParams)]
pub struct EventFilter {
    /// Filter by category label
    pub category: Option<String>,
    /// Filter by registration mode (individual or team)
    pub event_type: Option<EventType>,
    /// Only events on or after this instant
    pub date_from: Option<DateTime<Utc>>,
    /// Only events before this instant
    pub date_to: Option<DateTime<Utc>>,
    /// 1-based page number
    #[serde(default = "default_page")]
    pub page: u32,
    /// Page size (clamped to 100)
    #[serde(default = "default_per_page")]
    pub per_page: u32,
}

impl Default for EventFilter {
    fn default() -> Self {
        Self {
            category: None,
            event_type: None,
            date_from: None,
            date_to: None,
            page: default_page(),
            per_page: default_per_page(),
        }
    }
}

/// One page of visibility-filtered events
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EventPage {
    pub events: Vec<Event>,
    pub page: u32,
    pub total_pages: u32,
    pub total_count: u64,
}

/// The acting user's registration state on one event
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RegistrationResponse {
    pub registered: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attendee: Option<Attendee>,
}
