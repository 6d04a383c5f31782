//! Events Domain
//!
//! This module provides a complete domain implementation for campus events
//! using MongoDB: audience-scoped visibility, a seat ledger kept consistent
//! under concurrent registrations, and free RSVP with individual and team
//! paths.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  Handlers   │  ← HTTP endpoints
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Service   │  ← Authorization, validation, admission retries
//! └──────┬──────┘
//!        │         visibility ← policy gate + query predicate
//! ┌──────▼──────┐  capacity   ← pure roster arithmetic
//! │ Repository  │  ← Data access (trait + MongoDB implementation)
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Models    │  ← Entities, DTOs
//! └─────────────┘
//! ```
//!
//! Roster writes never mutate in place: the service plans the new roster,
//! then the repository applies it only if the event's revision is unchanged.
//!
//! # Usage
//!
//! ```rust,no_run
//! use domain_events::{
//!     handlers,
//!     mongodb::{MongoEventRepository, MongoUserDirectory},
//!     service::EventService,
//! };
//! use mongodb::Client;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! // Create a MongoDB client
//! let client = Client::with_uri_str("mongodb://localhost:27017").await?;
//! let db = client.database("campus");
//!
//! // Create the repository, directory, and service
//! let repository = MongoEventRepository::new(db.clone());
//! let directory = MongoUserDirectory::new(db);
//! let service = EventService::new(repository, directory);
//!
//! // Create Axum router
//! let router = handlers::router(service);
//! # Ok(())
//! # }
//! ```

pub mod capacity;
pub mod directory;
pub mod error;
pub mod handlers;
pub mod models;
pub mod mongodb;
pub mod repository;
pub mod service;
pub mod visibility;

// Re-export commonly used types
pub use error::{EventError, EventResult};
pub use handlers::ApiDoc;
pub use models::{
    AttendanceStatus, Attendee, CreateEvent, Event, EventFilter, EventPage, EventType,
    RegistrationResponse, RsvpRequest, VisibilityPolicy,
};
pub use mongodb::{MongoEventRepository, MongoUserDirectory};
pub use repository::EventRepository;
pub use service::EventService;
