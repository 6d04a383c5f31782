//! Payments Domain
//!
//! Payment order workflow for paid campus events: create an order at the
//! gateway, verify the HMAC-signed callback, and claim the seat on a
//! verified payment.
//!
//! # Lifecycle
//!
//! ```text
//!            gateway confirms          signature valid
//! (no record) ───────────────▶ created ───────────────▶ paid ──▶ seat claimed
//!                                 │
//!                                 │  signature invalid
//!                                 ▼
//!                              failed (terminal)
//! ```
//!
//! No seat is held while a payment is open. Both settlements are one-way
//! and duplicate callbacks are answered from the stored record, so a
//! retried webhook can neither double-admit nor revive a failed payment.
//!
//! # Usage
//!
//! ```rust,no_run
//! use domain_events::{
//!     mongodb::{MongoEventRepository, MongoUserDirectory},
//!     service::EventService,
//! };
//! use domain_payments::{
//!     gateway::RazorpayGateway, handlers, mongodb::MongoPaymentRepository,
//!     service::PaymentService,
//! };
//! use mongodb::Client;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = Client::with_uri_str("mongodb://localhost:27017").await?;
//! let db = client.database("campus");
//!
//! // The events service doubles as the seat ledger
//! let events = EventService::new(
//!     MongoEventRepository::new(db.clone()),
//!     MongoUserDirectory::new(db.clone()),
//! );
//!
//! let service = PaymentService::new(
//!     MongoPaymentRepository::new(db),
//!     RazorpayGateway::new("rzp_test_key".into(), "secret".into()),
//!     events,
//!     "secret".to_string(),
//! );
//!
//! let router = handlers::router(service);
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod gateway;
pub mod handlers;
pub mod ledger;
pub mod models;
pub mod mongodb;
pub mod repository;
pub mod service;
pub mod signature;

// Re-export commonly used types
pub use error::{PaymentError, PaymentResult};
pub use gateway::{GatewayOrder, PaymentGateway, RazorpayGateway};
pub use handlers::ApiDoc;
pub use ledger::{EventLedger, EventPricing};
pub use models::{
    CreateOrderRequest, CreateOrderResponse, Payment, PaymentFor, PaymentStatus,
    VerifyPaymentRequest, VerifyPaymentResponse,
};
pub use mongodb::MongoPaymentRepository;
pub use repository::PaymentRepository;
pub use service::PaymentService;
