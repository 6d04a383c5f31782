//! MongoDB connectivity for the campus services, plus shared retry helpers.
//!
//! # Features
//!
//! - `mongodb` (default): connection management and health checks
//! - `config`: load [`mongodb::MongoConfig`] from environment variables via
//!   `core_config::FromEnv`
//! - `all`: everything
//!
//! # Example
//!
//! ```ignore
//! use database::mongodb;
//!
//! let client = mongodb::connect("mongodb://localhost:27017").await?;
//! let events = client.database("campus").collection::<Document>("events");
//! ```

pub mod common;

#[cfg(feature = "mongodb")]
pub mod mongodb;

pub use common::{RetryConfig, retry, retry_with_backoff};
