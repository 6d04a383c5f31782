//! Connection management for the MongoDB store.

mod config;
mod connector;
mod health;

pub use config::MongoConfig;
pub use connector::{MongoError, connect, connect_from_config, connect_from_config_with_retry};
pub use health::check_health;

// Driver types callers need alongside the connector
pub use mongodb::{Client, Collection, Database};
