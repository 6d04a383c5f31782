//! Utilities shared by every consumer of the store

pub mod retry;

pub use retry::{RetryConfig, retry, retry_with_backoff};
