//! Campus user directory
//!
//! Team registrations name teammates by campus email; this seam resolves
//! those emails to user ids. The Mongo-backed implementation lives in
//! [`crate::mongodb`].

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::EventResult;

/// A directory entry matched by email
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryUser {
    pub id: Uuid,
    pub email: String,
}

/// Resolves campus emails to users
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Look up every email in one query; unmatched emails are simply
    /// absent from the result, callers decide whether that is an error.
    async fn resolve_emails(&self, emails: &[String]) -> EventResult<Vec<DirectoryUser>>;
}
