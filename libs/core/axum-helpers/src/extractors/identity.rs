//! Caller identity extractor for gateway-terminated authentication.
//!
//! Authentication happens at the edge: the API gateway validates the session
//! and forwards the caller's identity as trusted headers. Services behind the
//! gateway read those headers instead of re-verifying credentials.
//!
//! Expected headers:
//! - `x-user-id`: caller UUID (required)
//! - `x-user-role`: `student`, `admin`, or `super_admin` (required)
//! - `x-user-branch`: branch UUID (optional)
//! - `x-user-clubs`: comma-separated club UUIDs (optional)

use crate::errors::AppError;
use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, request::Parts},
    response::{IntoResponse, Response},
};
use uuid::Uuid;

/// Role forwarded by the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Student,
    Admin,
    SuperAdmin,
}

impl Role {
    fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "student" => Some(Role::Student),
            "admin" => Some(Role::Admin),
            "super_admin" => Some(Role::SuperAdmin),
            _ => None,
        }
    }
}

/// Authenticated caller identity.
///
/// # Example
/// ```ignore
/// use axum_helpers::extractors::Identity;
///
/// async fn whoami(identity: Identity) -> String {
///     format!("User: {}", identity.user_id)
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Identity {
    pub user_id: Uuid,
    pub role: Role,
    pub branch: Option<Uuid>,
    pub clubs: Vec<Uuid>,
}

impl Identity {
    /// Admins and super admins bypass audience restrictions.
    pub fn is_elevated(&self) -> bool {
        matches!(self.role, Role::Admin | Role::SuperAdmin)
    }

    /// Parses identity from gateway headers.
    ///
    /// Any malformed value is rejected outright rather than degraded to a
    /// weaker identity, so a broken gateway config cannot widen access.
    pub fn from_headers(headers: &HeaderMap) -> Result<Self, AppError> {
        let user_id = header_str(headers, "x-user-id")?
            .ok_or_else(|| AppError::Unauthorized("Missing x-user-id header".to_string()))?;
        let user_id = Uuid::parse_str(user_id)
            .map_err(|_| AppError::Unauthorized("Invalid x-user-id header".to_string()))?;

        let role = header_str(headers, "x-user-role")?
            .ok_or_else(|| AppError::Unauthorized("Missing x-user-role header".to_string()))?;
        let role = Role::parse(role)
            .ok_or_else(|| AppError::Unauthorized("Invalid x-user-role header".to_string()))?;

        let branch = match header_str(headers, "x-user-branch")? {
            Some(raw) => Some(
                Uuid::parse_str(raw)
                    .map_err(|_| AppError::Unauthorized("Invalid x-user-branch header".to_string()))?,
            ),
            None => None,
        };

        let clubs = match header_str(headers, "x-user-clubs")? {
            Some(raw) => raw
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(|s| {
                    Uuid::parse_str(s).map_err(|_| {
                        AppError::Unauthorized("Invalid x-user-clubs header".to_string())
                    })
                })
                .collect::<Result<Vec<_>, _>>()?,
            None => Vec::new(),
        };

        Ok(Identity {
            user_id,
            role,
            branch,
            clubs,
        })
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Result<Option<&'a str>, AppError> {
    match headers.get(name) {
        Some(value) => value
            .to_str()
            .map(Some)
            .map_err(|_| AppError::Unauthorized(format!("Invalid {} header", name))),
        None => Ok(None),
    }
}

impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Identity::from_headers(&parts.headers).map_err(|e| e.into_response())
    }
}
