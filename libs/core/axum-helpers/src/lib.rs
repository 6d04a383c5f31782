//! Shared HTTP plumbing for the campus APIs.
//!
//! Domain crates bring their routers and error enums; this crate supplies
//! everything around them:
//!
//! - [`server`]: listener setup, OpenAPI UIs, health checks, graceful
//!   shutdown with a cleanup phase
//! - [`http`]: CORS and security-header middleware
//! - [`errors`]: [`AppError`], stable error codes, and the JSON error shape
//! - [`extractors`]: gateway [`Identity`], [`UuidPath`], [`ValidatedJson`]
//!
//! A binary typically composes its domain routers, wraps them with
//! [`create_router`](server::create_router), merges
//! [`health_router`](server::health_router), and hands the result to
//! [`create_production_app`](server::create_production_app).

pub mod errors;
pub mod extractors;
pub mod http;
pub mod server;

pub use server::{
    CleanupCoordinator, HealthCheckFuture, HealthResponse, ShutdownCoordinator, close_mongo,
    create_app, create_production_app, create_router, health_router, run_health_checks,
    shutdown_signal,
};

pub use http::{create_cors_layer, create_permissive_cors_layer, security_headers};

pub use errors::{AppError, ErrorCode, ErrorResponse};

pub use extractors::{Identity, Role, UuidPath, ValidatedJson};
