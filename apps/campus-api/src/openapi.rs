//! OpenAPI documentation configuration

use utoipa::OpenApi;

/// Combined OpenAPI documentation for all APIs
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Campus API",
        version = "0.1.0",
        description = "Campus events and payments REST API",
        license(name = "MIT")
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development server")
    ),
    nest(
        (path = "/api/events", api = domain_events::ApiDoc),
        (path = "/api/payments", api = domain_payments::ApiDoc)
    ),
    tags(
        (name = "Events", description = "Campus event endpoints (MongoDB)"),
        (name = "Payments", description = "Payment order and verification endpoints (Razorpay)")
    )
)]
pub struct ApiDoc;
