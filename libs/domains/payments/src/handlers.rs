use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::post,
};
use axum_helpers::{
    Identity, ValidatedJson,
    errors::responses::{
        BadGatewayResponse, BadRequestValidationResponse, ConflictResponse,
        InternalServerErrorResponse, NotFoundResponse, ServiceUnavailableResponse,
        UnauthorizedResponse,
    },
};
use std::sync::Arc;
use utoipa::OpenApi;

use crate::error::PaymentResult;
use crate::gateway::PaymentGateway;
use crate::ledger::EventLedger;
use crate::models::{
    CreateOrderRequest, CreateOrderResponse, Payment, PaymentFor, PaymentStatus,
    VerifyPaymentRequest, VerifyPaymentResponse,
};
use crate::repository::PaymentRepository;
use crate::service::PaymentService;

/// OpenAPI documentation for the Payments API
#[derive(OpenApi)]
#[openapi(
    paths(create_order, verify_payment),
    components(
        schemas(
            Payment,
            PaymentStatus,
            PaymentFor,
            CreateOrderRequest,
            CreateOrderResponse,
            VerifyPaymentRequest,
            VerifyPaymentResponse
        ),
        responses(
            NotFoundResponse,
            BadRequestValidationResponse,
            ConflictResponse,
            UnauthorizedResponse,
            BadGatewayResponse,
            ServiceUnavailableResponse,
            InternalServerErrorResponse
        )
    ),
    tags(
        (name = "Payments", description = "Payment order and verification endpoints (Razorpay)")
    )
)]
pub struct ApiDoc;

/// Create the payments router with all HTTP endpoints
pub fn router<P, G, L>(service: PaymentService<P, G, L>) -> Router
where
    P: PaymentRepository + 'static,
    G: PaymentGateway + 'static,
    L: EventLedger + 'static,
{
    let shared_service = Arc::new(service);

    Router::new()
        .route("/orders", post(create_order))
        .route("/verify", post(verify_payment))
        .with_state(shared_service)
}

/// Create a payment order for a paid event
#[utoipa::path(
    post,
    path = "/orders",
    tag = "Payments",
    request_body = CreateOrderRequest,
    responses(
        (status = 201, description = "Gateway order created", body = CreateOrderResponse),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 404, response = NotFoundResponse),
        (status = 409, response = ConflictResponse),
        (status = 502, response = BadGatewayResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn create_order<P, G, L>(
    State(service): State<Arc<PaymentService<P, G, L>>>,
    identity: Identity,
    ValidatedJson(input): ValidatedJson<CreateOrderRequest>,
) -> PaymentResult<impl IntoResponse>
where
    P: PaymentRepository,
    G: PaymentGateway,
    L: EventLedger,
{
    let response = service.create_order(identity.user_id, input).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// Verify a gateway payment callback and claim the seat
#[utoipa::path(
    post,
    path = "/verify",
    tag = "Payments",
    request_body = VerifyPaymentRequest,
    responses(
        (status = 200, description = "Payment verified, seat claimed", body = VerifyPaymentResponse),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 404, response = NotFoundResponse),
        (status = 409, response = ConflictResponse),
        (status = 503, response = ServiceUnavailableResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn verify_payment<P, G, L>(
    State(service): State<Arc<PaymentService<P, G, L>>>,
    _identity: Identity,
    ValidatedJson(input): ValidatedJson<VerifyPaymentRequest>,
) -> PaymentResult<Json<VerifyPaymentResponse>>
where
    P: PaymentRepository,
    G: PaymentGateway,
    L: EventLedger,
{
    let receipt = service.verify_payment(input).await?;
    Ok(Json(receipt))
}
