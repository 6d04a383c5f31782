use axum::{
    Json, Router,
    body::Bytes,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use axum_helpers::{
    Identity, UuidPath, ValidatedJson,
    errors::responses::{
        BadRequestUuidResponse, BadRequestValidationResponse, ConflictResponse,
        ForbiddenResponse, InternalServerErrorResponse, NotFoundResponse,
        ServiceUnavailableResponse, UnauthorizedResponse,
    },
};
use std::sync::Arc;
use utoipa::OpenApi;

use crate::directory::UserDirectory;
use crate::error::{EventError, EventResult};
use crate::models::{
    AttendanceStatus, Attendee, CreateEvent, Event, EventFilter, EventPage, EventType,
    RegistrationResponse, RsvpRequest, VisibilityPolicy,
};
use crate::repository::EventRepository;
use crate::service::EventService;

/// OpenAPI documentation for the Events API
#[derive(OpenApi)]
#[openapi(
    paths(
        list_events,
        create_event,
        get_event,
        rsvp_event,
        mark_interested,
        get_registration,
    ),
    components(
        schemas(
            Event,
            Attendee,
            AttendanceStatus,
            VisibilityPolicy,
            CreateEvent,
            RsvpRequest,
            EventType,
            EventFilter,
            EventPage,
            RegistrationResponse
        ),
        responses(
            NotFoundResponse,
            BadRequestValidationResponse,
            BadRequestUuidResponse,
            ConflictResponse,
            UnauthorizedResponse,
            ForbiddenResponse,
            ServiceUnavailableResponse,
            InternalServerErrorResponse
        )
    ),
    tags(
        (name = "Events", description = "Campus event endpoints (MongoDB)")
    )
)]
pub struct ApiDoc;

/// Create the events router with all HTTP endpoints
pub fn router<R: EventRepository + 'static, D: UserDirectory + 'static>(
    service: EventService<R, D>,
) -> Router {
    let shared_service = Arc::new(service);

    Router::new()
        .route("/", get(list_events).post(create_event))
        .route("/{id}", get(get_event))
        .route("/{id}/rsvp", post(rsvp_event))
        .route("/{id}/interested", post(mark_interested))
        .route("/{id}/registration", get(get_registration))
        .with_state(shared_service)
}

/// List events visible to the acting user
#[utoipa::path(
    get,
    path = "",
    tag = "Events",
    params(EventFilter),
    responses(
        (status = 200, description = "One page of visible events", body = EventPage),
        (status = 401, response = UnauthorizedResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_events<R: EventRepository, D: UserDirectory>(
    State(service): State<Arc<EventService<R, D>>>,
    identity: Identity,
    Query(filter): Query<EventFilter>,
) -> EventResult<Json<EventPage>> {
    let page = service.list_events(filter, &identity).await?;
    Ok(Json(page))
}

/// Create a new event
#[utoipa::path(
    post,
    path = "",
    tag = "Events",
    request_body = CreateEvent,
    responses(
        (status = 201, description = "Event created successfully", body = Event),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn create_event<R: EventRepository, D: UserDirectory>(
    State(service): State<Arc<EventService<R, D>>>,
    identity: Identity,
    ValidatedJson(input): ValidatedJson<CreateEvent>,
) -> EventResult<impl IntoResponse> {
    let event = service.create_event(input, &identity).await?;
    Ok((StatusCode::CREATED, Json(event)))
}

/// Get an event by ID
#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Events",
    params(
        ("id" = Uuid, Path, description = "Event ID")
    ),
    responses(
        (status = 200, description = "Event found", body = Event),
        (status = 400, response = BadRequestUuidResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_event<R: EventRepository, D: UserDirectory>(
    State(service): State<Arc<EventService<R, D>>>,
    identity: Identity,
    UuidPath(id): UuidPath,
) -> EventResult<Json<Event>> {
    let event = service.get_event(id, &identity).await?;
    Ok(Json(event))
}

/// Register for a free event
#[utoipa::path(
    post,
    path = "/{id}/rsvp",
    tag = "Events",
    params(
        ("id" = Uuid, Path, description = "Event ID")
    ),
    request_body = RsvpRequest,
    responses(
        (status = 200, description = "Registration confirmed", body = Event),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse),
        (status = 409, response = ConflictResponse),
        (status = 503, response = ServiceUnavailableResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn rsvp_event<R: EventRepository, D: UserDirectory>(
    State(service): State<Arc<EventService<R, D>>>,
    identity: Identity,
    UuidPath(id): UuidPath,
    body: Bytes,
) -> EventResult<Json<Event>> {
    // The body is optional: absent or empty registers the acting user
    // individually, team events send team_name and teammate emails
    let request: RsvpRequest = if body.is_empty() {
        RsvpRequest::default()
    } else {
        serde_json::from_slice(&body)
            .map_err(|e| EventError::Validation(format!("Invalid request body: {e}")))?
    };

    let event = service.rsvp(id, &identity, request).await?;
    Ok(Json(event))
}

/// Mark interest in an event
#[utoipa::path(
    post,
    path = "/{id}/interested",
    tag = "Events",
    params(
        ("id" = Uuid, Path, description = "Event ID")
    ),
    responses(
        (status = 200, description = "Interest recorded", body = Event),
        (status = 400, response = BadRequestUuidResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse),
        (status = 503, response = ServiceUnavailableResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn mark_interested<R: EventRepository, D: UserDirectory>(
    State(service): State<Arc<EventService<R, D>>>,
    identity: Identity,
    UuidPath(id): UuidPath,
) -> EventResult<Json<Event>> {
    let event = service.mark_interested(id, &identity).await?;
    Ok(Json(event))
}

/// The acting user's registration state on an event
#[utoipa::path(
    get,
    path = "/{id}/registration",
    tag = "Events",
    params(
        ("id" = Uuid, Path, description = "Event ID")
    ),
    responses(
        (status = 200, description = "Registration state", body = RegistrationResponse),
        (status = 400, response = BadRequestUuidResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_registration<R: EventRepository, D: UserDirectory>(
    State(service): State<Arc<EventService<R, D>>>,
    identity: Identity,
    UuidPath(id): UuidPath,
) -> EventResult<Json<RegistrationResponse>> {
    let registration = service.registration(id, &identity).await?;
    Ok(Json(registration))
}
