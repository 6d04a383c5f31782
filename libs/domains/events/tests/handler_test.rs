//! Handler tests for the Events domain
//!
//! These tests verify that HTTP handlers work correctly:
//! - Identity headers are required and parsed
//! - Request deserialization (JSON → Rust structs)
//! - Response serialization (Rust structs → JSON)
//! - HTTP status codes, including authorization failures
//!
//! Unlike E2E tests, these test ONLY the events domain handlers,
//! not the full application with routing, CORS, etc.

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, request::Builder};
use axum_helpers::{Identity, Role};
use chrono::{Duration, Utc};
use domain_events::{
    CreateEvent, Event, EventService, MongoEventRepository, MongoUserDirectory,
    RegistrationResponse, VisibilityPolicy, handlers,
};
use http_body_util::BodyExt;
use serde_json::json;
use test_utils::TestMongo;
use tower::ServiceExt; // For oneshot()
use uuid::Uuid;

type TestService = EventService<MongoEventRepository, MongoUserDirectory>;

async fn setup() -> (TestMongo, TestService, Router) {
    let mongo = TestMongo::new().await;
    let db = mongo.database("campus_events_handlers");

    let repo = MongoEventRepository::new(db.clone());
    let directory = MongoUserDirectory::new(db);
    let service = EventService::new(repo, directory);
    let app = handlers::router(service.clone());

    (mongo, service, app)
}

fn admin() -> Identity {
    Identity {
        user_id: Uuid::new_v4(),
        role: Role::Admin,
        branch: None,
        clubs: vec![],
    }
}

// Request builder carrying gateway identity headers
fn authed(method: &str, uri: &str, role: &str, user_id: Uuid) -> Builder {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("x-user-id", user_id.to_string())
        .header("x-user-role", role)
}

// Helper to parse JSON response body
async fn json_body<T: serde::de::DeserializeOwned>(body: Body) -> T {
    let bytes = body.collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn create_body(name: &str, capacity: u32) -> Body {
    Body::from(
        serde_json::to_string(&json!({
            "name": name,
            "description": "Handler test event",
            "date": (Utc::now() + Duration::days(3)).to_rfc3339(),
            "location": "Main Hall",
            "organizer": "Student Affairs",
            "capacity": capacity,
            "price": 0
        }))
        .unwrap(),
    )
}

async fn seeded_event(service: &TestService, visibility: VisibilityPolicy) -> Event {
    let input = CreateEvent {
        name: "Seeded Event".to_string(),
        description: String::new(),
        image: None,
        date: Utc::now() + Duration::days(3),
        location: "Main Hall".to_string(),
        organizer: "Student Affairs".to_string(),
        category: None,
        club_id: None,
        capacity: 10,
        price: 0,
        currency: "INR".to_string(),
        is_team_event: false,
        team_price: None,
        min_team_size: None,
        max_team_size: None,
        visibility,
    };
    service.create_event(input, &admin()).await.unwrap()
}

#[tokio::test]
async fn test_create_event_as_admin_returns_201() {
    let (_mongo, _service, app) = setup().await;

    let request = authed("POST", "/", "admin", Uuid::new_v4())
        .header("content-type", "application/json")
        .body(create_body("Tech Talk", 30))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let event: Event = json_body(response.into_body()).await;
    assert_eq!(event.name, "Tech Talk");
    assert_eq!(event.available_seats, 30);
}

#[tokio::test]
async fn test_create_event_as_student_returns_403() {
    let (_mongo, _service, app) = setup().await;

    let request = authed("POST", "/", "student", Uuid::new_v4())
        .header("content-type", "application/json")
        .body(create_body("Not Allowed", 10))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_missing_identity_returns_401() {
    let (_mongo, service, app) = setup().await;
    let event = seeded_event(&service, VisibilityPolicy::All).await;

    let request = Request::builder()
        .method("GET")
        .uri(format!("/{}", event.id))
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_invalid_uuid_path_returns_400() {
    let (_mongo, _service, app) = setup().await;

    let request = authed("GET", "/not-a-uuid", "student", Uuid::new_v4())
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_rsvp_without_body_registers_individually() {
    let (_mongo, service, app) = setup().await;
    let event = seeded_event(&service, VisibilityPolicy::All).await;
    let user_id = Uuid::new_v4();

    let request = authed("POST", &format!("/{}/rsvp", event.id), "student", user_id)
        .body(Body::empty())
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let updated: Event = json_body(response.into_body()).await;
    assert_eq!(updated.attendees.len(), 1);
    assert_eq!(updated.attendees[0].user_id, user_id);
    assert_eq!(updated.available_seats, 9);

    // Registering again conflicts
    let request = authed("POST", &format!("/{}/rsvp", event.id), "student", user_id)
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_hidden_event_returns_403_for_student() {
    let (_mongo, service, app) = setup().await;
    let policy = VisibilityPolicy::Branch {
        branches: vec![Uuid::new_v4()],
    };
    let event = seeded_event(&service, policy).await;

    let request = authed("GET", &format!("/{}", event.id), "student", Uuid::new_v4())
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_unknown_event_returns_404() {
    let (_mongo, _service, app) = setup().await;

    let request = authed("GET", &format!("/{}", Uuid::new_v4()), "admin", Uuid::new_v4())
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_registration_state_roundtrip() {
    let (_mongo, service, app) = setup().await;
    let event = seeded_event(&service, VisibilityPolicy::All).await;
    let user_id = Uuid::new_v4();

    let rsvp = authed("POST", &format!("/{}/rsvp", event.id), "student", user_id)
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(rsvp).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let request = authed(
        "GET",
        &format!("/{}/registration", event.id),
        "student",
        user_id,
    )
    .body(Body::empty())
    .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let state: RegistrationResponse = json_body(response.into_body()).await;
    assert!(state.registered);
    assert_eq!(state.attendee.unwrap().user_id, user_id);
}

#[tokio::test]
async fn test_list_events_returns_page_shape() {
    let (_mongo, service, app) = setup().await;
    seeded_event(&service, VisibilityPolicy::All).await;
    seeded_event(&service, VisibilityPolicy::All).await;

    let request = authed("GET", "/?per_page=1", "student", Uuid::new_v4())
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let page: serde_json::Value = json_body(response.into_body()).await;
    assert_eq!(page["total_count"], 2);
    assert_eq!(page["total_pages"], 2);
    assert_eq!(page["events"].as_array().unwrap().len(), 1);
}
