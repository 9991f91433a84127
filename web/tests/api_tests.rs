//! HTTP tests for the booking routes, driven through the full router against
//! the in-memory store.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use eventify_core::{Principal, UserId};
use eventify_testing::Scenario;
use eventify_web::{AppState, CORRELATION_ID_HEADER, StaticIdentityProvider, build_router};
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;

const OWNER_TOKEN: &str = "owner-token";
const STRANGER_TOKEN: &str = "stranger-token";

struct TestApp {
    scenario: Scenario,
    router: Router,
    owner: UserId,
}

impl TestApp {
    fn new() -> Self {
        let scenario = Scenario::new();
        let owner = UserId::new();
        let identity = StaticIdentityProvider::new()
            .with_token(
                OWNER_TOKEN,
                Principal {
                    user_id: owner,
                    email: Some("owner@example.com".to_string()),
                },
            )
            .with_token(
                STRANGER_TOKEN,
                Principal {
                    user_id: UserId::new(),
                    email: None,
                },
            );
        let state = AppState::new(scenario.service(), Arc::new(identity));

        Self {
            router: build_router(state, &[]),
            scenario,
            owner,
        }
    }

    async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, json)
    }

    /// Seed an event for the owner plus a vendor, and book it over HTTP.
    async fn booked(&self) -> (String, Value) {
        let event = self.scenario.event(self.owner, self.scenario.day(0));
        let vendor = self.scenario.vendor("caterer");
        let (status, body) = self
            .send(
                Method::POST,
                "/api/bookings",
                Some(OWNER_TOKEN),
                Some(json!({ "event_id": event.id, "vendor_id": vendor.id })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        let id = body["data"]["id"].as_str().unwrap().to_string();
        (id, body)
    }
}

#[tokio::test]
async fn health_is_public() {
    let app = TestApp::new();
    let (status, body) = app.send(Method::GET, "/health", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "OK");
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn booking_routes_require_a_valid_token() {
    let app = TestApp::new();

    let (status, body) = app.send(Method::GET, "/api/bookings", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "UNAUTHORIZED");

    let (status, _) = app
        .send(Method::GET, "/api/bookings", Some("forged"), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn create_returns_view_with_event_and_vendor() {
    let app = TestApp::new();
    let (_, body) = app.booked().await;

    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Booking created successfully");
    assert_eq!(body["data"]["status"], "pending");
    assert_eq!(body["data"]["user_id"], json!(app.owner));
    assert_eq!(body["data"]["event"]["title"], "Summer gala");
    assert_eq!(body["data"]["vendor"]["name"], "caterer");
}

#[tokio::test]
async fn duplicate_create_is_a_conflict() {
    let app = TestApp::new();
    let event = app.scenario.event(app.owner, app.scenario.day(0));
    let vendor = app.scenario.vendor("dj");
    let request = json!({ "event_id": event.id, "vendor_id": vendor.id });

    let (first, _) = app
        .send(Method::POST, "/api/bookings", Some(OWNER_TOKEN), Some(request.clone()))
        .await;
    let (second, body) = app
        .send(Method::POST, "/api/bookings", Some(OWNER_TOKEN), Some(request))
        .await;

    assert_eq!(first, StatusCode::CREATED);
    assert_eq!(second, StatusCode::CONFLICT);
    assert_eq!(body["code"], "DUPLICATE_BOOKING");
}

#[tokio::test]
async fn create_for_someone_elses_event_is_forbidden() {
    let app = TestApp::new();
    let event = app.scenario.event(app.owner, app.scenario.day(0));
    let vendor = app.scenario.vendor("florist");

    let (status, body) = app
        .send(
            Method::POST,
            "/api/bookings",
            Some(STRANGER_TOKEN),
            Some(json!({ "event_id": event.id, "vendor_id": vendor.id })),
        )
        .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "FORBIDDEN");
}

#[tokio::test]
async fn malformed_input_is_rejected_before_the_service() {
    let app = TestApp::new();

    let (status, body) = app
        .send(
            Method::POST,
            "/api/bookings",
            Some(OWNER_TOKEN),
            Some(json!({ "event_id": "not-a-uuid" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "BAD_REQUEST");

    let (status, _) = app
        .send(Method::GET, "/api/bookings/not-a-uuid", Some(OWNER_TOKEN), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    for query in ["page=0", "limit=0", "limit=101", "page=abc", "status=archived"] {
        let (status, _) = app
            .send(
                Method::GET,
                &format!("/api/bookings?{query}"),
                Some(OWNER_TOKEN),
                None,
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{query}");
    }
}

#[tokio::test]
async fn status_lifecycle_over_http() {
    let app = TestApp::new();
    let (id, _) = app.booked().await;
    let uri = format!("/api/bookings/{id}");

    let (status, body) = app
        .send(Method::PUT, &uri, Some(OWNER_TOKEN), Some(json!({ "status": "pending" })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_TRANSITION");
    assert_eq!(
        body["message"],
        "Cannot change booking status from pending to pending"
    );

    let (status, body) = app
        .send(Method::PUT, &uri, Some(OWNER_TOKEN), Some(json!({ "status": "confirmed" })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Booking status updated successfully");
    assert_eq!(body["data"]["status"], "confirmed");

    let (status, body) = app
        .send(Method::PUT, &uri, Some(OWNER_TOKEN), Some(json!({ "status": "pending" })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_TRANSITION");
    assert_eq!(
        body["message"],
        "Cannot change booking status from confirmed to pending"
    );

    let (status, _) = app
        .send(Method::PUT, &uri, Some(OWNER_TOKEN), Some(json!({ "status": "bogus" })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app.send(Method::DELETE, &uri, Some(OWNER_TOKEN), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "cancelled");
}

#[tokio::test]
async fn cancelling_pending_booking_deletes_it() {
    let app = TestApp::new();
    let (id, _) = app.booked().await;
    let uri = format!("/api/bookings/{id}");

    let (status, body) = app.send(Method::DELETE, &uri, Some(OWNER_TOKEN), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Booking cancelled successfully");
    assert!(body["data"].is_null());

    let (status, body) = app.send(Method::GET, &uri, Some(OWNER_TOKEN), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "BOOKING_NOT_FOUND");
}

#[tokio::test]
async fn second_confirmation_on_the_same_day_conflicts() {
    let app = TestApp::new();
    let vendor = app.scenario.vendor("band");
    let mut ids = Vec::new();
    for hour in [10, 18] {
        let event = app.scenario.event(
            app.owner,
            app.scenario.day(3) + chrono::Duration::hours(hour - 12),
        );
        let (_, body) = app
            .send(
                Method::POST,
                "/api/bookings",
                Some(OWNER_TOKEN),
                Some(json!({ "event_id": event.id, "vendor_id": vendor.id })),
            )
            .await;
        ids.push(body["data"]["id"].as_str().unwrap().to_string());
    }

    let confirm = json!({ "status": "confirmed" });
    let (first, _) = app
        .send(Method::PUT, &format!("/api/bookings/{}", ids[0]), Some(OWNER_TOKEN), Some(confirm.clone()))
        .await;
    let (second, body) = app
        .send(Method::PUT, &format!("/api/bookings/{}", ids[1]), Some(OWNER_TOKEN), Some(confirm))
        .await;

    assert_eq!(first, StatusCode::OK);
    assert_eq!(second, StatusCode::CONFLICT);
    assert_eq!(body["code"], "VENDOR_UNAVAILABLE");
}

#[tokio::test]
async fn bookings_are_private_to_their_owner() {
    let app = TestApp::new();
    let (id, _) = app.booked().await;

    let (status, _) = app
        .send(Method::GET, &format!("/api/bookings/{id}"), Some(STRANGER_TOKEN), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = app
        .send(Method::GET, "/api/bookings", Some(STRANGER_TOKEN), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], json!([]));
    assert_eq!(body["pagination"]["totalItems"], 0);
}

#[tokio::test]
async fn list_paginates_and_filters() {
    let app = TestApp::new();
    for i in 0..3 {
        let event = app.scenario.event(app.owner, app.scenario.day(i));
        let vendor = app.scenario.vendor(&format!("v{i}"));
        app.send(
            Method::POST,
            "/api/bookings",
            Some(OWNER_TOKEN),
            Some(json!({ "event_id": event.id, "vendor_id": vendor.id })),
        )
        .await;
    }

    let (status, body) = app
        .send(Method::GET, "/api/bookings?page=2&limit=2", Some(OWNER_TOKEN), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Bookings retrieved successfully");
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    assert_eq!(body["pagination"]["currentPage"], 2);
    assert_eq!(body["pagination"]["totalPages"], 2);
    assert_eq!(body["pagination"]["hasNextPage"], false);
    assert_eq!(body["pagination"]["prevPage"], 1);

    let (_, body) = app
        .send(Method::GET, "/api/bookings?status=confirmed", Some(OWNER_TOKEN), None)
        .await;
    assert_eq!(body["pagination"]["totalItems"], 0);
}

#[tokio::test]
async fn stats_count_by_status() {
    let app = TestApp::new();
    let (id, _) = app.booked().await;
    app.send(
        Method::PUT,
        &format!("/api/bookings/{id}"),
        Some(OWNER_TOKEN),
        Some(json!({ "status": "confirmed" })),
    )
    .await;
    app.booked().await;

    let (status, body) = app
        .send(Method::GET, "/api/bookings/stats", Some(OWNER_TOKEN), None)
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["data"],
        json!({ "total": 2, "pending": 1, "confirmed": 1, "completed": 0, "cancelled": 0 })
    );
}

#[tokio::test]
async fn store_outage_is_503() {
    let app = TestApp::new();
    app.scenario.store().set_unavailable(true);

    let (status, body) = app
        .send(Method::GET, "/api/bookings/stats", Some(OWNER_TOKEN), None)
        .await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["code"], "STORE_UNAVAILABLE");
}

#[tokio::test]
async fn unknown_routes_use_the_error_envelope() {
    let app = TestApp::new();
    let (status, body) = app.send(Method::GET, "/api/nope", None, None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn responses_carry_a_correlation_id() {
    let app = TestApp::new();
    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();

    assert!(response.headers().contains_key(CORRELATION_ID_HEADER));
}
