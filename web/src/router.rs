//! HTTP router.
//!
//! # Routes
//!
//! - `GET /health` - liveness
//! - `GET /api/bookings` - list the caller's bookings
//! - `POST /api/bookings` - create a booking
//! - `GET /api/bookings/stats` - per-status counts
//! - `GET /api/bookings/:id` - one booking
//! - `PUT /api/bookings/:id` - change status
//! - `DELETE /api/bookings/:id` - cancel

use crate::error::AppError;
use crate::handlers::{bookings, health_check};
use crate::middleware::correlation_id_layer;
use crate::state::AppState;
use axum::{
    Router,
    http::{HeaderValue, Method, Uri, header},
    routing::get,
};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Booking routes without middleware.
pub fn booking_router() -> Router<AppState> {
    Router::new()
        .route(
            "/api/bookings",
            get(bookings::list_bookings).post(bookings::create_booking),
        )
        .route("/api/bookings/stats", get(bookings::booking_stats))
        .route(
            "/api/bookings/:id",
            get(bookings::get_booking)
                .put(bookings::update_booking_status)
                .delete(bookings::cancel_booking),
        )
}

/// Full application router with CORS, tracing and correlation IDs.
///
/// An empty `allowed_origins` list allows any origin.
pub fn build_router(state: AppState, allowed_origins: &[String]) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .merge(booking_router())
        .fallback(|uri: Uri| async move { AppError::route_not_found(uri.path()) })
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(allowed_origins))
        .layer(correlation_id_layer())
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(%origin, "Ignoring malformed CORS origin");
                None
            }
        })
        .collect();

    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    if origins.is_empty() {
        layer.allow_origin(Any)
    } else {
        layer.allow_origin(AllowOrigin::list(origins))
    }
}
