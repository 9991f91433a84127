//! Health check endpoint.
//!
//! Used by load balancers and monitoring systems to verify the process is up.
//! It does NOT check dependencies (database, identity provider).

use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Liveness payload.
#[derive(Debug, Serialize)]
pub struct Health {
    /// Always `"OK"`
    pub status: &'static str,
    /// Time the check was answered
    pub timestamp: DateTime<Utc>,
    /// Crate version
    pub version: &'static str,
}

/// `GET /health`
///
/// ```json
/// { "status": "OK", "timestamp": "2025-06-01T12:00:00Z", "version": "0.1.0" }
/// ```
#[allow(clippy::unused_async)]
pub async fn health_check() -> Json<Health> {
    Json(Health {
        status: "OK",
        timestamp: Utc::now(),
        version: env!("CARGO_PKG_VERSION"),
    })
}
