//! Prometheus metrics.
//!
//! The booking service emits counters through the `metrics` facade; this
//! module describes them and installs the Prometheus exporter that serves
//! them at `http://{addr}/metrics`.

use eventify_core::service::{BOOKING_CONFLICTS_TOTAL, BOOKINGS_TOTAL};
use metrics::describe_counter;
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use thiserror::Error;

/// Errors from metrics setup.
#[derive(Error, Debug)]
pub enum MetricsError {
    /// Listener address did not parse
    #[error("Invalid metrics address {0}")]
    Address(String),
    /// Failed to install metrics exporter
    #[error("Failed to install metrics exporter: {0}")]
    Install(String),
}

/// Describe the booking counters.
pub fn register_booking_metrics() {
    describe_counter!(
        BOOKINGS_TOTAL,
        "Booking lifecycle outcomes (created, confirmed, completed, cancelled, deleted)"
    );
    describe_counter!(
        BOOKING_CONFLICTS_TOTAL,
        "Booking requests rejected by a conflict rule (duplicate, vendor_unavailable)"
    );
}

/// Install the Prometheus recorder with an HTTP listener on `addr`.
///
/// Must be called from within a Tokio runtime.
///
/// # Errors
///
/// [`MetricsError::Address`] for an unparsable address,
/// [`MetricsError::Install`] if a recorder is already installed or the
/// listener cannot start.
pub fn install_exporter(addr: &str) -> Result<(), MetricsError> {
    let addr: SocketAddr = addr
        .parse()
        .map_err(|_| MetricsError::Address(addr.to_string()))?;

    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| MetricsError::Install(e.to_string()))?;

    register_booking_metrics();
    tracing::info!(%addr, "Metrics available at http://{}/metrics", addr);
    Ok(())
}
