//! Application state for Axum handlers.

use crate::identity::IdentityProvider;
use eventify_core::BookingService;
use std::sync::Arc;

/// Application state shared across all HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    /// Booking domain service
    pub service: Arc<BookingService>,
    /// Bearer-token verifier
    pub identity: Arc<dyn IdentityProvider>,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(service: BookingService, identity: Arc<dyn IdentityProvider>) -> Self {
        Self {
            service: Arc::new(service),
            identity,
        }
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState").finish_non_exhaustive()
    }
}
