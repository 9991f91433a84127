//! HTTP API for the Eventify booking service.
//!
//! The web layer is a thin shell around
//! [`BookingService`](eventify_core::BookingService):
//!
//! 1. **Authenticate**: the bearer token is verified by an [`IdentityProvider`]
//! 2. **Validate** ids, status strings and paging before the core is called
//! 3. **Call** the service with the verified user id
//! 4. **Map** the result to [`ApiResponse`] or the error to [`AppError`]
//!
//! # Example
//!
//! ```ignore
//! use eventify_web::{AppState, StaticIdentityProvider, build_router};
//!
//! let state = AppState::new(service, Arc::new(StaticIdentityProvider::new()));
//! let app = build_router(state, &[]);
//! axum::serve(listener, app).await?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod identity;
pub mod metrics;
pub mod middleware;
pub mod response;
pub mod router;
pub mod state;

// Re-export key types for convenience
pub use config::Config;
pub use error::AppError;
pub use extractors::{AuthenticatedUser, BearerToken, CorrelationId};
pub use identity::{
    IdentityError, IdentityProvider, StaticIdentityProvider, SupabaseIdentityProvider,
};
pub use middleware::{CORRELATION_ID_HEADER, CorrelationIdExt, correlation_id_layer};
pub use response::ApiResponse;
pub use router::{booking_router, build_router};
pub use state::AppState;

/// Result type alias for web handlers.
pub type WebResult<T> = Result<T, AppError>;
