//! # Eventify Core
//!
//! Booking domain for the Eventify marketplace: seekers create events and
//! book vendors for them.
//!
//! This crate provides:
//!
//! - **Types**: identifiers, `Booking`, `Event`, `Vendor`, read projections
//! - **Errors**: `BookingError`, the complete failure taxonomy
//! - **Repositories**: the storage seams (`BookingRepository`,
//!   `EventDirectory`, `VendorDirectory`)
//! - **Service**: `BookingService`, conflict detection and status transitions
//! - **Mocks**: an in-memory store (feature `test-utils`, on by default)
//!
//! ## Invariants
//!
//! - At most one non-cancelled booking per `(event, vendor)` pair
//! - At most one confirmed booking per `(vendor, calendar day)`
//! - Status moves only along `pending → {confirmed, cancelled}` and
//!   `confirmed → {completed, cancelled}`
//! - Only the event's owner may create, update or cancel its bookings
//!
//! ## Example
//!
//! ```ignore
//! use eventify_core::{BookingService, BookingStatus};
//!
//! let service = BookingService::new(bookings, events, vendors, clock);
//!
//! let view = service.create_booking(user_id, event_id, vendor_id).await?;
//! assert_eq!(view.booking.status, BookingStatus::Pending);
//!
//! service
//!     .update_booking_status(user_id, view.booking.id, BookingStatus::Confirmed)
//!     .await?;
//! ```

pub mod error;
pub mod repository;
pub mod service;
pub mod types;

#[cfg(feature = "test-utils")]
pub mod mocks;

pub use error::{BookingError, Result, UnknownStatus};
pub use repository::{BookingRepository, EventDirectory, StoreFuture, VendorDirectory};
pub use service::BookingService;
pub use types::{
    Booking, BookingId, BookingStats, BookingStatus, BookingView, Event, EventId, EventSummary,
    Page, PageRequest, Pagination, Principal, UserId, Vendor, VendorId, VendorSummary,
};

/// Environment module - injected dependencies that are not storage.
pub mod environment {
    use chrono::{DateTime, Utc};

    /// Clock trait - abstracts time operations for testability
    ///
    /// # Examples
    ///
    /// ```
    /// use eventify_core::environment::{Clock, SystemClock};
    ///
    /// let clock = SystemClock;
    /// let earlier = clock.now();
    /// assert!(clock.now() >= earlier);
    /// ```
    pub trait Clock: Send + Sync {
        /// Get the current time
        fn now(&self) -> DateTime<Utc>;
    }

    /// Wall-clock time.
    #[derive(Debug, Clone, Copy, Default)]
    pub struct SystemClock;

    impl Clock for SystemClock {
        fn now(&self) -> DateTime<Utc> {
            Utc::now()
        }
    }
}
