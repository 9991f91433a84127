//! Error types for booking operations.
//!
//! Expected outcomes (not found, forbidden, conflicts, illegal transitions)
//! are values of [`BookingError`], never panics, so callers and tests can
//! match on them directly.

use crate::types::{BookingId, BookingStatus, EventId, VendorId};
use chrono::NaiveDate;
use thiserror::Error;

/// Result type alias for booking operations.
pub type Result<T> = std::result::Result<T, BookingError>;

/// Failure modes of the booking service and its repositories.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BookingError {
    // ═══════════════════════════════════════════════════════════
    // Missing References
    // ═══════════════════════════════════════════════════════════

    /// Referenced event does not exist.
    #[error("Event {0} not found")]
    EventNotFound(EventId),

    /// Referenced vendor does not exist.
    #[error("Vendor {0} not found")]
    VendorNotFound(VendorId),

    /// Booking does not exist (or is not visible to the caller).
    #[error("Booking {0} not found")]
    BookingNotFound(BookingId),

    // ═══════════════════════════════════════════════════════════
    // Authorization
    // ═══════════════════════════════════════════════════════════

    /// Caller does not own the event the booking belongs to.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    // ═══════════════════════════════════════════════════════════
    // Conflicts
    // ═══════════════════════════════════════════════════════════

    /// A non-cancelled booking already exists for this event and vendor.
    #[error("Booking already exists for event {event_id} and vendor {vendor_id}")]
    DuplicateBooking {
        /// Event of the existing booking
        event_id: EventId,
        /// Vendor of the existing booking
        vendor_id: VendorId,
    },

    /// Vendor already holds a confirmed booking on this calendar date.
    #[error("Vendor {vendor_id} is not available on {date}")]
    VendorUnavailable {
        /// Contended vendor
        vendor_id: VendorId,
        /// Contended calendar date
        date: NaiveDate,
    },

    // ═══════════════════════════════════════════════════════════
    // Invalid Requests
    // ═══════════════════════════════════════════════════════════

    /// Requested status change is not an edge of the lifecycle graph.
    #[error("Cannot change booking status from {from} to {to}")]
    InvalidTransition {
        /// Current status
        from: BookingStatus,
        /// Requested status
        to: BookingStatus,
    },

    /// Page number or page size is zero.
    #[error("Invalid page request: page {page}, page size {page_size}")]
    InvalidPage {
        /// Requested page
        page: u32,
        /// Requested page size
        page_size: u32,
    },

    // ═══════════════════════════════════════════════════════════
    // System Errors
    // ═══════════════════════════════════════════════════════════

    /// Storage or transport failure. Safe to retry with backoff.
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),
}

impl BookingError {
    /// Returns `true` for missing events, vendors and bookings.
    ///
    /// # Examples
    ///
    /// ```
    /// # use eventify_core::{BookingError, BookingId};
    /// assert!(BookingError::BookingNotFound(BookingId::new()).is_not_found());
    /// assert!(!BookingError::Forbidden("not yours".into()).is_not_found());
    /// ```
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::EventNotFound(_) | Self::VendorNotFound(_) | Self::BookingNotFound(_)
        )
    }

    /// Returns `true` if the request lost against existing bookings.
    #[must_use]
    pub const fn is_conflict(&self) -> bool {
        matches!(self, Self::DuplicateBooking { .. } | Self::VendorUnavailable { .. })
    }

    /// Returns `true` if retrying the same request may succeed.
    ///
    /// Only storage failures are retryable; the service itself never retries.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::StoreUnavailable(_))
    }
}

/// A status string that is not one of `pending`, `confirmed`, `completed`, `cancelled`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Unknown booking status: {0}")]
pub struct UnknownStatus(pub String);
