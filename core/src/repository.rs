//! Persistence seams consumed by the booking service.
//!
//! The service never touches storage directly. It talks to three traits:
//!
//! - [`BookingRepository`]: sole reader/writer of booking rows
//! - [`EventDirectory`]: read-only event lookups
//! - [`VendorDirectory`]: read-only vendor lookups
//!
//! # Concurrency Contract
//!
//! Implementations are responsible for the invariants that an application-level
//! check cannot guarantee on its own:
//!
//! - `insert` rejects a second non-cancelled booking for the same
//!   `(event, vendor)` pair with [`BookingError::DuplicateBooking`].
//! - `update_status` to `confirmed` rejects a second confirmed booking for the
//!   same `(vendor, calendar day)` with [`BookingError::VendorUnavailable`].
//! - `update_status` and `delete` are compare-and-set on the status of the
//!   booking passed in. A lost race is reported as `Ok(None)` / `Ok(false)`,
//!   never as a silent overwrite.
//!
//! # Dyn Compatibility
//!
//! These traits return `Pin<Box<dyn Future>>` instead of using `async fn` so the
//! service can hold them as `Arc<dyn BookingRepository>`.
//!
//! # Implementations
//!
//! - `PostgresBookingRepository` and friends (in `eventify-postgres`)
//! - [`InMemoryStore`](crate::mocks::InMemoryStore) (feature `test-utils`)

use crate::error::Result;
use crate::types::{
    Booking, BookingId, BookingStatus, BookingView, Event, EventId, PageRequest, UserId, Vendor,
    VendorId,
};
use chrono::{DateTime, Utc};
use std::future::Future;
use std::pin::Pin;

/// Boxed future returned by repository operations.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + Send + 'a>>;

/// Storage for booking rows.
///
/// Every operation may fail with [`BookingError::StoreUnavailable`](crate::BookingError::StoreUnavailable).
pub trait BookingRepository: Send + Sync {
    /// Look up a booking by ID.
    fn find_by_id(&self, id: BookingId) -> StoreFuture<'_, Option<Booking>>;

    /// Look up a booking with its event and vendor details.
    fn find_view(&self, id: BookingId) -> StoreFuture<'_, Option<BookingView>>;

    /// The non-cancelled booking for an `(event, vendor)` pair, if any.
    fn find_by_event_and_vendor(
        &self,
        event_id: EventId,
        vendor_id: VendorId,
    ) -> StoreFuture<'_, Option<Booking>>;

    /// All `confirmed` bookings of a vendor, with `event_day` taken from the
    /// linked event.
    fn find_confirmed_by_vendor(&self, vendor_id: VendorId) -> StoreFuture<'_, Vec<Booking>>;

    /// One page of a user's bookings, newest first, plus the total match count.
    fn find_by_user(
        &self,
        user_id: UserId,
        status: Option<BookingStatus>,
        page: PageRequest,
    ) -> StoreFuture<'_, (Vec<BookingView>, u64)>;

    /// Status of every booking owned by a user (unpaginated).
    fn find_statuses_by_user(&self, user_id: UserId) -> StoreFuture<'_, Vec<BookingStatus>>;

    /// Persist a new booking.
    ///
    /// # Errors
    ///
    /// - `DuplicateBooking` if a non-cancelled booking exists for the pair
    /// - `EventNotFound` / `VendorNotFound` if a reference vanished
    fn insert(&self, booking: Booking) -> StoreFuture<'_, Booking>;

    /// Move `booking` from its current status to `next`, stamping `updated_at`.
    ///
    /// Returns `Ok(None)` if the stored status no longer equals `booking.status`.
    ///
    /// # Errors
    ///
    /// - `VendorUnavailable` if confirming would double-book the vendor's day
    fn update_status<'a>(
        &'a self,
        booking: &'a Booking,
        next: BookingStatus,
        at: DateTime<Utc>,
    ) -> StoreFuture<'a, Option<Booking>>;

    /// Remove `booking` if its stored status still equals `booking.status`.
    ///
    /// Returns `Ok(false)` if the row is gone or its status changed.
    fn delete<'a>(&'a self, booking: &'a Booking) -> StoreFuture<'a, bool>;
}

/// Read-only event lookups.
pub trait EventDirectory: Send + Sync {
    /// Look up an event by ID.
    fn find_event(&self, id: EventId) -> StoreFuture<'_, Option<Event>>;
}

/// Read-only vendor lookups.
pub trait VendorDirectory: Send + Sync {
    /// Look up a vendor by ID.
    fn find_vendor(&self, id: VendorId) -> StoreFuture<'_, Option<Vendor>>;
}
