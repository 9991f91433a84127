//! Booking service: conflict detection and lifecycle transitions.
//!
//! The service validates each request against ownership, existence, the
//! duplicate-pair rule, the vendor-day rule and the transition table, then
//! delegates the write to the [`BookingRepository`]. The repository enforces
//! the same conflict rules atomically, so two concurrent writers cannot both
//! pass a check and both write.
//!
//! # Availability Policy
//!
//! Only `confirmed` bookings hold a vendor's calendar date. `pending` bookings
//! never block other seekers; the first booking to be confirmed wins, and the
//! vendor-day rule is checked again at `pending → confirmed`.
//!
//! # Lost Races
//!
//! Status writes are compare-and-set. When one loses, the service re-reads the
//! row and re-evaluates the request against the fresh status. The lifecycle
//! graph is acyclic, so this settles in at most two rounds.

use crate::environment::Clock;
use crate::error::{BookingError, Result};
use crate::repository::{BookingRepository, EventDirectory, VendorDirectory};
use crate::types::{
    Booking, BookingId, BookingStats, BookingStatus, BookingView, Event, EventId, Page,
    PageRequest, Pagination, UserId, VendorId,
};
use chrono::NaiveDate;
use std::sync::Arc;

/// Metric: bookings by lifecycle outcome.
pub const BOOKINGS_TOTAL: &str = "eventify_bookings_total";

/// Metric: requests rejected by a conflict rule.
pub const BOOKING_CONFLICTS_TOTAL: &str = "eventify_booking_conflicts_total";

/// Booking domain service.
///
/// Cheap to clone; all collaborators are shared.
#[derive(Clone)]
pub struct BookingService {
    bookings: Arc<dyn BookingRepository>,
    events: Arc<dyn EventDirectory>,
    vendors: Arc<dyn VendorDirectory>,
    clock: Arc<dyn Clock>,
}

impl BookingService {
    /// Create a new booking service.
    #[must_use]
    pub fn new(
        bookings: Arc<dyn BookingRepository>,
        events: Arc<dyn EventDirectory>,
        vendors: Arc<dyn VendorDirectory>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            bookings,
            events,
            vendors,
            clock,
        }
    }

    /// Book `vendor_id` for the caller's event `event_id`.
    ///
    /// Checks run in order and fail fast: event exists, caller owns it,
    /// vendor exists, no active booking for the pair, vendor not confirmed
    /// elsewhere on the event's calendar date. The new booking is `pending`.
    ///
    /// # Errors
    ///
    /// `EventNotFound`, `Forbidden`, `VendorNotFound`, `DuplicateBooking`,
    /// `VendorUnavailable`, `StoreUnavailable`.
    #[tracing::instrument(skip(self))]
    pub async fn create_booking(
        &self,
        user_id: UserId,
        event_id: EventId,
        vendor_id: VendorId,
    ) -> Result<BookingView> {
        let event = self
            .events
            .find_event(event_id)
            .await?
            .ok_or(BookingError::EventNotFound(event_id))?;

        if event.owner_id != user_id {
            return Err(BookingError::Forbidden(
                "You can only create bookings for your own events".to_string(),
            ));
        }

        let vendor = self
            .vendors
            .find_vendor(vendor_id)
            .await?
            .ok_or(BookingError::VendorNotFound(vendor_id))?;

        if self
            .bookings
            .find_by_event_and_vendor(event_id, vendor_id)
            .await?
            .is_some()
        {
            record_conflict("duplicate");
            return Err(BookingError::DuplicateBooking { event_id, vendor_id });
        }

        self.ensure_vendor_free(vendor_id, event.calendar_day(), None)
            .await?;

        let booking = Booking::pending(&event, vendor_id, user_id, self.clock.now());
        let booking = self.bookings.insert(booking).await.inspect_err(|e| {
            if e.is_conflict() {
                record_conflict("duplicate");
            }
        })?;

        metrics::counter!(BOOKINGS_TOTAL, "outcome" => "created").increment(1);
        tracing::info!(booking_id = %booking.id, "Booking created");

        Ok(BookingView::new(booking, &event, &vendor))
    }

    /// Move a booking to `new_status`.
    ///
    /// Requesting the booking's current status is a no-op success, except for
    /// `pending`, which no transition leads to. Confirming re-checks that the vendor is free on the event's calendar date.
    ///
    /// # Errors
    ///
    /// `BookingNotFound`, `Forbidden`, `InvalidTransition`,
    /// `VendorUnavailable`, `StoreUnavailable`.
    #[tracing::instrument(skip(self))]
    pub async fn update_booking_status(
        &self,
        user_id: UserId,
        booking_id: BookingId,
        new_status: BookingStatus,
    ) -> Result<BookingView> {
        let (mut booking, event) = self
            .load_owned(
                user_id,
                booking_id,
                "You can only update bookings for your own events",
            )
            .await?;

        loop {
            if booking.status == new_status && new_status.is_reachable() {
                return self.view_of(booking.id).await;
            }

            if !booking.status.can_transition_to(new_status) {
                return Err(BookingError::InvalidTransition {
                    from: booking.status,
                    to: new_status,
                });
            }

            if new_status == BookingStatus::Confirmed {
                self.ensure_vendor_free(booking.vendor_id, event.calendar_day(), Some(booking.id))
                    .await?;
            }

            let written = self
                .bookings
                .update_status(&booking, new_status, self.clock.now())
                .await
                .inspect_err(|e| {
                    if e.is_conflict() {
                        record_conflict("vendor_unavailable");
                    }
                })?;

            if let Some(updated) = written {
                metrics::counter!(BOOKINGS_TOTAL, "outcome" => new_status.as_str()).increment(1);
                tracing::info!(
                    booking_id = %updated.id,
                    from = %booking.status,
                    to = %updated.status,
                    "Booking status updated"
                );
                return self.view_of(updated.id).await;
            }

            tracing::debug!(%booking_id, "Booking changed concurrently, re-evaluating");
            booking = self.reload(booking_id).await?;
        }
    }

    /// Cancel a booking.
    ///
    /// A `pending` booking is deleted and `Ok(None)` is returned. A `confirmed`
    /// booking is kept with status `cancelled`. Cancelling an already
    /// cancelled booking returns it unchanged.
    ///
    /// # Errors
    ///
    /// `BookingNotFound`, `Forbidden`, `InvalidTransition` (completed),
    /// `StoreUnavailable`.
    #[tracing::instrument(skip(self))]
    pub async fn cancel_booking(
        &self,
        user_id: UserId,
        booking_id: BookingId,
    ) -> Result<Option<BookingView>> {
        let (mut booking, _event) = self
            .load_owned(
                user_id,
                booking_id,
                "You can only cancel bookings for your own events",
            )
            .await?;

        loop {
            match booking.status {
                BookingStatus::Completed => {
                    return Err(BookingError::InvalidTransition {
                        from: BookingStatus::Completed,
                        to: BookingStatus::Cancelled,
                    });
                }
                BookingStatus::Cancelled => return self.view_of(booking.id).await.map(Some),
                BookingStatus::Pending => {
                    if self.bookings.delete(&booking).await? {
                        metrics::counter!(BOOKINGS_TOTAL, "outcome" => "deleted").increment(1);
                        tracing::info!(%booking_id, "Pending booking deleted");
                        return Ok(None);
                    }
                }
                BookingStatus::Confirmed => {
                    let written = self
                        .bookings
                        .update_status(&booking, BookingStatus::Cancelled, self.clock.now())
                        .await?;
                    if let Some(updated) = written {
                        metrics::counter!(BOOKINGS_TOTAL, "outcome" => "cancelled").increment(1);
                        tracing::info!(%booking_id, "Confirmed booking cancelled");
                        return self.view_of(updated.id).await.map(Some);
                    }
                }
            }

            tracing::debug!(%booking_id, "Booking changed concurrently, re-evaluating");
            match self.bookings.find_by_id(booking_id).await? {
                Some(fresh) => booking = fresh,
                // Deleted by a concurrent cancel: same end state.
                None => return Ok(None),
            }
        }
    }

    /// Fetch one of the caller's bookings.
    ///
    /// # Errors
    ///
    /// `BookingNotFound` if it does not exist or belongs to someone else.
    #[tracing::instrument(skip(self))]
    pub async fn get_booking(&self, user_id: UserId, booking_id: BookingId) -> Result<BookingView> {
        match self.bookings.find_view(booking_id).await? {
            Some(view) if view.booking.user_id == user_id => Ok(view),
            _ => Err(BookingError::BookingNotFound(booking_id)),
        }
    }

    /// List the caller's bookings, newest first.
    ///
    /// # Errors
    ///
    /// `InvalidPage` for a zero page or page size, `StoreUnavailable`.
    #[tracing::instrument(skip(self))]
    pub async fn list_user_bookings(
        &self,
        user_id: UserId,
        status: Option<BookingStatus>,
        page: u32,
        page_size: u32,
    ) -> Result<Page<BookingView>> {
        let request = PageRequest::new(page, page_size)?;
        let (items, total_items) = self.bookings.find_by_user(user_id, status, request).await?;

        Ok(Page {
            items,
            pagination: Pagination::new(request, total_items),
        })
    }

    /// Count the caller's bookings by status.
    ///
    /// # Errors
    ///
    /// `StoreUnavailable`.
    #[tracing::instrument(skip(self))]
    pub async fn get_booking_stats(&self, user_id: UserId) -> Result<BookingStats> {
        let statuses = self.bookings.find_statuses_by_user(user_id).await?;
        Ok(BookingStats::from_statuses(statuses))
    }

    /// Load a booking and its event, and check the caller owns the event.
    async fn load_owned(
        &self,
        user_id: UserId,
        booking_id: BookingId,
        denial: &str,
    ) -> Result<(Booking, Event)> {
        let booking = self.reload(booking_id).await?;

        let event = self
            .events
            .find_event(booking.event_id)
            .await?
            .ok_or(BookingError::EventNotFound(booking.event_id))?;

        if event.owner_id != user_id {
            return Err(BookingError::Forbidden(denial.to_string()));
        }

        Ok((booking, event))
    }

    async fn reload(&self, booking_id: BookingId) -> Result<Booking> {
        self.bookings
            .find_by_id(booking_id)
            .await?
            .ok_or(BookingError::BookingNotFound(booking_id))
    }

    async fn view_of(&self, booking_id: BookingId) -> Result<BookingView> {
        self.bookings
            .find_view(booking_id)
            .await?
            .ok_or(BookingError::BookingNotFound(booking_id))
    }

    /// Fail if another confirmed booking holds `vendor_id` on `day`.
    async fn ensure_vendor_free(
        &self,
        vendor_id: VendorId,
        day: NaiveDate,
        except: Option<BookingId>,
    ) -> Result<()> {
        let confirmed = self.bookings.find_confirmed_by_vendor(vendor_id).await?;

        let taken = confirmed
            .iter()
            .any(|other| Some(other.id) != except && other.event_day == day);

        if taken {
            record_conflict("vendor_unavailable");
            return Err(BookingError::VendorUnavailable {
                vendor_id,
                date: day,
            });
        }

        Ok(())
    }
}

fn record_conflict(kind: &'static str) {
    metrics::counter!(BOOKING_CONFLICTS_TOTAL, "kind" => kind).increment(1);
}
