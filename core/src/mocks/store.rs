//! In-memory store implementing all three repository traits.
//!
//! A single lock guards events, vendors and bookings, so each operation is
//! atomic and the uniqueness rules hold under concurrent callers exactly as
//! the partial unique indexes do in Postgres.

use crate::error::{BookingError, Result};
use crate::repository::{BookingRepository, EventDirectory, StoreFuture, VendorDirectory};
use crate::types::{
    Booking, BookingId, BookingStatus, BookingView, Event, EventId, PageRequest, UserId, Vendor,
    VendorId,
};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Default)]
struct Tables {
    events: HashMap<EventId, Event>,
    vendors: HashMap<VendorId, Vendor>,
    /// Insertion order; newest last.
    bookings: Vec<Booking>,
    unavailable: bool,
}

impl Tables {
    fn view(&self, booking: &Booking) -> Option<BookingView> {
        let event = self.events.get(&booking.event_id)?;
        let vendor = self.vendors.get(&booking.vendor_id)?;
        Some(BookingView::new(booking.clone(), event, vendor))
    }

    fn position(&self, id: BookingId) -> Option<usize> {
        self.bookings.iter().position(|b| b.id == id)
    }

    /// Calendar day of the booking's event as currently stored.
    fn live_day(&self, booking: &Booking) -> chrono::NaiveDate {
        self.events
            .get(&booking.event_id)
            .map_or(booking.event_day, Event::calendar_day)
    }
}

/// Mock store.
///
/// Uses in-memory storage for testing. Clones share the same tables.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl InMemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Tables>> {
        let guard = self
            .tables
            .lock()
            .map_err(|_| BookingError::StoreUnavailable("store lock poisoned".to_string()))?;
        if guard.unavailable {
            return Err(BookingError::StoreUnavailable(
                "store marked unavailable".to_string(),
            ));
        }
        Ok(guard)
    }

    /// Add or replace an event.
    ///
    /// # Errors
    ///
    /// Returns `StoreUnavailable` if the store is marked unavailable.
    pub fn put_event(&self, event: Event) -> Result<()> {
        self.lock()?.events.insert(event.id, event);
        Ok(())
    }

    /// Add or replace a vendor.
    ///
    /// # Errors
    ///
    /// Returns `StoreUnavailable` if the store is marked unavailable.
    pub fn put_vendor(&self, vendor: Vendor) -> Result<()> {
        self.lock()?.vendors.insert(vendor.id, vendor);
        Ok(())
    }

    /// Simulate a storage outage: every call fails with `StoreUnavailable`
    /// until reset.
    pub fn set_unavailable(&self, unavailable: bool) {
        // Bypass `lock()` so an unavailable store can be restored.
        if let Ok(mut tables) = self.tables.lock() {
            tables.unavailable = unavailable;
        }
    }

    /// Snapshot of every stored booking, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `StoreUnavailable` if the store is marked unavailable.
    pub fn bookings(&self) -> Result<Vec<Booking>> {
        Ok(self.lock()?.bookings.clone())
    }
}

impl EventDirectory for InMemoryStore {
    fn find_event(&self, id: EventId) -> StoreFuture<'_, Option<Event>> {
        Box::pin(async move { Ok(self.lock()?.events.get(&id).cloned()) })
    }
}

impl VendorDirectory for InMemoryStore {
    fn find_vendor(&self, id: VendorId) -> StoreFuture<'_, Option<Vendor>> {
        Box::pin(async move { Ok(self.lock()?.vendors.get(&id).cloned()) })
    }
}

impl BookingRepository for InMemoryStore {
    fn find_by_id(&self, id: BookingId) -> StoreFuture<'_, Option<Booking>> {
        Box::pin(async move {
            let tables = self.lock()?;
            Ok(tables.bookings.iter().find(|b| b.id == id).cloned())
        })
    }

    fn find_view(&self, id: BookingId) -> StoreFuture<'_, Option<BookingView>> {
        Box::pin(async move {
            let tables = self.lock()?;
            Ok(tables
                .bookings
                .iter()
                .find(|b| b.id == id)
                .and_then(|b| tables.view(b)))
        })
    }

    fn find_by_event_and_vendor(
        &self,
        event_id: EventId,
        vendor_id: VendorId,
    ) -> StoreFuture<'_, Option<Booking>> {
        Box::pin(async move {
            let tables = self.lock()?;
            Ok(tables
                .bookings
                .iter()
                .find(|b| b.event_id == event_id && b.vendor_id == vendor_id && b.is_active())
                .cloned())
        })
    }

    fn find_confirmed_by_vendor(&self, vendor_id: VendorId) -> StoreFuture<'_, Vec<Booking>> {
        Box::pin(async move {
            let tables = self.lock()?;
            Ok(tables
                .bookings
                .iter()
                .filter(|b| b.vendor_id == vendor_id && b.status == BookingStatus::Confirmed)
                .map(|b| Booking {
                    event_day: tables.live_day(b),
                    ..b.clone()
                })
                .collect())
        })
    }

    fn find_by_user(
        &self,
        user_id: UserId,
        status: Option<BookingStatus>,
        page: PageRequest,
    ) -> StoreFuture<'_, (Vec<BookingView>, u64)> {
        Box::pin(async move {
            let tables = self.lock()?;

            // Newest first: reverse insertion order, then a stable sort keeps
            // later inserts ahead of earlier ones with equal timestamps.
            let mut matching: Vec<&Booking> = tables
                .bookings
                .iter()
                .rev()
                .filter(|b| b.user_id == user_id && status.is_none_or(|s| b.status == s))
                .collect();
            matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));

            let total = matching.len() as u64;
            let offset = usize::try_from(page.offset()).unwrap_or(usize::MAX);
            let items = matching
                .into_iter()
                .skip(offset)
                .take(page.page_size() as usize)
                .filter_map(|b| tables.view(b))
                .collect();

            Ok((items, total))
        })
    }

    fn find_statuses_by_user(&self, user_id: UserId) -> StoreFuture<'_, Vec<BookingStatus>> {
        Box::pin(async move {
            let tables = self.lock()?;
            Ok(tables
                .bookings
                .iter()
                .filter(|b| b.user_id == user_id)
                .map(|b| b.status)
                .collect())
        })
    }

    fn insert(&self, booking: Booking) -> StoreFuture<'_, Booking> {
        Box::pin(async move {
            let mut tables = self.lock()?;

            if !tables.events.contains_key(&booking.event_id) {
                return Err(BookingError::EventNotFound(booking.event_id));
            }
            if !tables.vendors.contains_key(&booking.vendor_id) {
                return Err(BookingError::VendorNotFound(booking.vendor_id));
            }

            let duplicate = tables.bookings.iter().any(|b| {
                b.event_id == booking.event_id && b.vendor_id == booking.vendor_id && b.is_active()
            });
            if duplicate && booking.is_active() {
                return Err(BookingError::DuplicateBooking {
                    event_id: booking.event_id,
                    vendor_id: booking.vendor_id,
                });
            }

            tables.bookings.push(booking.clone());
            Ok(booking)
        })
    }

    fn update_status<'a>(
        &'a self,
        booking: &'a Booking,
        next: BookingStatus,
        at: DateTime<Utc>,
    ) -> StoreFuture<'a, Option<Booking>> {
        Box::pin(async move {
            let mut tables = self.lock()?;

            let Some(index) = tables.position(booking.id) else {
                return Ok(None);
            };
            if tables.bookings[index].status != booking.status {
                return Ok(None);
            }

            if next == BookingStatus::Confirmed {
                let day = tables.live_day(&tables.bookings[index]);
                let vendor_id = tables.bookings[index].vendor_id;
                let taken = tables.bookings.iter().any(|b| {
                    b.id != booking.id
                        && b.vendor_id == vendor_id
                        && b.status == BookingStatus::Confirmed
                        && tables.live_day(b) == day
                });
                if taken {
                    return Err(BookingError::VendorUnavailable {
                        vendor_id,
                        date: day,
                    });
                }
            }

            let stored = &mut tables.bookings[index];
            stored.status = next;
            stored.updated_at = at;
            Ok(Some(stored.clone()))
        })
    }

    fn delete<'a>(&'a self, booking: &'a Booking) -> StoreFuture<'a, bool> {
        Box::pin(async move {
            let mut tables = self.lock()?;

            match tables.position(booking.id) {
                Some(index) if tables.bookings[index].status == booking.status => {
                    tables.bookings.remove(index);
                    Ok(true)
                }
                _ => Ok(false),
            }
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixture() -> (InMemoryStore, Event, Vendor) {
        let store = InMemoryStore::new();
        let event = Event {
            id: EventId::new(),
            title: "Garden wedding".to_string(),
            description: None,
            date: Utc.with_ymd_and_hms(2025, 12, 1, 15, 0, 0).unwrap(),
            location: "Porto".to_string(),
            category: "wedding".to_string(),
            owner_id: UserId::new(),
        };
        let vendor = Vendor {
            id: VendorId::new(),
            name: "Bloom & Co".to_string(),
            category: "florist".to_string(),
            rating: Some(4.5),
            image_url: None,
        };
        store.put_event(event.clone()).unwrap();
        store.put_vendor(vendor.clone()).unwrap();
        (store, event, vendor)
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn insert_rejects_second_active_pair() {
        let (store, event, vendor) = fixture();
        let first = Booking::pending(&event, vendor.id, event.owner_id, now());
        store.insert(first).await.unwrap();

        let second = Booking::pending(&event, vendor.id, event.owner_id, now());
        let err = store.insert(second).await.unwrap_err();
        assert!(matches!(err, BookingError::DuplicateBooking { .. }));
    }

    #[tokio::test]
    async fn insert_checks_references() {
        let (store, event, _vendor) = fixture();
        let orphan = Booking::pending(&event, VendorId::new(), event.owner_id, now());
        let err = store.insert(orphan).await.unwrap_err();
        assert!(matches!(err, BookingError::VendorNotFound(_)));
    }

    #[tokio::test]
    async fn update_is_compare_and_set() {
        let (store, event, vendor) = fixture();
        let booking = store
            .insert(Booking::pending(&event, vendor.id, event.owner_id, now()))
            .await
            .unwrap();

        let confirmed = store
            .update_status(&booking, BookingStatus::Confirmed, now())
            .await
            .unwrap();
        assert_eq!(confirmed.unwrap().status, BookingStatus::Confirmed);

        // `booking` still says pending; the stored row does not.
        let stale = store
            .update_status(&booking, BookingStatus::Cancelled, now())
            .await
            .unwrap();
        assert!(stale.is_none());
        assert!(!store.delete(&booking).await.unwrap());
    }

    #[tokio::test]
    async fn second_confirmation_on_same_day_is_rejected() {
        let (store, event, vendor) = fixture();
        let other_event = Event {
            id: EventId::new(),
            owner_id: UserId::new(),
            date: event.date + chrono::Duration::hours(3),
            ..event.clone()
        };
        store.put_event(other_event.clone()).unwrap();

        let a = store
            .insert(Booking::pending(&event, vendor.id, event.owner_id, now()))
            .await
            .unwrap();
        let b = store
            .insert(Booking::pending(&other_event, vendor.id, other_event.owner_id, now()))
            .await
            .unwrap();

        store
            .update_status(&a, BookingStatus::Confirmed, now())
            .await
            .unwrap();
        let err = store
            .update_status(&b, BookingStatus::Confirmed, now())
            .await
            .unwrap_err();
        assert!(matches!(err, BookingError::VendorUnavailable { .. }));
    }

    #[tokio::test]
    async fn unavailable_store_fails_every_call() {
        let (store, event, _vendor) = fixture();
        store.set_unavailable(true);
        let err = store.find_event(event.id).await.unwrap_err();
        assert!(err.is_retryable());

        store.set_unavailable(false);
        assert!(store.find_event(event.id).await.unwrap().is_some());
    }
}
