//! Test helpers and scenario builders.

use crate::mocks::{TickingClock, test_clock};
use chrono::{DateTime, Duration, TimeZone, Utc};
use eventify_core::environment::Clock;
use eventify_core::mocks::InMemoryStore;
use eventify_core::{BookingService, Event, EventId, UserId, Vendor, VendorId};
use std::sync::Arc;

/// A seeded in-memory world for service tests.
///
/// Events and vendors are written straight into the store; bookings go
/// through the [`BookingService`] returned by [`Scenario::service`]. Every
/// service built from the same scenario shares one store.
#[derive(Clone)]
pub struct Scenario {
    store: InMemoryStore,
    clock: Arc<dyn Clock>,
}

impl Default for Scenario {
    fn default() -> Self {
        Self::new()
    }
}

impl Scenario {
    /// Empty store, clock ticking one second per read from 2025-01-01.
    #[must_use]
    pub fn new() -> Self {
        Self::with_clock(Arc::new(TickingClock::new(
            test_clock().now(),
            Duration::seconds(1),
        )))
    }

    /// Empty store with a caller-supplied clock.
    #[must_use]
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            store: InMemoryStore::new(),
            clock,
        }
    }

    /// The backing store.
    #[must_use]
    pub const fn store(&self) -> &InMemoryStore {
        &self.store
    }

    /// Noon UTC, `n` days after 2025-06-01.
    ///
    /// # Panics
    ///
    /// Never in practice; the base timestamp is a valid constant.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn day(&self, n: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0)
            .single()
            .expect("hardcoded timestamp should always be valid")
            + Duration::days(n)
    }

    /// Seed an event owned by `owner`.
    ///
    /// # Panics
    ///
    /// Panics if the store has been marked unavailable.
    #[allow(clippy::expect_used)]
    pub fn event(&self, owner: UserId, date: DateTime<Utc>) -> Event {
        let event = Event {
            id: EventId::new(),
            title: "Summer gala".to_string(),
            description: Some("Annual fundraiser".to_string()),
            date,
            location: "Lisbon".to_string(),
            category: "corporate".to_string(),
            owner_id: owner,
        };
        self.store
            .put_event(event.clone())
            .expect("seeding requires an available store");
        event
    }

    /// Move an already seeded event to a new date.
    ///
    /// # Panics
    ///
    /// Panics if the store has been marked unavailable.
    #[allow(clippy::expect_used)]
    pub fn reschedule(&self, event: &Event, date: DateTime<Utc>) -> Event {
        let moved = Event {
            date,
            ..event.clone()
        };
        self.store
            .put_event(moved.clone())
            .expect("seeding requires an available store");
        moved
    }

    /// Seed a vendor.
    ///
    /// # Panics
    ///
    /// Panics if the store has been marked unavailable.
    #[allow(clippy::expect_used)]
    pub fn vendor(&self, name: &str) -> Vendor {
        let vendor = Vendor {
            id: VendorId::new(),
            name: name.to_string(),
            category: "catering".to_string(),
            rating: Some(4.8),
            image_url: Some(format!("https://img.example.com/{name}.png")),
        };
        self.store
            .put_vendor(vendor.clone())
            .expect("seeding requires an available store");
        vendor
    }

    /// A service over this scenario's store and clock.
    #[must_use]
    pub fn service(&self) -> BookingService {
        let store = Arc::new(self.store.clone());
        BookingService::new(store.clone(), store.clone(), store, self.clock.clone())
    }
}

/// Install a test-friendly tracing subscriber.
///
/// Safe to call from every test; only the first call installs it.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("eventify_core=debug")
        .with_test_writer()
        .try_init();
}
