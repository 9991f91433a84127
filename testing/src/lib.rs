//! # Eventify Testing
//!
//! Testing utilities and helpers for the Eventify booking service.
//!
//! This crate provides:
//! - Deterministic clocks implementing [`Clock`]
//! - A [`Scenario`] builder that seeds an in-memory store and hands out a
//!   ready [`BookingService`](eventify_core::BookingService)
//! - `proptest` strategies for booking statuses and request sequences
//!
//! ## Example
//!
//! ```ignore
//! use eventify_testing::Scenario;
//!
//! #[tokio::test]
//! async fn owner_can_book() {
//!     let scenario = Scenario::new();
//!     let owner = UserId::new();
//!     let event = scenario.event(owner, scenario.day(1));
//!     let vendor = scenario.vendor("Bloom & Co");
//!
//!     let view = scenario
//!         .service()
//!         .create_booking(owner, event.id, vendor.id)
//!         .await
//!         .unwrap();
//!     assert_eq!(view.booking.status, BookingStatus::Pending);
//! }
//! ```

use chrono::{DateTime, Utc};
use eventify_core::environment::Clock;

/// Mock implementations of environment traits.
pub mod mocks {
    use super::{Clock, DateTime, Utc};
    use chrono::Duration;
    use std::sync::{Arc, Mutex};

    /// Fixed clock for deterministic tests
    ///
    /// Always returns the same time, making tests reproducible.
    ///
    /// # Example
    ///
    /// ```
    /// use eventify_testing::mocks::FixedClock;
    /// use eventify_core::environment::Clock;
    /// use chrono::Utc;
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// assert_eq!(clock.now(), clock.now());
    /// ```
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: DateTime<Utc>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time }
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }
    }

    /// Clock that moves forward by a fixed step on every read.
    ///
    /// Gives each booking a distinct `created_at`, so ordering by creation
    /// time is observable in tests.
    #[derive(Debug, Clone)]
    pub struct TickingClock {
        next: Arc<Mutex<DateTime<Utc>>>,
        step: Duration,
    }

    impl TickingClock {
        /// Start at `start`, advancing by `step` after each read.
        #[must_use]
        pub fn new(start: DateTime<Utc>, step: Duration) -> Self {
            Self {
                next: Arc::new(Mutex::new(start)),
                step,
            }
        }
    }

    impl Clock for TickingClock {
        fn now(&self) -> DateTime<Utc> {
            match self.next.lock() {
                Ok(mut next) => {
                    let now = *next;
                    *next = now + self.step;
                    now
                }
                Err(poisoned) => *poisoned.into_inner(),
            }
        }
    }

    /// Create a default fixed clock for tests (2025-01-01 00:00:00 UTC)
    ///
    /// # Panics
    ///
    /// This function will panic if the hardcoded timestamp fails to parse,
    /// which should never happen in practice.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(
            DateTime::parse_from_rfc3339("2025-01-01T00:00:00Z")
                .expect("hardcoded timestamp should always parse")
                .with_timezone(&Utc),
        )
    }
}

pub mod helpers;
pub mod properties;

// Re-export commonly used items
pub use helpers::Scenario;
pub use mocks::{FixedClock, TickingClock, test_clock};
