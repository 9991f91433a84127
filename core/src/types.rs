//! Domain types for event-vendor bookings.
//!
//! This module contains the identifiers, entities and read projections used by
//! the booking service:
//!
//! - **Identifiers**: `UserId`, `EventId`, `VendorId`, `BookingId`
//! - **Entities**: `Booking` (owned by the booking repository), `Event` and
//!   `Vendor` (read-only, owned by their directories)
//! - **Projections**: `BookingView`, `Page`, `Pagination`, `BookingStats`
//!
//! # Booking Lifecycle
//!
//! ```text
//! pending ──► confirmed ──► completed
//!    │            │
//!    └──► cancelled ◄──┘
//! ```
//!
//! `completed` and `cancelled` are terminal.

use crate::error::{BookingError, Result, UnknownStatus};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

// ============================================================================
// Identifiers
// ============================================================================

macro_rules! uuid_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            #[doc = concat!("Creates a new random `", stringify!($name), "`")]
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            #[doc = concat!("Create a `", stringify!($name), "` from a `Uuid`")]
            #[must_use]
            pub const fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Get the inner UUID
            #[must_use]
            pub const fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

uuid_id!(
    /// Identifier of an authenticated user (seeker).
    UserId
);
uuid_id!(
    /// Identifier of an event.
    EventId
);
uuid_id!(
    /// Identifier of a vendor.
    VendorId
);
uuid_id!(
    /// Identifier of a booking.
    BookingId
);

// ============================================================================
// Principal
// ============================================================================

/// Verified identity attached to a request by the identity provider.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    /// Authenticated user
    pub user_id: UserId,
    /// Email reported by the provider, if any
    pub email: Option<String>,
}

// ============================================================================
// Booking Status
// ============================================================================

/// Lifecycle status of a booking.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    /// Requested, not yet accepted. Does not block the vendor's date.
    Pending,
    /// Accepted. Holds the vendor for the event's calendar date.
    Confirmed,
    /// Delivered (terminal).
    Completed,
    /// Withdrawn after confirmation (terminal).
    Cancelled,
}

impl BookingStatus {
    /// Every status, in lifecycle order.
    pub const ALL: [Self; 4] = [
        Self::Pending,
        Self::Confirmed,
        Self::Completed,
        Self::Cancelled,
    ];

    /// Storage / wire representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Statuses reachable from this one in a single step.
    #[must_use]
    pub const fn allowed_transitions(self) -> &'static [Self] {
        match self {
            Self::Pending => &[Self::Confirmed, Self::Cancelled],
            Self::Confirmed => &[Self::Completed, Self::Cancelled],
            Self::Completed | Self::Cancelled => &[],
        }
    }

    /// Whether `next` is a legal single-step transition from `self`.
    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        self.allowed_transitions().contains(&next)
    }

    /// Whether some transition ends in this status. `pending` is only ever
    /// the initial status.
    #[must_use]
    pub fn is_reachable(self) -> bool {
        Self::ALL.iter().any(|from| from.can_transition_to(self))
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookingStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "confirmed" => Ok(Self::Confirmed),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

// ============================================================================
// Entities
// ============================================================================

/// An event created by a seeker.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Event ID
    pub id: EventId,
    /// Title
    pub title: String,
    /// Free-form description
    pub description: Option<String>,
    /// When the event takes place
    pub date: DateTime<Utc>,
    /// Venue / location
    pub location: String,
    /// Category (wedding, corporate, ...)
    pub category: String,
    /// Creator of the event; the only user allowed to book vendors for it
    pub owner_id: UserId,
}

impl Event {
    /// Calendar date used for vendor availability.
    #[must_use]
    pub fn calendar_day(&self) -> NaiveDate {
        calendar_day(self.date)
    }
}

/// A bookable service provider.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Vendor {
    /// Vendor ID
    pub id: VendorId,
    /// Display name
    pub name: String,
    /// Category (catering, photography, ...)
    pub category: String,
    /// Average rating
    pub rating: Option<f64>,
    /// Image URL
    pub image_url: Option<String>,
}

/// Association between one event and one vendor.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Booking {
    /// Booking ID
    pub id: BookingId,
    /// Booked event (immutable)
    pub event_id: EventId,
    /// Booked vendor (immutable)
    pub vendor_id: VendorId,
    /// Seeker who created the booking (immutable)
    pub user_id: UserId,
    /// Lifecycle status
    pub status: BookingStatus,
    /// Calendar date of the linked event
    pub event_day: NaiveDate,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Last mutation time
    pub updated_at: DateTime<Utc>,
}

impl Booking {
    /// A fresh `pending` booking of `vendor_id` for `event`.
    #[must_use]
    pub fn pending(event: &Event, vendor_id: VendorId, user_id: UserId, now: DateTime<Utc>) -> Self {
        Self {
            id: BookingId::new(),
            event_id: event.id,
            vendor_id,
            user_id,
            status: BookingStatus::Pending,
            event_day: event.calendar_day(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether this booking counts against the one-active-booking-per-pair rule.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status != BookingStatus::Cancelled
    }
}

/// Calendar date (UTC year-month-day) of a timestamp.
#[must_use]
pub fn calendar_day(at: DateTime<Utc>) -> NaiveDate {
    at.date_naive()
}

// ============================================================================
// Read Projections
// ============================================================================

/// Event fields shown alongside a booking.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EventSummary {
    /// Event ID
    pub id: EventId,
    /// Title
    pub title: String,
    /// Description
    pub description: Option<String>,
    /// Event date
    pub date: DateTime<Utc>,
    /// Location
    pub location: String,
    /// Category
    pub category: String,
}

impl From<&Event> for EventSummary {
    fn from(event: &Event) -> Self {
        Self {
            id: event.id,
            title: event.title.clone(),
            description: event.description.clone(),
            date: event.date,
            location: event.location.clone(),
            category: event.category.clone(),
        }
    }
}

/// Vendor fields shown alongside a booking.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VendorSummary {
    /// Vendor ID
    pub id: VendorId,
    /// Name
    pub name: String,
    /// Category
    pub category: String,
    /// Rating
    pub rating: Option<f64>,
    /// Image URL
    pub image_url: Option<String>,
}

impl From<&Vendor> for VendorSummary {
    fn from(vendor: &Vendor) -> Self {
        Self {
            id: vendor.id,
            name: vendor.name.clone(),
            category: vendor.category.clone(),
            rating: vendor.rating,
            image_url: vendor.image_url.clone(),
        }
    }
}

/// A booking with denormalized event and vendor details for display.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BookingView {
    /// The booking row
    #[serde(flatten)]
    pub booking: Booking,
    /// Linked event
    pub event: EventSummary,
    /// Linked vendor
    pub vendor: VendorSummary,
}

impl BookingView {
    /// Assemble a view from its parts.
    #[must_use]
    pub fn new(booking: Booking, event: &Event, vendor: &Vendor) -> Self {
        Self {
            booking,
            event: event.into(),
            vendor: vendor.into(),
        }
    }
}

// ============================================================================
// Pagination
// ============================================================================

/// Validated page request (1-based page, non-zero page size).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    page_size: u32,
}

impl PageRequest {
    /// Validate a page request.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::InvalidPage`] if `page` or `page_size` is zero.
    pub const fn new(page: u32, page_size: u32) -> Result<Self> {
        if page == 0 || page_size == 0 {
            return Err(BookingError::InvalidPage { page, page_size });
        }
        Ok(Self { page, page_size })
    }

    /// 1-based page number.
    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }

    /// Maximum items per page.
    #[must_use]
    pub const fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Number of rows to skip.
    #[must_use]
    pub const fn offset(&self) -> u64 {
        (self.page as u64 - 1) * self.page_size as u64
    }
}

/// Pagination metadata returned with list results.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    /// Requested page
    pub current_page: u32,
    /// `ceil(total_items / items_per_page)`
    pub total_pages: u64,
    /// Matching rows across all pages
    pub total_items: u64,
    /// Page size
    pub items_per_page: u32,
    /// `current_page < total_pages`
    pub has_next_page: bool,
    /// `current_page > 1`
    pub has_prev_page: bool,
    /// Next page number, if any
    pub next_page: Option<u32>,
    /// Previous page number, if any
    pub prev_page: Option<u32>,
}

impl Pagination {
    /// Compute metadata for `request` over `total_items` rows.
    #[must_use]
    pub const fn new(request: PageRequest, total_items: u64) -> Self {
        let total_pages = total_items.div_ceil(request.page_size as u64);
        let has_next_page = (request.page as u64) < total_pages;
        let has_prev_page = request.page > 1;

        Self {
            current_page: request.page,
            total_pages,
            total_items,
            items_per_page: request.page_size,
            has_next_page,
            has_prev_page,
            next_page: if has_next_page { Some(request.page + 1) } else { None },
            prev_page: if has_prev_page { Some(request.page - 1) } else { None },
        }
    }
}

/// One page of results.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    /// Items on this page (at most `items_per_page`)
    pub items: Vec<T>,
    /// Pagination metadata
    pub pagination: Pagination,
}

// ============================================================================
// Statistics
// ============================================================================

/// Booking counts grouped by status.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingStats {
    /// All bookings
    pub total: u64,
    /// `pending`
    pub pending: u64,
    /// `confirmed`
    pub confirmed: u64,
    /// `completed`
    pub completed: u64,
    /// `cancelled`
    pub cancelled: u64,
}

impl BookingStats {
    /// Tally a sequence of statuses.
    #[must_use]
    pub fn from_statuses(statuses: impl IntoIterator<Item = BookingStatus>) -> Self {
        statuses.into_iter().fold(Self::default(), |mut stats, status| {
            stats.total += 1;
            match status {
                BookingStatus::Pending => stats.pending += 1,
                BookingStatus::Confirmed => stats.confirmed += 1,
                BookingStatus::Completed => stats.completed += 1,
                BookingStatus::Cancelled => stats.cancelled += 1,
            }
            stats
        })
    }
}
