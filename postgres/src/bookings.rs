//! Booking rows and their display projection.

use crate::error::{unavailable, write_error};
use chrono::{DateTime, NaiveDate, Utc};
use eventify_core::{
    Booking, BookingError, BookingId, BookingRepository, BookingStatus, BookingView, EventId,
    EventSummary, PageRequest, StoreFuture, UserId, VendorId, VendorSummary,
};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

const BOOKING_COLUMNS: &str =
    "b.id, b.event_id, b.vendor_id, b.user_id, b.status, b.event_day, b.created_at, b.updated_at";

const VIEW_SELECT: &str = r"
    SELECT b.id, b.event_id, b.vendor_id, b.user_id, b.status, b.event_day,
           b.created_at, b.updated_at,
           e.title AS event_title, e.description AS event_description,
           e.date AS event_date, e.location AS event_location,
           e.category AS event_category,
           v.name AS vendor_name, v.category AS vendor_category,
           v.rating AS vendor_rating, v.image_url AS vendor_image_url
    FROM bookings b
    JOIN events e ON e.id = b.event_id
    JOIN vendors v ON v.id = b.vendor_id
";

/// `PostgreSQL` booking repository.
///
/// Conflict rules are enforced by the partial unique indexes
/// `bookings_active_pair_key` and `bookings_vendor_confirmed_day_key`; status
/// writes are compare-and-set on the current status.
#[derive(Clone)]
pub struct PostgresBookingRepository {
    pool: PgPool,
}

impl PostgresBookingRepository {
    /// Create a new booking repository.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// The underlying pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Map a failed status write. A vendor-day conflict reports the row's
    /// current `event_day`, which moves with the event after `booking` was read.
    async fn status_write_error(&self, err: &sqlx::Error, booking: &Booking) -> BookingError {
        let mapped = write_error("Failed to update booking status", err, booking);
        let BookingError::VendorUnavailable { vendor_id, date } = mapped else {
            return mapped;
        };

        let current = sqlx::query_scalar::<_, NaiveDate>(
            "SELECT event_day FROM bookings WHERE id = $1",
        )
        .bind(booking.id.0)
        .fetch_optional(&self.pool)
        .await;

        let date = match current {
            Ok(Some(day)) => day,
            Ok(None) => date,
            Err(e) => {
                tracing::warn!(booking_id = %booking.id, error = %e, "Failed to re-read event day");
                date
            }
        };
        tracing::warn!(%vendor_id, %date, "Vendor double-booking rejected by constraint");

        BookingError::VendorUnavailable { vendor_id, date }
    }
}

impl BookingRepository for PostgresBookingRepository {
    fn find_by_id(&self, id: BookingId) -> StoreFuture<'_, Option<Booking>> {
        Box::pin(async move {
            let row = sqlx::query(&format!(
                "SELECT {BOOKING_COLUMNS} FROM bookings b WHERE b.id = $1"
            ))
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| unavailable("Failed to load booking", &e))?;

            row.as_ref()
                .map(booking_from_row)
                .transpose()
                .map_err(|e| unavailable("Failed to decode booking", &e))
        })
    }

    fn find_view(&self, id: BookingId) -> StoreFuture<'_, Option<BookingView>> {
        Box::pin(async move {
            let row = sqlx::query(&format!("{VIEW_SELECT} WHERE b.id = $1"))
                .bind(id.0)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| unavailable("Failed to load booking", &e))?;

            row.as_ref()
                .map(view_from_row)
                .transpose()
                .map_err(|e| unavailable("Failed to decode booking", &e))
        })
    }

    fn find_by_event_and_vendor(
        &self,
        event_id: EventId,
        vendor_id: VendorId,
    ) -> StoreFuture<'_, Option<Booking>> {
        Box::pin(async move {
            let row = sqlx::query(&format!(
                r"
                SELECT {BOOKING_COLUMNS}
                FROM bookings b
                WHERE b.event_id = $1 AND b.vendor_id = $2 AND b.status <> 'cancelled'
                "
            ))
            .bind(event_id.0)
            .bind(vendor_id.0)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| unavailable("Failed to look up booking pair", &e))?;

            row.as_ref()
                .map(booking_from_row)
                .transpose()
                .map_err(|e| unavailable("Failed to decode booking", &e))
        })
    }

    fn find_confirmed_by_vendor(&self, vendor_id: VendorId) -> StoreFuture<'_, Vec<Booking>> {
        Box::pin(async move {
            let rows = sqlx::query(&format!(
                r"
                SELECT {BOOKING_COLUMNS}
                FROM bookings b
                WHERE b.vendor_id = $1 AND b.status = 'confirmed'
                "
            ))
            .bind(vendor_id.0)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| unavailable("Failed to load vendor bookings", &e))?;

            rows.iter()
                .map(booking_from_row)
                .collect::<Result<_, _>>()
                .map_err(|e| unavailable("Failed to decode booking", &e))
        })
    }

    fn find_by_user(
        &self,
        user_id: UserId,
        status: Option<BookingStatus>,
        page: PageRequest,
    ) -> StoreFuture<'_, (Vec<BookingView>, u64)> {
        Box::pin(async move {
            let status = status.map(|s| s.as_str());
            let limit = i64::from(page.page_size());
            let offset = i64::try_from(page.offset()).unwrap_or(i64::MAX);

            let rows = sqlx::query(&format!(
                r"
                {VIEW_SELECT}
                WHERE b.user_id = $1 AND ($2::text IS NULL OR b.status = $2)
                ORDER BY b.created_at DESC, b.id
                LIMIT $3 OFFSET $4
                "
            ))
            .bind(user_id.0)
            .bind(status)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| unavailable("Failed to list bookings", &e))?;

            let total: i64 = sqlx::query_scalar(
                r"
                SELECT COUNT(*)
                FROM bookings
                WHERE user_id = $1 AND ($2::text IS NULL OR status = $2)
                ",
            )
            .bind(user_id.0)
            .bind(status)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| unavailable("Failed to count bookings", &e))?;

            let items = rows
                .iter()
                .map(view_from_row)
                .collect::<Result<_, _>>()
                .map_err(|e| unavailable("Failed to decode booking", &e))?;

            Ok((items, u64::try_from(total).unwrap_or_default()))
        })
    }

    fn find_statuses_by_user(&self, user_id: UserId) -> StoreFuture<'_, Vec<BookingStatus>> {
        Box::pin(async move {
            let statuses: Vec<String> =
                sqlx::query_scalar("SELECT status FROM bookings WHERE user_id = $1")
                    .bind(user_id.0)
                    .fetch_all(&self.pool)
                    .await
                    .map_err(|e| unavailable("Failed to load booking statuses", &e))?;

            statuses
                .iter()
                .map(|s| s.parse().map_err(|e| BookingError::StoreUnavailable(format!("{e}"))))
                .collect()
        })
    }

    fn insert(&self, booking: Booking) -> StoreFuture<'_, Booking> {
        Box::pin(async move {
            sqlx::query(
                r"
                INSERT INTO bookings
                    (id, event_id, vendor_id, user_id, status, event_day, created_at, updated_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                ",
            )
            .bind(booking.id.0)
            .bind(booking.event_id.0)
            .bind(booking.vendor_id.0)
            .bind(booking.user_id.0)
            .bind(booking.status.as_str())
            .bind(booking.event_day)
            .bind(booking.created_at)
            .bind(booking.updated_at)
            .execute(&self.pool)
            .await
            .map_err(|e| write_error("Failed to insert booking", &e, &booking))?;

            tracing::debug!(booking_id = %booking.id, "Booking row inserted");
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
            let row = sqlx::query(&format!(
                r"
                UPDATE bookings b
                SET status = $3, updated_at = $4
                WHERE b.id = $1 AND b.status = $2
                RETURNING {BOOKING_COLUMNS}
                "
            ))
            .bind(booking.id.0)
            .bind(booking.status.as_str())
            .bind(next.as_str())
            .bind(at)
            .fetch_optional(&self.pool)
            .await;
            let row = match row {
                Ok(row) => row,
                Err(e) => return Err(self.status_write_error(&e, booking).await),
            };

            if row.is_none() {
                tracing::debug!(
                    booking_id = %booking.id,
                    expected = %booking.status,
                    "Status compare-and-set missed"
                );
            }

            row.as_ref()
                .map(booking_from_row)
                .transpose()
                .map_err(|e| unavailable("Failed to decode booking", &e))
        })
    }

    fn delete<'a>(&'a self, booking: &'a Booking) -> StoreFuture<'a, bool> {
        Box::pin(async move {
            let result = sqlx::query("DELETE FROM bookings WHERE id = $1 AND status = $2")
                .bind(booking.id.0)
                .bind(booking.status.as_str())
                .execute(&self.pool)
                .await
                .map_err(|e| unavailable("Failed to delete booking", &e))?;

            Ok(result.rows_affected() == 1)
        })
    }
}

fn status_from_row(row: &PgRow) -> Result<BookingStatus, sqlx::Error> {
    let raw: String = row.try_get("status")?;
    raw.parse().map_err(|e| sqlx::Error::Decode(Box::new(e)))
}

fn booking_from_row(row: &PgRow) -> Result<Booking, sqlx::Error> {
    Ok(Booking {
        id: BookingId(row.try_get("id")?),
        event_id: EventId(row.try_get("event_id")?),
        vendor_id: VendorId(row.try_get("vendor_id")?),
        user_id: UserId(row.try_get("user_id")?),
        status: status_from_row(row)?,
        event_day: row.try_get("event_day")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn view_from_row(row: &PgRow) -> Result<BookingView, sqlx::Error> {
    let booking = booking_from_row(row)?;

    let event = EventSummary {
        id: booking.event_id,
        title: row.try_get("event_title")?,
        description: row.try_get("event_description")?,
        date: row.try_get("event_date")?,
        location: row.try_get("event_location")?,
        category: row.try_get("event_category")?,
    };

    let vendor = VendorSummary {
        id: booking.vendor_id,
        name: row.try_get("vendor_name")?,
        category: row.try_get("vendor_category")?,
        rating: row.try_get("vendor_rating")?,
        image_url: row.try_get("vendor_image_url")?,
    };

    Ok(BookingView {
        booking,
        event,
        vendor,
    })
}
