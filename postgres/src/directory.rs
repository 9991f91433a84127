//! Read-only event and vendor lookups.

use crate::error::unavailable;
use eventify_core::{
    Event, EventDirectory, EventId, StoreFuture, UserId, Vendor, VendorDirectory, VendorId,
};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

/// Events table reader.
#[derive(Clone)]
pub struct PostgresEventDirectory {
    pool: PgPool,
}

impl PostgresEventDirectory {
    /// Create a new event directory.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl EventDirectory for PostgresEventDirectory {
    fn find_event(&self, id: EventId) -> StoreFuture<'_, Option<Event>> {
        Box::pin(async move {
            let row = sqlx::query(
                r"
                SELECT id, title, description, date, location, category, user_id
                FROM events
                WHERE id = $1
                ",
            )
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| unavailable("Failed to load event", &e))?;

            row.as_ref()
                .map(event_from_row)
                .transpose()
                .map_err(|e| unavailable("Failed to decode event", &e))
        })
    }
}

fn event_from_row(row: &PgRow) -> Result<Event, sqlx::Error> {
    Ok(Event {
        id: EventId(row.try_get("id")?),
        title: row.try_get("title")?,
        description: row.try_get("description")?,
        date: row.try_get("date")?,
        location: row.try_get("location")?,
        category: row.try_get("category")?,
        owner_id: UserId(row.try_get("user_id")?),
    })
}

/// Vendors table reader.
#[derive(Clone)]
pub struct PostgresVendorDirectory {
    pool: PgPool,
}

impl PostgresVendorDirectory {
    /// Create a new vendor directory.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl VendorDirectory for PostgresVendorDirectory {
    fn find_vendor(&self, id: VendorId) -> StoreFuture<'_, Option<Vendor>> {
        Box::pin(async move {
            let row = sqlx::query(
                r"
                SELECT id, name, category, rating, image_url
                FROM vendors
                WHERE id = $1
                ",
            )
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| unavailable("Failed to load vendor", &e))?;

            row.as_ref()
                .map(vendor_from_row)
                .transpose()
                .map_err(|e| unavailable("Failed to decode vendor", &e))
        })
    }
}

fn vendor_from_row(row: &PgRow) -> Result<Vendor, sqlx::Error> {
    Ok(Vendor {
        id: VendorId(row.try_get("id")?),
        name: row.try_get("name")?,
        category: row.try_get("category")?,
        rating: row.try_get("rating")?,
        image_url: row.try_get("image_url")?,
    })
}
