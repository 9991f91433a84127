//! `PostgreSQL` storage for Eventify bookings.
//!
//! This crate implements the repository traits from `eventify-core` on top of
//! `sqlx`:
//!
//! - [`PostgresBookingRepository`]: booking rows, views, pagination, stats
//! - [`PostgresEventDirectory`] / [`PostgresVendorDirectory`]: read-only lookups
//!
//! The booking invariants are enforced by the schema in `migrations/`: two
//! partial unique indexes plus compare-and-set status writes. Constraint
//! violations come back as the matching [`BookingError`] variant.
//!
//! # Example
//!
//! ```ignore
//! use eventify_postgres::{PostgresConfig, PostgresBookingRepository, connect, migrate};
//!
//! let pool = connect(&PostgresConfig::new("postgres://localhost/eventify")).await?;
//! migrate(&pool).await?;
//! let bookings = PostgresBookingRepository::new(pool.clone());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod bookings;
mod directory;
mod error;

pub use bookings::PostgresBookingRepository;
pub use directory::{PostgresEventDirectory, PostgresVendorDirectory};

use eventify_core::{BookingError, Result};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::time::Duration;

/// Connection pool settings.
#[derive(Debug, Clone)]
pub struct PostgresConfig {
    /// Connection URL
    pub url: String,
    /// Upper bound on pooled connections
    pub max_connections: u32,
    /// Connections kept open while idle
    pub min_connections: u32,
    /// How long to wait for a connection before failing
    pub connect_timeout: Duration,
}

impl PostgresConfig {
    /// Settings for `url` with default pool sizing.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            max_connections: 10,
            min_connections: 1,
            connect_timeout: Duration::from_secs(30),
        }
    }
}

/// Open a connection pool.
///
/// # Errors
///
/// Returns [`BookingError::StoreUnavailable`] if the database cannot be reached.
pub async fn connect(config: &PostgresConfig) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(config.connect_timeout)
        .connect(&config.url)
        .await
        .map_err(|e| BookingError::StoreUnavailable(format!("Failed to connect: {e}")))?;

    tracing::info!(
        max_connections = config.max_connections,
        "Database pool established"
    );

    Ok(pool)
}

/// Run the embedded migrations.
///
/// # Errors
///
/// Returns [`BookingError::StoreUnavailable`] if a migration fails.
pub async fn migrate(pool: &PgPool) -> Result<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .map_err(|e| BookingError::StoreUnavailable(format!("Migration failed: {e}")))?;

    tracing::info!("Database migrations applied");
    Ok(())
}
