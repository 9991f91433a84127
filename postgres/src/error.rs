//! Translation of `sqlx` failures into booking errors.

use eventify_core::{Booking, BookingError};

/// Partial unique index: one non-cancelled booking per (event, vendor).
const ACTIVE_PAIR_KEY: &str = "bookings_active_pair_key";

/// Partial unique index: one confirmed booking per (vendor, day).
const VENDOR_CONFIRMED_DAY_KEY: &str = "bookings_vendor_confirmed_day_key";

const EVENT_FKEY: &str = "bookings_event_id_fkey";
const VENDOR_FKEY: &str = "bookings_vendor_id_fkey";

/// Any failure not tied to a known constraint.
pub(crate) fn unavailable(context: &str, err: &sqlx::Error) -> BookingError {
    BookingError::StoreUnavailable(format!("{context}: {err}"))
}

/// Map a failed write of `booking`, recognising the booking constraints.
pub(crate) fn write_error(context: &str, err: &sqlx::Error, booking: &Booking) -> BookingError {
    if let sqlx::Error::Database(db_err) = err {
        let constraint = db_err.constraint();

        if db_err.is_unique_violation() {
            match constraint {
                Some(ACTIVE_PAIR_KEY) => {
                    tracing::warn!(
                        event_id = %booking.event_id,
                        vendor_id = %booking.vendor_id,
                        "Duplicate booking rejected by constraint"
                    );
                    return BookingError::DuplicateBooking {
                        event_id: booking.event_id,
                        vendor_id: booking.vendor_id,
                    };
                }
                Some(VENDOR_CONFIRMED_DAY_KEY) => {
                    // `event_day` as read; status writes re-read the row.
                    return BookingError::VendorUnavailable {
                        vendor_id: booking.vendor_id,
                        date: booking.event_day,
                    };
                }
                _ => {}
            }
        }

        if db_err.is_foreign_key_violation() {
            match constraint {
                Some(EVENT_FKEY) => return BookingError::EventNotFound(booking.event_id),
                Some(VENDOR_FKEY) => return BookingError::VendorNotFound(booking.vendor_id),
                _ => {}
            }
        }
    }

    unavailable(context, err)
}
