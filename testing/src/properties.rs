//! Property-based testing utilities using proptest.

use eventify_core::BookingStatus;
use proptest::prelude::*;

/// Any booking status.
pub fn any_status() -> impl Strategy<Value = BookingStatus> {
    prop::sample::select(BookingStatus::ALL.to_vec())
}

/// A sequence of requested status changes, including illegal ones.
pub fn status_requests(max_len: usize) -> impl Strategy<Value = Vec<BookingStatus>> {
    prop::collection::vec(any_status(), 0..=max_len)
}

/// One step a seeker can take against a single booking.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Request {
    /// `update_booking_status` to the given status
    Update(BookingStatus),
    /// `cancel_booking`
    Cancel,
}

/// Random mix of updates and cancellations.
pub fn requests(max_len: usize) -> impl Strategy<Value = Vec<Request>> {
    let request = prop_oneof![
        3 => any_status().prop_map(Request::Update),
        1 => Just(Request::Cancel),
    ];
    prop::collection::vec(request, 0..=max_len)
}

/// Whether `update_booking_status(next)` succeeds on a booking in `current`.
#[must_use]
pub fn update_accepted(current: BookingStatus, next: BookingStatus) -> bool {
    current.can_transition_to(next) || (current == next && next.is_reachable())
}

/// Walk `requests` through the lifecycle table, keeping only legal moves.
///
/// Returns every status visited, starting from `pending`. Repeating the
/// current status is a no-op (rejected for `pending`); a cancel from `pending`
/// deletes the booking and ends the walk.
#[must_use]
pub fn expected_path(requests: &[Request]) -> (Vec<BookingStatus>, bool) {
    let mut current = BookingStatus::Pending;
    let mut path = vec![current];

    for request in requests {
        match *request {
            Request::Update(next) if current.can_transition_to(next) => {
                current = next;
                path.push(next);
            }
            Request::Cancel if current == BookingStatus::Pending => return (path, true),
            Request::Cancel if current == BookingStatus::Confirmed => {
                current = BookingStatus::Cancelled;
                path.push(current);
            }
            Request::Update(_) | Request::Cancel => {}
        }
    }

    (path, false)
}
