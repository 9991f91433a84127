//! Booking routes.
//!
//! Every handler authenticates through [`AuthenticatedUser`], validates the
//! request shape, calls [`BookingService`](eventify_core::BookingService) and
//! wraps the result in [`ApiResponse`].

use crate::WebResult;
use crate::error::AppError;
use crate::extractors::AuthenticatedUser;
use crate::response::ApiResponse;
use crate::state::AppState;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Json, Path, Query, State};
use eventify_core::{BookingId, BookingStats, BookingStatus, BookingView, EventId, VendorId};
use serde::Deserialize;

/// Default page size for `GET /api/bookings`.
pub const DEFAULT_LIMIT: u32 = 10;

/// Largest accepted page size.
pub const MAX_LIMIT: u32 = 100;

/// `GET /api/bookings` query string.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    /// 1-based page (default 1)
    pub page: Option<u32>,
    /// Page size (default 10, at most 100)
    pub limit: Option<u32>,
    /// Only bookings in this status
    pub status: Option<String>,
}

/// `POST /api/bookings` body.
#[derive(Debug, Deserialize)]
pub struct CreateBookingRequest {
    /// Event to book for
    pub event_id: EventId,
    /// Vendor to book
    pub vendor_id: VendorId,
}

/// `PUT /api/bookings/:id` body.
#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    /// Requested status
    pub status: String,
}

fn parse_status(raw: &str) -> Result<BookingStatus, AppError> {
    raw.parse::<BookingStatus>()
        .map_err(|e| AppError::bad_request(e.to_string()))
}

/// List the caller's bookings.
///
/// # Errors
///
/// 400 for malformed paging or status, 401 without a valid token,
/// 503 when storage is down.
pub async fn list_bookings(
    State(state): State<AppState>,
    AuthenticatedUser(principal): AuthenticatedUser,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> WebResult<ApiResponse<Vec<BookingView>>> {
    let Query(query) = query?;

    let page = query.page.unwrap_or(1);
    if page == 0 {
        return Err(AppError::bad_request("Page must be a positive integer"));
    }
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT);
    if !(1..=MAX_LIMIT).contains(&limit) {
        return Err(AppError::bad_request(format!(
            "Limit must be between 1 and {MAX_LIMIT}"
        )));
    }
    let status = query.status.as_deref().map(parse_status).transpose()?;

    let page = state
        .service
        .list_user_bookings(principal.user_id, status, page, limit)
        .await?;

    Ok(ApiResponse::page("Bookings retrieved successfully", page))
}

/// Per-status counts for the caller.
///
/// # Errors
///
/// 401 without a valid token, 503 when storage is down.
pub async fn booking_stats(
    State(state): State<AppState>,
    AuthenticatedUser(principal): AuthenticatedUser,
) -> WebResult<ApiResponse<BookingStats>> {
    let stats = state.service.get_booking_stats(principal.user_id).await?;
    Ok(ApiResponse::ok(
        "Booking statistics retrieved successfully",
        stats,
    ))
}

/// One of the caller's bookings.
///
/// # Errors
///
/// 400 for a malformed id, 404 when missing or not owned by the caller.
pub async fn get_booking(
    State(state): State<AppState>,
    AuthenticatedUser(principal): AuthenticatedUser,
    id: Result<Path<BookingId>, PathRejection>,
) -> WebResult<ApiResponse<BookingView>> {
    let Path(id) = id?;
    let view = state.service.get_booking(principal.user_id, id).await?;
    Ok(ApiResponse::ok("Booking retrieved successfully", view))
}

/// Book a vendor for one of the caller's events.
///
/// # Errors
///
/// 400 for a malformed body, 403 for someone else's event, 404 for unknown
/// event or vendor, 409 on a duplicate or an unavailable vendor.
pub async fn create_booking(
    State(state): State<AppState>,
    AuthenticatedUser(principal): AuthenticatedUser,
    body: Result<Json<CreateBookingRequest>, JsonRejection>,
) -> WebResult<ApiResponse<BookingView>> {
    let Json(request) = body?;
    let view = state
        .service
        .create_booking(principal.user_id, request.event_id, request.vendor_id)
        .await?;
    Ok(ApiResponse::created("Booking created successfully", view))
}

/// Move a booking to a new status.
///
/// # Errors
///
/// 400 for an unknown status or an illegal transition, 403 for someone
/// else's event, 404 for an unknown booking, 409 when the vendor is taken.
pub async fn update_booking_status(
    State(state): State<AppState>,
    AuthenticatedUser(principal): AuthenticatedUser,
    id: Result<Path<BookingId>, PathRejection>,
    body: Result<Json<UpdateStatusRequest>, JsonRejection>,
) -> WebResult<ApiResponse<BookingView>> {
    let Path(id) = id?;
    let Json(request) = body?;
    let status = parse_status(&request.status)?;

    let view = state
        .service
        .update_booking_status(principal.user_id, id, status)
        .await?;
    Ok(ApiResponse::ok("Booking status updated successfully", view))
}

/// Cancel a booking. A pending booking is deleted and `data` is `null`.
///
/// # Errors
///
/// 400 for a completed booking, 403 for someone else's event, 404 for an
/// unknown booking.
pub async fn cancel_booking(
    State(state): State<AppState>,
    AuthenticatedUser(principal): AuthenticatedUser,
    id: Result<Path<BookingId>, PathRejection>,
) -> WebResult<ApiResponse<Option<BookingView>>> {
    let Path(id) = id?;
    let view = state.service.cancel_booking(principal.user_id, id).await?;
    Ok(ApiResponse::ok("Booking cancelled successfully", view))
}
