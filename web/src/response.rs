//! Success envelope shared by all API routes.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use eventify_core::{Page, Pagination};
use serde::Serialize;

/// `{ "success": true, "message": ..., "data": ..., "pagination"?: ... }`
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    success: bool,
    message: String,
    data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pagination: Option<Pagination>,
    #[serde(skip)]
    status: StatusCode,
}

impl<T> ApiResponse<T> {
    /// 200 OK with `data`.
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data,
            pagination: None,
            status: StatusCode::OK,
        }
    }

    /// 201 Created with `data`.
    pub fn created(message: impl Into<String>, data: T) -> Self {
        Self {
            status: StatusCode::CREATED,
            ..Self::ok(message, data)
        }
    }
}

impl<T> ApiResponse<Vec<T>> {
    /// 200 OK with one page of items and its metadata.
    pub fn page(message: impl Into<String>, page: Page<T>) -> Self {
        Self {
            pagination: Some(page.pagination),
            ..Self::ok(message, page.items)
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}
