//! Shared response envelope types for API handlers.
//!
//! All API responses use a `{ "data": ... }` envelope. List endpoints
//! additionally report the unpaginated row count in the `x-total-count`
//! header through [`ListResponse`].

use axum::http::HeaderName;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

/// Header carrying the total number of rows matching a list request.
pub const TOTAL_COUNT_HEADER: &str = "x-total-count";

/// Standard `{ "data": T }` response envelope.
///
/// # Example
///
/// ```ignore
/// Ok(Json(DataResponse { data: items }))
/// ```
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}

/// One page of a list plus the total count across all pages.
#[derive(Debug)]
pub struct ListResponse<T: Serialize> {
    pub items: Vec<T>,
    pub total: i64,
}

impl<T: Serialize> ListResponse<T> {
    pub fn new(items: Vec<T>, total: i64) -> Self {
        Self { items, total }
    }
}

impl<T: Serialize> IntoResponse for ListResponse<T> {
    fn into_response(self) -> Response {
        (
            [(
                HeaderName::from_static(TOTAL_COUNT_HEADER),
                self.total.to_string(),
            )],
            Json(DataResponse { data: self.items }),
        )
            .into_response()
    }
}
