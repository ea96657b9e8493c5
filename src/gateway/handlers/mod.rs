//! HTTP handlers. Thin adapters: ownership checks, then service calls.
//!
//! The requester identity arrives pre-authenticated from the upstream
//! gateway via the `X-User-Id` header; this service never authenticates.

pub mod account;
pub mod transaction;
pub mod transfer;

use axum::Json;
use axum::http::StatusCode;

use super::types::{ApiResponse, error_codes};

pub(crate) type HandlerError = (StatusCode, Json<ApiResponse<()>>);

pub(crate) fn bad_request(code: i32, msg: impl Into<String>) -> HandlerError {
    (StatusCode::BAD_REQUEST, Json(ApiResponse::<()>::error(code, msg)))
}

pub(crate) fn forbidden(msg: impl Into<String>) -> HandlerError {
    (
        StatusCode::FORBIDDEN,
        Json(ApiResponse::<()>::error(error_codes::FORBIDDEN, msg)),
    )
}

pub(crate) fn not_found(msg: impl Into<String>) -> HandlerError {
    (
        StatusCode::NOT_FOUND,
        Json(ApiResponse::<()>::error(error_codes::NOT_FOUND, msg)),
    )
}

/// Store faults surface as a generic message; the detail stays in the log.
pub(crate) fn internal(err: impl std::fmt::Display) -> HandlerError {
    tracing::error!("Request failed on a store error: {}", err);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ApiResponse::<()>::error(
            error_codes::INTERNAL_ERROR,
            "An internal error occurred",
        )),
    )
}
