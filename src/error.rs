//! Error types and HTTP error response handling.
//!
//! This module defines all application errors and how they are converted
//! into HTTP responses with appropriate status codes and JSON bodies.
//!
//! Telephony call-placement failure is deliberately NOT represented here: the
//! lead is already persisted by the time a call is placed, so a placement
//! failure is data (`CallOutcome::Failed`) inside a successful response, not
//! an error. See `services::callback`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::json;

use crate::store::StoreError;

/// One failed field in a submitted form, surfaced to the caller so the input
/// can be corrected.
#[derive(Debug, Clone, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &str, message: &str) -> Self {
        Self {
            field: field.to_string(),
            message: message.to_string(),
        }
    }
}

/// Application-wide error type.
///
/// # Error Categories
///
/// - **Validation**: malformed or missing input, with per-field detail.
///   Never logged as exceptional.
/// - **RateLimited**: caller exceeded an endpoint policy; carries a localized
///   human message so clients can back off correctly.
/// - **BadRequest**: a request rejected before any side effect, without
///   field-level detail (malformed body, blocked content).
/// - **Store**: the lead store is unreachable or misbehaving. Fatal to the
///   request: no lead means no guarantee of follow-up.
/// - **TriageUnavailable**: the triage model API errored; the caller is
///   pointed at the phone line instead.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// One or more submitted fields failed validation.
    ///
    /// Returns HTTP 400 Bad Request with every failed field enumerated.
    #[error("validation failed")]
    Validation(Vec<FieldError>),

    /// Caller exceeded the per-endpoint request policy.
    ///
    /// Returns HTTP 429 Too Many Requests.
    #[error("rate limit exceeded")]
    RateLimited { message: String },

    /// Request rejected at the boundary with a plain message.
    ///
    /// Returns HTTP 400 Bad Request.
    #[error("bad request: {message}")]
    BadRequest { message: String },

    /// Lead store operation failed.
    ///
    /// Returns HTTP 500 with a generic retry-or-call message; internal detail
    /// is logged server-side only.
    #[error("lead store error")]
    Store(#[from] StoreError),

    /// The triage model API is unreachable or erroring.
    ///
    /// Returns HTTP 503 Service Unavailable.
    #[error("triage service unavailable")]
    TriageUnavailable { message: String },
}

/// Convert AppError into an HTTP response.
///
/// # Response Format
///
/// All errors share the envelope used by the success responses:
///
/// ```json
/// {
///   "success": false,
///   "message": "Validation failed",
///   "errors": [{ "field": "phone", "message": "Invalid phone number" }]
/// }
/// ```
///
/// The `errors` array is only present for validation failures.
///
/// # Status Code Mapping
///
/// - `Validation` → 400 Bad Request
/// - `BadRequest` → 400 Bad Request
/// - `RateLimited` → 429 Too Many Requests
/// - `Store` → 500 Internal Server Error (hides details from client)
/// - `TriageUnavailable` → 503 Service Unavailable
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Validation(errors) => (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "success": false,
                    "message": "Validation failed",
                    "errors": errors,
                })),
            )
                .into_response(),
            AppError::RateLimited { message } => (
                StatusCode::TOO_MANY_REQUESTS,
                Json(json!({ "success": false, "message": message })),
            )
                .into_response(),
            AppError::BadRequest { message } => (
                StatusCode::BAD_REQUEST,
                Json(json!({ "success": false, "message": message })),
            )
                .into_response(),
            AppError::Store(err) => {
                // Full detail stays server-side for operator diagnosis
                tracing::error!(error = %err, "lead store failure");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({
                        "success": false,
                        "message": "An error occurred. Please try again or call us directly.",
                    })),
                )
                    .into_response()
            }
            AppError::TriageUnavailable { message } => (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "success": false, "message": message })),
            )
                .into_response(),
        }
    }
}
