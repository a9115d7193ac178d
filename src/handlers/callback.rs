//! Callback endpoints: the visitor-facing request, the provider-facing
//! bridge scripts, and the status webhook.

use axum::{
    Form, Json,
    extract::{Query, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::json;

use crate::error::AppError;
use crate::extractors::AppJson;
use crate::models::lead::{CallbackResponse, CallbackSubmission, ClientContext, Locale};
use crate::services::bridge::DialPlan;
use crate::services::callback::{self, CALL_FAILED_WARNING, CallOutcome};
use crate::services::reconcile::{self, StatusReport};
use crate::state::AppState;

/// Request an immediate callback.
///
/// # Request Body
///
/// ```json
/// { "phone": "5035551234", "locale": "en" }
/// ```
///
/// # Response (201)
///
/// ```json
/// {
///   "success": true,
///   "message": "Request received. We will call you shortly.",
///   "callbackId": "lead-8c1d…"
/// }
/// ```
///
/// When the lead was captured but automated dialing failed, the body also
/// carries a `warning` (still a 201, since the request reached the queue).
pub async fn request_callback(
    State(state): State<AppState>,
    headers: HeaderMap,
    AppJson(submission): AppJson<CallbackSubmission>,
) -> Result<impl IntoResponse, AppError> {
    let ctx = ClientContext::from_headers(&headers);
    let receipt = callback::request_callback(&state, submission, &ctx).await?;

    let warning = match receipt.outcome {
        CallOutcome::Failed => Some(CALL_FAILED_WARNING.to_string()),
        CallOutcome::Placed { .. } | CallOutcome::NotConfigured => None,
    };

    Ok((
        StatusCode::CREATED,
        Json(CallbackResponse {
            success: true,
            message: receipt.message,
            callback_id: receipt.lead_id,
            warning,
        }),
    ))
}

#[derive(Debug, Deserialize)]
pub struct BridgeParams {
    pub customer: Option<String>,
    pub locale: Option<String>,
}

/// Serve the customer-bridge voice script.
///
/// Invoked by the telephony provider (POST when delivering, GET for manual
/// testing) with `customer` and `locale` query parameters. Inputs are
/// untrusted; they are only interpolated into the script XML-escaped.
pub async fn bridge_script(
    State(state): State<AppState>,
    Query(params): Query<BridgeParams>,
) -> Response {
    let Some(customer) = params.customer.filter(|c| !c.is_empty()) else {
        return (StatusCode::BAD_REQUEST, "Missing customer phone").into_response();
    };

    // Locale came from a URL this service built; anything else reads as
    // English rather than failing the provider's fetch mid-call.
    let locale = match params.locale.as_deref() {
        Some("es") => Locale::Es,
        _ => Locale::En,
    };

    let twiml = DialPlan::customer_bridge(&customer, locale).render(state.config.caller_id());
    ([(header::CONTENT_TYPE, "text/xml")], twiml).into_response()
}

/// Serve the technician-fallback voice script: dial the primary on-call
/// number, then the fallback. 404 when the technician numbers are not
/// configured.
pub async fn technician_bridge(State(state): State<AppState>) -> Response {
    let Some((primary, fallback)) = state.config.technician_numbers() else {
        return StatusCode::NOT_FOUND.into_response();
    };

    let twiml = DialPlan::technician_fallback(primary, fallback).render(state.config.caller_id());
    ([(header::CONTENT_TYPE, "text/xml")], twiml).into_response()
}

/// Receive a call lifecycle webhook from the telephony provider.
///
/// Form-encoded `CallSid` / `CallStatus` / `CallDuration`. Always acks 200
/// (the provider retries on non-2xx, so "nothing to do" must not look like
/// failure); only a genuine internal error is a 500.
pub async fn call_status(
    State(state): State<AppState>,
    Form(report): Form<StatusReport>,
) -> Result<impl IntoResponse, AppError> {
    reconcile::apply_status(&state, report).await?;
    Ok(Json(json!({ "success": true })))
}
