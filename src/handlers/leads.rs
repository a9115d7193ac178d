//! Contact-form lead intake handler.

use axum::{Json, extract::State, http::HeaderMap, http::StatusCode, response::IntoResponse};

use crate::error::AppError;
use crate::extractors::AppJson;
use crate::models::lead::{ClientContext, LeadResponse, LeadSubmission};
use crate::services::leads;
use crate::state::AppState;

/// Submit a contact-form lead.
///
/// # Request Body
///
/// ```json
/// {
///   "name": "Jane Doe",
///   "phone": "5035551234",
///   "email": "jane@example.com",
///   "zip": "97222",
///   "service": "water-damage",
///   "message": "Basement flooded overnight",
///   "consent": true
/// }
/// ```
///
/// # Response (201)
///
/// ```json
/// {
///   "success": true,
///   "message": "Thank you for your message. We will contact you shortly.",
///   "leadId": "lead-4f3a…"
/// }
/// ```
///
/// Validation failures come back 400 with a per-field `errors` array.
pub async fn submit_lead(
    State(state): State<AppState>,
    headers: HeaderMap,
    AppJson(submission): AppJson<LeadSubmission>,
) -> Result<impl IntoResponse, AppError> {
    let ctx = ClientContext::from_headers(&headers);
    let submitted = leads::submit_lead(&state, submission, &ctx).await?;

    Ok((
        StatusCode::CREATED,
        Json(LeadResponse {
            success: true,
            message: submitted.message,
            lead_id: submitted.lead_id,
        }),
    ))
}
