//! Chat triage handler.

use axum::{Json, extract::State, http::HeaderMap, response::IntoResponse};

use crate::error::AppError;
use crate::extractors::AppJson;
use crate::models::chat::{TriageResponse, TriageSubmission};
use crate::models::lead::ClientContext;
use crate::services::triage;
use crate::state::AppState;

/// Triage a chat message.
///
/// # Request Body
///
/// ```json
/// { "message": "There was a flood in my basement", "locale": "en" }
/// ```
///
/// # Response (200)
///
/// ```json
/// { "success": true, "response": "…", "conversationId": "conv_8b5c…" }
/// ```
pub async fn triage_message(
    State(state): State<AppState>,
    headers: HeaderMap,
    AppJson(submission): AppJson<TriageSubmission>,
) -> Result<impl IntoResponse, AppError> {
    let ctx = ClientContext::from_headers(&headers);
    let reply = triage::triage_message(&state, submission, &ctx).await?;

    Ok(Json(TriageResponse {
        success: true,
        response: reply.response,
        conversation_id: reply.conversation_id,
    }))
}
