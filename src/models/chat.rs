//! Chat triage request/response types.

use serde::{Deserialize, Serialize};

/// Triage message from the site's chat widget.
///
/// # JSON Example
///
/// ```json
/// {
///   "message": "There was a flood in my basement, who do I call?",
///   "locale": "en",
///   "conversationId": "conv_8b5c…"
/// }
/// ```
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TriageSubmission {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub locale: Option<String>,
    #[serde(default)]
    pub conversation_id: Option<String>,
}

/// Triage reply returned to the widget.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TriageResponse {
    pub success: bool,
    pub response: String,
    pub conversation_id: String,
}
