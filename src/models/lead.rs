//! Lead data models and API request/response types.
//!
//! This module defines:
//! - `Lead`: the document persisted in the content store (wire names follow
//!   the store schema, camelCase)
//! - `NewLead` / `LeadPatch`: the create and patch shapes written by this
//!   service
//! - Request types for the contact form and the callback button
//! - Response bodies returned to the browser

use axum::http::HeaderMap;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::validate::ValidatedLead;

/// Visitor language, a closed two-value set.
///
/// Anything other than `en`/`es` at the boundary is a validation error rather
/// than a silent default; an *absent* locale defaults to English.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    Es,
}

impl Locale {
    pub fn as_str(&self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::Es => "es",
        }
    }

    /// Language tag used in the provider's text-to-speech markup.
    pub fn speech_language(&self) -> &'static str {
        match self {
            Locale::En => "en-US",
            Locale::Es => "es-US",
        }
    }
}

/// Where a lead came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeadSource {
    WebsiteContactForm,
    CallbackButton,
}

/// Lead lifecycle status as written by this subsystem.
///
/// The store schema also knows `qualified`/`converted`/`lost`; those are set
/// by humans in the studio and never written here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LeadStatus {
    New,
    Contacted,
}

/// A lead document as read back from the content store.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lead {
    /// Store-assigned opaque id
    #[serde(rename = "_id")]
    pub id: String,

    pub name: String,
    pub phone: String,
    pub email: String,
    pub zip: String,
    pub service: String,
    pub message: String,

    #[serde(default)]
    pub locale: Locale,
    pub source: LeadSource,

    /// Kept as a plain string on read: humans may have moved the lead past
    /// the states this service writes.
    pub status: String,

    pub user_agent: String,
    pub ip: String,
    pub created_at: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub twilio_call_sid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub twilio_call_status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub twilio_call_duration: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime<Utc>>,
}

/// The create shape for a new lead document.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewLead {
    pub name: String,
    pub phone: String,
    pub email: String,
    pub zip: String,
    pub service: String,
    pub message: String,
    pub locale: Locale,
    pub source: LeadSource,
    pub status: LeadStatus,
    pub user_agent: String,
    pub ip: String,
    pub created_at: DateTime<Utc>,
}

impl NewLead {
    /// A full lead from a validated contact-form submission.
    pub fn from_contact_form(form: ValidatedLead, ctx: &ClientContext) -> Self {
        Self {
            name: form.name,
            phone: form.phone,
            email: form.email,
            zip: form.zip,
            service: form.service,
            message: form.message,
            locale: form.locale,
            source: LeadSource::WebsiteContactForm,
            status: LeadStatus::New,
            user_agent: ctx.user_agent.clone(),
            ip: ctx.ip.clone(),
            created_at: Utc::now(),
        }
    }

    /// A minimal lead from the callback button: just phone and locale, with
    /// sentinel values for the contact-form-only fields.
    pub fn from_callback(phone: String, locale: Locale, ctx: &ClientContext) -> Self {
        Self {
            name: "Callback Request".to_string(),
            phone,
            email: "callback@olimpiasbiohazard.com".to_string(),
            zip: "00000".to_string(),
            service: "emergency-callback".to_string(),
            message: "User requested immediate callback".to_string(),
            locale,
            source: LeadSource::CallbackButton,
            status: LeadStatus::New,
            user_agent: ctx.user_agent.clone(),
            ip: ctx.ip.clone(),
            created_at: Utc::now(),
        }
    }
}

/// A partial update applied to an existing lead document.
///
/// Only `Some` fields are written; leads are never mutated except through
/// this shape (call-sid attach, status reconciliation).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub twilio_call_sid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub twilio_call_status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub twilio_call_duration: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<LeadStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime<Utc>>,
}

impl LeadPatch {
    /// The attach written right after call placement.
    pub fn attach_call_sid(call_sid: String) -> Self {
        Self {
            twilio_call_sid: Some(call_sid),
            ..Self::default()
        }
    }
}

/// Best-effort request provenance recorded on every lead.
#[derive(Debug, Clone)]
pub struct ClientContext {
    pub ip: String,
    pub user_agent: String,
}

impl ClientContext {
    /// Extract provenance from forwarding headers. Clients with no forwarding
    /// header all share the `"unknown"` identity (and therefore one
    /// rate-limit bucket).
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let ip = headers
            .get("x-forwarded-for")
            .or_else(|| headers.get("x-real-ip"))
            .and_then(|v| v.to_str().ok())
            .map(|v| v.split(',').next().unwrap_or(v).trim().to_string())
            .unwrap_or_else(|| "unknown".to_string());

        let user_agent = headers
            .get("user-agent")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("unknown")
            .to_string();

        Self { ip, user_agent }
    }
}

/// Contact-form submission as received from the browser.
///
/// # JSON Example
///
/// ```json
/// {
///   "name": "Jane Doe",
///   "phone": "5035551234",
///   "email": "jane@example.com",
///   "zip": "97222",
///   "service": "water-damage",
///   "message": "Basement flooded overnight",
///   "locale": "en",
///   "consent": true
/// }
/// ```
///
/// Fields arrive as loose strings and are validated as a batch so the
/// response can enumerate every problem at once.
#[derive(Debug, Deserialize)]
pub struct LeadSubmission {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub zip: String,
    #[serde(default)]
    pub service: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub locale: Option<String>,
    #[serde(default)]
    pub consent: bool,
}

/// Callback-button submission: phone only, plus locale.
#[derive(Debug, Deserialize)]
pub struct CallbackSubmission {
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub locale: Option<String>,
}

/// Response for a successful contact-form submission.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadResponse {
    pub success: bool,
    pub message: String,
    pub lead_id: String,
}

/// Response for a successful callback request.
///
/// `warning` is present when the lead was captured but automated dialing
/// failed. The visitor is still told success (the request reached the
/// queue) and staff follow up manually.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CallbackResponse {
    pub success: bool,
    pub message: String,
    pub callback_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}
