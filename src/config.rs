//! Application configuration management.
//!
//! This module handles loading configuration from environment variables.
//! It uses the `envy` crate to automatically deserialize environment variables into a type-safe struct.
//!
//! Telephony and triage are intentionally optional: a deployment without
//! Twilio credentials still captures leads (the callback endpoint degrades to
//! "lead saved, no auto-dial"), and a deployment without a model API key
//! serves the canned triage fallback.

use serde::Deserialize;

/// Application configuration loaded from environment variables.
///
/// # Environment Variables
///
/// - `SERVER_PORT` (optional): HTTP server port, defaults to 3000
/// - `PUBLIC_BASE_URL` (optional): base URL used to build the bridge-script
///   and status-callback URLs handed to the telephony provider
/// - `SANITY_PROJECT_ID` / `SANITY_DATASET` (optional): content store target
/// - `SANITY_API_TOKEN` (required): content store write token
/// - `TWILIO_ACCOUNT_SID` / `TWILIO_AUTH_TOKEN` / `TWILIO_PHONE_NUMBER`
///   (optional): all three must be present to enable outbound calls
/// - `ON_CALL_PHONE` / `BUSINESS_PHONE` (optional): callback destination,
///   primary then fallback
/// - `ON_CALL_NUMBER_PRIMARY` / `ON_CALL_NUMBER_FALLBACK` (optional):
///   technician bridge dial plan
/// - `ANTHROPIC_API_KEY` (optional): enables model-backed chat triage
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "default_port")]
    pub server_port: u16,

    #[serde(default = "default_base_url")]
    pub public_base_url: String,

    #[serde(default = "default_project_id")]
    pub sanity_project_id: String,

    #[serde(default = "default_dataset")]
    pub sanity_dataset: String,

    pub sanity_api_token: String,

    pub twilio_account_sid: Option<String>,
    pub twilio_auth_token: Option<String>,
    pub twilio_phone_number: Option<String>,

    pub on_call_phone: Option<String>,
    pub business_phone: Option<String>,

    pub on_call_number_primary: Option<String>,
    pub on_call_number_fallback: Option<String>,

    pub anthropic_api_key: Option<String>,
}

/// Default port if SERVER_PORT environment variable is not set.
fn default_port() -> u16 {
    3000
}

fn default_base_url() -> String {
    "https://www.olimpiasbiohazard.com".to_string()
}

fn default_project_id() -> String {
    "7phj7yjk".to_string()
}

fn default_dataset() -> String {
    "production".to_string()
}

/// Telephony credentials, present only when fully configured.
#[derive(Debug, Clone)]
pub struct TelephonyConfig {
    pub account_sid: String,
    pub auth_token: String,
    pub from_number: String,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Loads a `.env` file first if one exists, then deserializes the
    /// environment into a `Config`.
    ///
    /// # Errors
    ///
    /// Returns an error if required variables are missing (e.g.
    /// SANITY_API_TOKEN) or values cannot be parsed into the expected types.
    pub fn from_env() -> Result<Self, envy::Error> {
        // Try to load .env file if it exists (does nothing if not found)
        dotenvy::dotenv().ok();

        // Field names are automatically converted: public_base_url -> PUBLIC_BASE_URL
        envy::from_env::<Config>()
    }

    /// Telephony credentials, or `None` when any of the three variables is
    /// absent. Absence is the expected no-telephony deployment mode, not an
    /// error.
    pub fn telephony(&self) -> Option<TelephonyConfig> {
        match (
            &self.twilio_account_sid,
            &self.twilio_auth_token,
            &self.twilio_phone_number,
        ) {
            (Some(sid), Some(token), Some(from)) => Some(TelephonyConfig {
                account_sid: sid.clone(),
                auth_token: token.clone(),
                from_number: from.clone(),
            }),
            _ => None,
        }
    }

    /// The number an automated callback dials first: the on-call phone, with
    /// the main business line as fallback.
    pub fn on_call_number(&self) -> Option<&str> {
        self.on_call_phone
            .as_deref()
            .or(self.business_phone.as_deref())
    }

    /// Primary and fallback technician numbers for the technician bridge, or
    /// `None` when either is unconfigured.
    pub fn technician_numbers(&self) -> Option<(&str, &str)> {
        match (
            self.on_call_number_primary.as_deref(),
            self.on_call_number_fallback.as_deref(),
        ) {
            (Some(primary), Some(fallback)) => Some((primary, fallback)),
            _ => None,
        }
    }

    /// The caller id presented on outbound dials. Empty when telephony is
    /// not configured (the provider never invokes the bridge script in that
    /// deployment).
    pub fn caller_id(&self) -> &str {
        self.twilio_phone_number.as_deref().unwrap_or_default()
    }
}
