//! The telephony seam: placing outbound bridge calls.
//!
//! Call placement is the one side effect the callback flow tolerates losing:
//! the lead is already persisted before a call is attempted, so every error
//! here is consumed by the caller as the "lead saved, call failed" branch
//! rather than propagated to the visitor.

use async_trait::async_trait;

use crate::config::TelephonyConfig;

/// Per-request timeout on call placement. The provider SDKs default to much
/// longer; the visitor-facing response is waiting on this, so it is bounded
/// explicitly. Timeout counts as placement failure.
const REQUEST_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(5);

/// One outbound call to place.
///
/// `voice_url` is fetched by the provider when the call connects and must
/// serve the bridge script; `status_callback` receives the lifecycle
/// webhooks for the events listed in `status_events`.
#[derive(Debug, Clone)]
pub struct CallRequest {
    pub to: String,
    pub from: String,
    pub voice_url: String,
    pub status_callback: String,
    pub status_events: Vec<&'static str>,
}

/// Lifecycle events the callback flow subscribes to.
pub const STATUS_EVENTS: [&str; 4] = ["initiated", "ringing", "answered", "completed"];

#[derive(Debug, thiserror::Error)]
pub enum TelephonyError {
    /// The HTTP request failed (connect, timeout, TLS).
    #[error("telephony request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The provider rejected the call placement.
    #[error("telephony provider returned status {status}: {body}")]
    Provider { status: u16, body: String },

    /// The provider answered 2xx without a call id.
    #[error("malformed telephony response: {0}")]
    Malformed(String),
}

/// A voice-call service that can place one outbound call and report its
/// lifecycle asynchronously.
#[async_trait]
pub trait TelephonyClient: Send + Sync {
    /// Place the call, returning the provider's opaque call id on success.
    async fn place_call(&self, call: &CallRequest) -> Result<String, TelephonyError>;
}

/// Twilio REST implementation of the telephony seam.
pub struct TwilioClient {
    http: reqwest::Client,
    calls_url: String,
    account_sid: String,
    auth_token: String,
}

#[derive(Debug, serde::Deserialize)]
struct CallResource {
    sid: String,
}

impl TwilioClient {
    pub fn new(config: &TelephonyConfig) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            http,
            calls_url: format!(
                "https://api.twilio.com/2010-04-01/Accounts/{}/Calls.json",
                config.account_sid
            ),
            account_sid: config.account_sid.clone(),
            auth_token: config.auth_token.clone(),
        })
    }
}

#[async_trait]
impl TelephonyClient for TwilioClient {
    async fn place_call(&self, call: &CallRequest) -> Result<String, TelephonyError> {
        // Form-encoded per the provider API; StatusCallbackEvent repeats once
        // per subscribed event.
        let mut params: Vec<(&str, &str)> = vec![
            ("To", call.to.as_str()),
            ("From", call.from.as_str()),
            ("Url", call.voice_url.as_str()),
            ("StatusCallback", call.status_callback.as_str()),
        ];
        for event in &call.status_events {
            params.push(("StatusCallbackEvent", *event));
        }

        let response = self
            .http
            .post(&self.calls_url)
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .form(&params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TelephonyError::Provider {
                status: status.as_u16(),
                body,
            });
        }

        let resource = response
            .json::<CallResource>()
            .await
            .map_err(|e| TelephonyError::Malformed(e.to_string()))?;
        Ok(resource.sid)
    }
}
