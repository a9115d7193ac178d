//! Callback requests: capture a phone-only lead, then bridge staff to the
//! customer through the telephony provider.
//!
//! Lead capture is the primary guarantee; the automated call is best-effort.
//! Once the lead is persisted, no telephony failure is allowed to fail the
//! request: the visitor already reached the queue, so they are told success
//! and staff are flagged for manual follow-up instead.

use url::Url;

use crate::error::AppError;
use crate::models::lead::{CallbackSubmission, ClientContext, LeadPatch, Locale, NewLead};
use crate::models::validate::{ValidatedCallback, validate_callback};
use crate::rate_limit::CALLBACK_POLICY;
use crate::state::AppState;
use crate::telephony::{CallRequest, STATUS_EVENTS, TelephonyClient};

/// Warning attached to the response when the lead was captured but the
/// automated dial did not go out.
pub const CALL_FAILED_WARNING: &str =
    "Automated callback failed, manual follow-up will be initiated";

/// What happened to the automated call after the lead was persisted.
///
/// A first-class result rather than an exception path: the handler maps
/// `Failed` to a warning field, and tests exercise the branch directly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallOutcome {
    /// Call placed; the provider's call id is attached to the lead.
    Placed { call_sid: String },
    /// Placement was attempted (or should have been) and did not succeed:
    /// provider error, timeout, missing on-call number, or a failed call-id
    /// attach. Manual follow-up required.
    Failed,
    /// No telephony integration configured. This is the expected
    /// capture-only deployment mode, not a failure.
    NotConfigured,
}

/// A processed callback request.
#[derive(Debug)]
pub struct CallbackReceipt {
    pub lead_id: String,
    pub message: String,
    pub outcome: CallOutcome,
}

/// Validate, rate-limit, persist, and bridge a callback request.
///
/// # Flow
///
/// 1. Validate `{ phone, locale }` (same phone pattern as the contact form)
/// 2. Rate-limit per client IP; exceeded means a localized 429 and no
///    further side effects
/// 3. Persist a minimal lead (`source = callback_button`)
/// 4. If telephony is configured, place the bridge call and attach the
///    returned call id to the lead
///
/// Steps 1–3 can fail the request. Step 4 cannot: its result is data on the
/// receipt.
pub async fn request_callback(
    state: &AppState,
    submission: CallbackSubmission,
    ctx: &ClientContext,
) -> Result<CallbackReceipt, AppError> {
    let valid = validate_callback(&submission).map_err(AppError::Validation)?;

    if !state.limits.callback.allow_policy(&ctx.ip, CALLBACK_POLICY) {
        return Err(AppError::RateLimited {
            message: rate_limit_message(valid.locale),
        });
    }

    let lead = NewLead::from_callback(valid.phone.clone(), valid.locale, ctx);
    let lead_id = state.leads.create(&lead).await?;
    tracing::info!(%lead_id, "callback lead captured");

    let outcome = match &state.telephony {
        Some(client) => place_bridge_call(state, client.as_ref(), &lead_id, &valid).await,
        None => CallOutcome::NotConfigured,
    };

    Ok(CallbackReceipt {
        lead_id,
        message: confirmation_message(valid.locale),
        outcome,
    })
}

/// Place the staff-to-customer bridge call for a freshly captured lead.
///
/// The provider dials the on-call number first; when that leg answers it
/// fetches the bridge script, which dials the customer.
async fn place_bridge_call(
    state: &AppState,
    client: &dyn TelephonyClient,
    lead_id: &str,
    valid: &ValidatedCallback,
) -> CallOutcome {
    let Some(on_call) = state.config.on_call_number() else {
        tracing::warn!(%lead_id, "no on-call phone number configured, skipping automated dial");
        return CallOutcome::Failed;
    };

    let (voice_url, status_callback) =
        match build_callback_urls(&state.config.public_base_url, &valid.phone, valid.locale) {
            Ok(urls) => urls,
            Err(err) => {
                tracing::error!(error = %err, "PUBLIC_BASE_URL is not a valid base URL");
                return CallOutcome::Failed;
            }
        };

    let call = CallRequest {
        to: on_call.to_string(),
        from: state.config.caller_id().to_string(),
        voice_url,
        status_callback,
        status_events: STATUS_EVENTS.to_vec(),
    };

    match client.place_call(&call).await {
        Ok(call_sid) => {
            // Attach the call id so status webhooks can find this lead. If
            // the attach fails the webhooks have nothing to correlate
            // against, so this counts as a failed automation too.
            match state
                .leads
                .patch(lead_id, &LeadPatch::attach_call_sid(call_sid.clone()))
                .await
            {
                Ok(()) => {
                    tracing::info!(%lead_id, %call_sid, "bridge call placed");
                    CallOutcome::Placed { call_sid }
                }
                Err(err) => {
                    tracing::error!(error = %err, %lead_id, %call_sid, "failed to attach call id to lead");
                    CallOutcome::Failed
                }
            }
        }
        Err(err) => {
            tracing::error!(error = %err, %lead_id, "automated callback placement failed");
            CallOutcome::Failed
        }
    }
}

/// Build the bridge-script and status-callback URLs handed to the provider.
/// The customer phone rides along as a query parameter, so it is
/// percent-encoded here and XML-escaped again at render time.
fn build_callback_urls(
    base: &str,
    customer_phone: &str,
    locale: Locale,
) -> Result<(String, String), url::ParseError> {
    let base = Url::parse(base)?;

    let mut voice = base.clone();
    voice.set_path("/api/callback/bridge");
    voice
        .query_pairs_mut()
        .append_pair("customer", customer_phone)
        .append_pair("locale", locale.as_str());

    let mut status = base;
    status.set_path("/api/callback/status");

    Ok((voice.to_string(), status.to_string()))
}

fn confirmation_message(locale: Locale) -> String {
    match locale {
        Locale::Es => "Solicitud recibida. Le llamaremos en breve.",
        Locale::En => "Request received. We will call you shortly.",
    }
    .to_string()
}

pub(crate) fn rate_limit_message(locale: Locale) -> String {
    match locale {
        Locale::Es => {
            "Ha alcanzado el límite de solicitudes. Por favor intente nuevamente en unos minutos."
        }
        Locale::En => "Rate limit exceeded. Please try again in a few minutes.",
    }
    .to_string()
}
