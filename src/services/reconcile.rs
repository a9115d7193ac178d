//! Call status reconciliation.
//!
//! The telephony provider reports call lifecycle changes as form-encoded
//! webhooks with at-least-once delivery and no ordering guarantee. This
//! module maps each report onto the originating lead:
//!
//! - transient states (`initiated`, `ringing`, `answered`) just mirror onto
//!   the lead
//! - terminal `completed` with more than 30 seconds on the call is treated
//!   as "staff reached the customer" and promotes the lead to `contacted`
//! - terminal `failed`/`no-answer` keeps the lead `new` and notes that
//!   manual follow-up is required
//! - anything else is recorded verbatim with no status transition
//!
//! Because delivery is unordered, updates are guarded by call stage: a
//! late-arriving earlier-stage report never overwrites a later one, and a
//! terminal status is only ever re-applied with the identical status
//! (idempotent redelivery), never replaced.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::error::AppError;
use crate::models::lead::{LeadPatch, LeadStatus};
use crate::state::AppState;

/// Call length above which a completed call counts as a real conversation.
const CONTACTED_MIN_DURATION_SECS: i64 = 30;

/// The provider's form-encoded status report. Every field may be absent; an
/// absent duration stays unknown, never zero.
#[derive(Debug, Deserialize)]
pub struct StatusReport {
    #[serde(rename = "CallSid")]
    pub call_sid: Option<String>,
    #[serde(rename = "CallStatus")]
    pub call_status: Option<String>,
    #[serde(rename = "CallDuration")]
    pub call_duration: Option<String>,
}

/// Apply one status report to the lead it correlates with.
///
/// A report with no call id or status, or one referencing a call no lead
/// knows about (webhook racing the call-id attach, or a call placed outside
/// this system), is acknowledged as a no-op. The provider retries on
/// non-2xx, so "nothing to do" must not look like failure.
pub async fn apply_status(state: &AppState, report: StatusReport) -> Result<(), AppError> {
    let (Some(call_sid), Some(call_status)) = (&report.call_sid, &report.call_status) else {
        tracing::warn!("status webhook missing CallSid or CallStatus, ignoring");
        return Ok(());
    };

    let Some(lead) = state.leads.find_by_call_sid(call_sid).await? else {
        tracing::info!(%call_sid, "status webhook for unknown call id, ignoring");
        return Ok(());
    };

    let duration = report
        .call_duration
        .as_deref()
        .and_then(|d| d.parse::<i64>().ok());

    let Some(patch) = plan_patch(
        lead.twilio_call_status.as_deref(),
        call_status,
        duration,
        Utc::now(),
    ) else {
        tracing::info!(
            %call_sid,
            incoming = %call_status,
            recorded = ?lead.twilio_call_status,
            "stale status webhook, ignoring"
        );
        return Ok(());
    };

    state.leads.patch(&lead.id, &patch).await?;
    tracing::info!(%call_sid, status = %call_status, duration = ?duration, "call status updated");
    Ok(())
}

/// Decide what (if anything) a status report writes to the lead.
///
/// Pure so the guard and the transition table are directly testable.
/// Returns `None` when the report is stale and must not be applied.
fn plan_patch(
    recorded: Option<&str>,
    incoming: &str,
    duration: Option<i64>,
    now: DateTime<Utc>,
) -> Option<LeadPatch> {
    if let Some(recorded) = recorded {
        if is_terminal(recorded) && recorded != incoming {
            return None;
        }
        if stage(incoming) < stage(recorded) {
            return None;
        }
    }

    let mut patch = LeadPatch {
        twilio_call_status: Some(incoming.to_string()),
        twilio_call_duration: duration,
        last_updated: Some(now),
        ..LeadPatch::default()
    };

    if incoming == "completed" && duration.is_some_and(|d| d > CONTACTED_MIN_DURATION_SECS) {
        patch.status = Some(LeadStatus::Contacted);
    } else if incoming == "failed" || incoming == "no-answer" {
        patch.status = Some(LeadStatus::New);
        patch.notes = Some(format!(
            "Automated callback {incoming}. Manual follow-up required."
        ));
    }

    Some(patch)
}

/// Position of a status in the call lifecycle. Unknown provider vocabulary
/// ranks last so it is recorded verbatim rather than dropped.
fn stage(status: &str) -> u8 {
    match status {
        "queued" | "initiated" => 0,
        "ringing" => 1,
        "in-progress" | "answered" => 2,
        _ => 3,
    }
}

fn is_terminal(status: &str) -> bool {
    matches!(
        status,
        "completed" | "failed" | "busy" | "no-answer" | "canceled"
    )
}
