//! Lead intake: the general contact form.

use crate::error::AppError;
use crate::models::lead::{ClientContext, LeadSubmission, Locale, NewLead};
use crate::models::validate::validate_lead;
use crate::rate_limit::LEAD_POLICY;
use crate::services::callback::rate_limit_message;
use crate::state::AppState;

/// A captured contact-form lead: the store id plus the localized
/// confirmation shown to the visitor.
#[derive(Debug)]
pub struct SubmittedLead {
    pub lead_id: String,
    pub message: String,
}

/// Validate and persist a contact-form submission.
///
/// # Flow
///
/// 1. Validate every field, reporting all failures at once
/// 2. Rate-limit per client IP (same component and policy style as the other
///    intake endpoints)
/// 3. Persist the lead with `source = website_contact_form`, `status = new`
///
/// Validation and rate-limit failures are terminal: nothing is written
/// before them. A store failure surfaces as the generic retry-or-call
/// message.
pub async fn submit_lead(
    state: &AppState,
    submission: LeadSubmission,
    ctx: &ClientContext,
) -> Result<SubmittedLead, AppError> {
    let valid = validate_lead(&submission).map_err(AppError::Validation)?;

    if !state.limits.lead.allow_policy(&ctx.ip, LEAD_POLICY) {
        return Err(AppError::RateLimited {
            message: rate_limit_message(valid.locale),
        });
    }

    let locale = valid.locale;
    let lead = NewLead::from_contact_form(valid, ctx);
    let lead_id = state.leads.create(&lead).await?;

    tracing::info!(%lead_id, service = %lead.service, "contact-form lead captured");

    Ok(SubmittedLead {
        lead_id,
        message: confirmation_message(locale),
    })
}

fn confirmation_message(locale: Locale) -> String {
    match locale {
        Locale::Es => "Gracias por su mensaje. Nos pondremos en contacto pronto.",
        Locale::En => "Thank you for your message. We will contact you shortly.",
    }
    .to_string()
}
