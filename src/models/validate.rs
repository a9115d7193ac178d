//! Field-level validation for the public intake endpoints.
//!
//! Validation collects every failed field instead of stopping at the first,
//! so one response round-trip is enough to correct a form. Nothing is
//! persisted before validation passes.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::FieldError;
use crate::models::chat::TriageSubmission;
use crate::models::lead::{CallbackSubmission, LeadSubmission, Locale};

/// Contact-number pattern: optional leading `+`, optional country `1`, then
/// 10–14 digits.
static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+?1?\d{10,14}$").expect("valid phone regex"));

static ZIP_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d{5}$").expect("valid zip regex"));

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid email regex"));

pub fn is_valid_phone(phone: &str) -> bool {
    PHONE_RE.is_match(phone)
}

/// A contact-form submission that passed validation.
#[derive(Debug, Clone)]
pub struct ValidatedLead {
    pub name: String,
    pub phone: String,
    pub email: String,
    pub zip: String,
    pub service: String,
    pub message: String,
    pub locale: Locale,
}

/// A callback-button submission that passed validation.
#[derive(Debug, Clone)]
pub struct ValidatedCallback {
    pub phone: String,
    pub locale: Locale,
}

/// A chat-triage submission that passed validation.
#[derive(Debug, Clone)]
pub struct ValidatedTriage {
    pub message: String,
    pub locale: Locale,
    pub conversation_id: Option<String>,
}

fn parse_locale(raw: Option<&str>, errors: &mut Vec<FieldError>) -> Locale {
    match raw {
        None => Locale::default(),
        Some("en") => Locale::En,
        Some("es") => Locale::Es,
        Some(_) => {
            errors.push(FieldError::new("locale", "Language must be en or es"));
            Locale::default()
        }
    }
}

/// Validate a contact-form submission, reporting every failed field.
pub fn validate_lead(submission: &LeadSubmission) -> Result<ValidatedLead, Vec<FieldError>> {
    let mut errors = Vec::new();

    if submission.name.trim().len() < 2 {
        errors.push(FieldError::new(
            "name",
            "Name must be at least 2 characters",
        ));
    }
    if !is_valid_phone(&submission.phone) {
        errors.push(FieldError::new("phone", "Invalid phone number"));
    }
    if !EMAIL_RE.is_match(&submission.email) {
        errors.push(FieldError::new("email", "Invalid email address"));
    }
    if !ZIP_RE.is_match(&submission.zip) {
        errors.push(FieldError::new("zip", "ZIP code must be 5 digits"));
    }
    if submission.service.trim().is_empty() {
        errors.push(FieldError::new("service", "Please select a service"));
    }
    if submission.message.trim().len() < 10 {
        errors.push(FieldError::new(
            "message",
            "Message must be at least 10 characters",
        ));
    }
    if !submission.consent {
        errors.push(FieldError::new("consent", "You must consent to contact"));
    }
    let locale = parse_locale(submission.locale.as_deref(), &mut errors);

    if !errors.is_empty() {
        return Err(errors);
    }

    Ok(ValidatedLead {
        name: submission.name.trim().to_string(),
        phone: submission.phone.clone(),
        email: submission.email.clone(),
        zip: submission.zip.clone(),
        service: submission.service.clone(),
        message: submission.message.trim().to_string(),
        locale,
    })
}

/// Validate a callback request: same phone pattern as the contact form.
pub fn validate_callback(
    submission: &CallbackSubmission,
) -> Result<ValidatedCallback, Vec<FieldError>> {
    let mut errors = Vec::new();

    if !is_valid_phone(&submission.phone) {
        errors.push(FieldError::new("phone", "Invalid phone number"));
    }
    let locale = parse_locale(submission.locale.as_deref(), &mut errors);

    if !errors.is_empty() {
        return Err(errors);
    }

    Ok(ValidatedCallback {
        phone: submission.phone.clone(),
        locale,
    })
}

/// Validate a chat-triage message: non-empty, bounded length.
pub fn validate_triage(submission: &TriageSubmission) -> Result<ValidatedTriage, Vec<FieldError>> {
    let mut errors = Vec::new();

    if submission.message.is_empty() {
        errors.push(FieldError::new("message", "Message cannot be empty"));
    } else if submission.message.chars().count() > 500 {
        errors.push(FieldError::new("message", "Message too long"));
    }
    let locale = parse_locale(submission.locale.as_deref(), &mut errors);

    if !errors.is_empty() {
        return Err(errors);
    }

    Ok(ValidatedTriage {
        message: submission.message.clone(),
        locale,
        conversation_id: submission.conversation_id.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_submission() -> LeadSubmission {
        LeadSubmission {
            name: "Jane Doe".to_string(),
            phone: "5035551234".to_string(),
            email: "jane@example.com".to_string(),
            zip: "97222".to_string(),
            service: "water-damage".to_string(),
            message: "Basement flooded overnight".to_string(),
            locale: Some("en".to_string()),
            consent: true,
        }
    }

    #[test]
    fn accepts_contact_number_shapes() {
        for phone in ["5035551234", "15035551234", "+15035551234", "+5035551234"] {
            assert!(is_valid_phone(phone), "expected {phone} to validate");
        }
    }

    #[test]
    fn rejects_malformed_phones() {
        for phone in ["abc", "123", "+1234", "503-555-1234", "", "5035551234x9"] {
            assert!(!is_valid_phone(phone), "expected {phone} to fail");
        }
    }

    #[test]
    fn valid_submission_passes() {
        let valid = validate_lead(&full_submission()).expect("should validate");
        assert_eq!(valid.locale, Locale::En);
        assert_eq!(valid.phone, "5035551234");
    }

    #[test]
    fn collects_every_failed_field() {
        let submission = LeadSubmission {
            name: "J".to_string(),
            phone: "nope".to_string(),
            email: "not-an-email".to_string(),
            zip: "123".to_string(),
            service: String::new(),
            message: "short".to_string(),
            locale: None,
            consent: false,
        };
        let errors = validate_lead(&submission).expect_err("should fail");
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(
            fields,
            vec!["name", "phone", "email", "zip", "service", "message", "consent"]
        );
    }

    #[test]
    fn consent_must_be_true() {
        let mut submission = full_submission();
        submission.consent = false;
        let errors = validate_lead(&submission).expect_err("should fail");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "consent");
        assert!(errors[0].message.contains("consent"));
    }

    #[test]
    fn unknown_locale_is_rejected_not_defaulted() {
        let mut submission = full_submission();
        submission.locale = Some("fr".to_string());
        let errors = validate_lead(&submission).expect_err("should fail");
        assert_eq!(errors[0].field, "locale");
    }

    #[test]
    fn absent_locale_defaults_to_english() {
        let mut submission = full_submission();
        submission.locale = None;
        let valid = validate_lead(&submission).expect("should validate");
        assert_eq!(valid.locale, Locale::En);
    }

    #[test]
    fn callback_rejects_bad_phone() {
        let errors = validate_callback(&CallbackSubmission {
            phone: "123".to_string(),
            locale: Some("es".to_string()),
        })
        .expect_err("should fail");
        assert_eq!(errors[0].field, "phone");
    }
}
