//! Bridge script generation.
//!
//! When the telephony provider connects an outbound call, it fetches a voice
//! script telling it what to do next. Both bridging shapes this service uses
//! ("dial the customer who asked for a callback" and "dial the on-call
//! technician, then the fallback") are the same state machine, so they are
//! one parameterized `DialPlan` rendered by one generator.
//!
//! The script endpoint is invoked by the provider over a plain callback URL,
//! so every input is untrusted: interpolated values are XML-escaped and are
//! used for nothing beyond the dial target and text-to-speech strings.

use crate::models::lead::Locale;

/// Text-to-speech voice used for all spoken segments.
const VOICE: &str = "Polly.Joanna";

/// Ring timeout for a customer callback dial.
const CUSTOMER_DIAL_TIMEOUT_SECS: u32 = 30;

/// Ring timeout for each technician dial attempt.
const TECHNICIAN_DIAL_TIMEOUT_SECS: u32 = 20;

/// One dial attempt in a plan.
#[derive(Debug, Clone)]
pub struct DialStep {
    pub number: String,
    pub timeout_secs: u32,
}

/// An ordered voice script: greeting, dial attempts in order, and an
/// optional spoken message once every attempt has gone unanswered.
#[derive(Debug, Clone)]
pub struct DialPlan {
    pub greeting: String,
    pub language: &'static str,
    pub steps: Vec<DialStep>,
    pub unavailable_message: Option<String>,
}

impl DialPlan {
    /// The customer-callback bridge: greet the staff member who answered,
    /// dial the customer for 30 seconds, speak "unavailable" if unanswered.
    pub fn customer_bridge(customer_phone: &str, locale: Locale) -> Self {
        let (greeting, unavailable) = match locale {
            Locale::Es => ("Nuevo cliente esperando. Conectando ahora.", "El cliente no está disponible."),
            Locale::En => ("New customer waiting. Connecting now.", "Customer unavailable."),
        };
        Self {
            greeting: greeting.to_string(),
            language: locale.speech_language(),
            steps: vec![DialStep {
                number: customer_phone.to_string(),
                timeout_secs: CUSTOMER_DIAL_TIMEOUT_SECS,
            }],
            unavailable_message: Some(unavailable.to_string()),
        }
    }

    /// The technician bridge: dial the primary on-call number, then the
    /// fallback if unanswered.
    pub fn technician_fallback(primary: &str, fallback: &str) -> Self {
        Self {
            greeting: "Connecting you now.".to_string(),
            language: Locale::En.speech_language(),
            steps: vec![
                DialStep {
                    number: primary.to_string(),
                    timeout_secs: TECHNICIAN_DIAL_TIMEOUT_SECS,
                },
                DialStep {
                    number: fallback.to_string(),
                    timeout_secs: TECHNICIAN_DIAL_TIMEOUT_SECS,
                },
            ],
            unavailable_message: None,
        }
    }

    /// Render the plan as the provider's voice markup.
    ///
    /// `caller_id` is presented on each dial, omitted when empty (the
    /// no-telephony deployment has no sending number).
    pub fn render(&self, caller_id: &str) -> String {
        let mut doc = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<Response>\n");

        doc.push_str(&format!(
            "  <Say voice=\"{VOICE}\" language=\"{}\">{}</Say>\n",
            self.language,
            xml_escape(&self.greeting)
        ));

        for step in &self.steps {
            if caller_id.is_empty() {
                doc.push_str(&format!("  <Dial timeout=\"{}\">\n", step.timeout_secs));
            } else {
                doc.push_str(&format!(
                    "  <Dial timeout=\"{}\" callerId=\"{}\">\n",
                    step.timeout_secs,
                    xml_escape(caller_id)
                ));
            }
            doc.push_str(&format!("    <Number>{}</Number>\n", xml_escape(&step.number)));
            doc.push_str("  </Dial>\n");
        }

        if let Some(message) = &self.unavailable_message {
            doc.push_str(&format!(
                "  <Say voice=\"{VOICE}\" language=\"{}\">{}</Say>\n",
                self.language,
                xml_escape(message)
            ));
        }

        doc.push_str("</Response>");
        doc
    }
}

/// Escape text for placement inside XML content or attribute values, so no
/// query parameter can alter the document structure.
fn xml_escape(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
