//! Chat triage: route distressed visitors to the right service.
//!
//! The site's chat widget forwards messages here. After validation, rate
//! limiting, and a blocked-content screen, the message goes to the triage
//! model with a locale-appropriate system prompt. Deployments without a
//! model API key get a canned fallback pointing at the 24/7 line instead;
//! the endpoint never hard-fails just because the model integration is off.

use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::chat::TriageSubmission;
use crate::models::lead::{ClientContext, Locale};
use crate::models::validate::validate_triage;
use crate::rate_limit::CHAT_POLICY;
use crate::state::AppState;

/// Messages API endpoint for the triage model.
const ANTHROPIC_MESSAGES_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const DEFAULT_MODEL: &str = "claude-opus-5";

/// Cap on the triage reply. Generous headroom over the prompted 150-word
/// limit: on current models this also bounds internal reasoning tokens.
const MAX_TOKENS: u32 = 1024;

const REQUEST_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(10);

const SYSTEM_PROMPT_EN: &str = "You are a compassionate, professional triage assistant for Olimpia's Biohazard & Restoration, a biohazard cleanup and emergency restoration company in Portland Metro, Oregon.

YOUR ROLE:
- Help users understand what services they need
- Provide immediate guidance for emergency situations
- Route to appropriate services
- Be empathetic - users are often in distress

SERVICES OFFERED:
1. Crime Scene Cleanup - blood, bodily fluids, forensic cleaning
2. Biohazard Remediation - biological hazards, contamination
3. Unattended Death Cleanup - respectful, thorough decontamination
4. Water Damage Restoration - flooding, leaks, sewage
5. Fire Damage Restoration - smoke, soot, structural damage
6. Hoarding Cleanup - compassionate decluttering and sanitization

EMERGENCY GUIDANCE:
- If immediate danger (ongoing hazard): Direct to call 911 first, then our 24/7 line
- If biohazard present: Do not touch, keep others away, ventilate if safe
- If insurance question: We work with all major insurers, provide documentation

IMPORTANT RULES:
- Never give medical advice
- Never make light of traumatic situations
- If unsure, recommend calling our 24/7 line: (503) 555-1234
- Keep responses under 150 words
- Be direct and actionable
- Never discuss pricing (say \"call for free estimate\")

If user needs immediate help, end with: \"For 24/7 emergency service, call (503) 555-1234 or click 'Call Now' above.\"";

const SYSTEM_PROMPT_ES: &str = "Eres un asistente de triaje compasivo y profesional para Olimpia's Biohazard & Restoration, una empresa de limpieza de materiales peligrosos y restauración de emergencias en el área metropolitana de Portland, Oregon.

TU FUNCIÓN:
- Ayudar a los usuarios a entender qué servicios necesitan
- Proporcionar orientación inmediata para situaciones de emergencia
- Dirigir a los servicios apropiados
- Ser empático: los usuarios a menudo están angustiados

SERVICIOS OFRECIDOS:
1. Limpieza de Escena del Crimen - sangre, fluidos corporales, limpieza forense
2. Remediación de Materiales Peligrosos - peligros biológicos, contaminación
3. Limpieza de Muerte sin Atención - descontaminación respetuosa y completa
4. Restauración de Daños por Agua - inundaciones, fugas, aguas residuales
5. Restauración de Daños por Fuego - humo, hollín, daños estructurales
6. Limpieza de Acumulación - desorden compasivo y saneamiento

ORIENTACIÓN DE EMERGENCIA:
- Si hay peligro inmediato (peligro continuo): Dirigir a llamar al 911 primero, luego a nuestra línea 24/7
- Si hay material peligroso presente: No tocar, mantener a otros alejados, ventilar si es seguro
- Si pregunta de seguro: Trabajamos con todos los aseguradores principales, proporcionamos documentación

REGLAS IMPORTANTES:
- Nunca dar consejos médicos
- Nunca hacer luz de situaciones traumáticas
- Si no estás seguro, recomienda llamar a nuestra línea 24/7: (503) 555-1234
- Mantén las respuestas bajo 150 palabras
- Sé directo y práctico
- Nunca discutas precios (di \"llame para una estimación gratuita\")

Si el usuario necesita ayuda inmediata, termina con: \"Para servicio de emergencia 24/7, llame al (503) 555-1234 o haga clic en 'Llamar Ahora' arriba.\"";

static SPAM_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(spam|viagra|cialis|casino|lottery|winner)\b").expect("valid spam regex")
});

static URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(http|https|www\.)").expect("valid url regex"));

/// HTTP client for the triage model API. Raw Messages API over reqwest; the
/// model is pinned by configuration, not per request.
pub struct TriageClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
}

#[derive(Debug, thiserror::Error)]
pub enum TriageError {
    #[error("triage model request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("triage model returned status {status}: {body}")]
    Api { status: u16, body: String },

    #[error("malformed triage model response")]
    Malformed,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    block_type: String,
    #[serde(default)]
    text: String,
}

impl TriageClient {
    pub fn new(api_key: String) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            http,
            api_key,
            model: DEFAULT_MODEL.to_string(),
        })
    }

    /// Ask the model to triage one message. Returns the reply text.
    pub async fn triage(&self, message: &str, locale: Locale) -> Result<String, TriageError> {
        let system = match locale {
            Locale::Es => SYSTEM_PROMPT_ES,
            Locale::En => SYSTEM_PROMPT_EN,
        };

        let response = self
            .http
            .post(ANTHROPIC_MESSAGES_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&json!({
                "model": self.model,
                "max_tokens": MAX_TOKENS,
                "system": system,
                "messages": [{ "role": "user", "content": message }],
            }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TriageError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let body = response
            .json::<MessagesResponse>()
            .await
            .map_err(|_| TriageError::Malformed)?;

        body.content
            .into_iter()
            .find(|block| block.block_type == "text")
            .map(|block| block.text)
            .ok_or(TriageError::Malformed)
    }
}

/// A triage reply plus the conversation id it belongs to.
#[derive(Debug)]
pub struct TriageReply {
    pub response: String,
    pub conversation_id: String,
}

/// Screen, rate-limit, and answer one chat message.
pub async fn triage_message(
    state: &AppState,
    submission: TriageSubmission,
    ctx: &ClientContext,
) -> Result<TriageReply, AppError> {
    let valid = validate_triage(&submission).map_err(AppError::Validation)?;

    if !state.limits.chat.allow_policy(&ctx.ip, CHAT_POLICY) {
        return Err(AppError::RateLimited {
            message: rate_limit_message(valid.locale),
        });
    }

    if contains_blocked_content(&valid.message) {
        return Err(AppError::BadRequest {
            message: blocked_message(valid.locale),
        });
    }

    let conversation_id = valid
        .conversation_id
        .unwrap_or_else(|| format!("conv_{}", Uuid::new_v4()));

    let Some(client) = &state.triage else {
        // No model API key configured - point at the 24/7 line instead.
        return Ok(TriageReply {
            response: fallback_message(valid.locale),
            conversation_id,
        });
    };

    match client.triage(&valid.message, valid.locale).await {
        Ok(response) => Ok(TriageReply {
            response,
            conversation_id,
        }),
        Err(err) => {
            tracing::error!(error = %err, "triage model call failed");
            Err(AppError::TriageUnavailable {
                message: "Service temporarily unavailable. Please call (503) 555-1234 for immediate assistance.".to_string(),
            })
        }
    }
}

/// Spam/abuse screen: spam keywords, URLs, and long repeated-character runs.
fn contains_blocked_content(message: &str) -> bool {
    SPAM_RE.is_match(message) || URL_RE.is_match(message) || has_repeated_run(message, 11)
}

/// True if any character repeats `run_len` or more times consecutively.
/// (The regex crate has no backreferences, so this check is a plain loop.)
fn has_repeated_run(message: &str, run_len: usize) -> bool {
    let mut last: Option<char> = None;
    let mut count = 0;
    for c in message.chars() {
        if Some(c) == last {
            count += 1;
            if count >= run_len {
                return true;
            }
        } else {
            last = Some(c);
            count = 1;
        }
    }
    false
}

fn rate_limit_message(locale: Locale) -> String {
    match locale {
        Locale::Es => "Demasiadas solicitudes. Por favor intente nuevamente en un momento.",
        Locale::En => "Too many requests. Please try again in a moment.",
    }
    .to_string()
}

fn blocked_message(locale: Locale) -> String {
    match locale {
        Locale::Es => "Lo siento, no puedo ayudar con ese tipo de solicitud.",
        Locale::En => "I'm sorry, I can't help with that type of request.",
    }
    .to_string()
}

fn fallback_message(locale: Locale) -> String {
    match locale {
        Locale::Es => {
            "Gracias por contactarnos. Para asistencia inmediata, por favor llame a nuestra línea 24/7 al (503) 555-1234."
        }
        Locale::En => {
            "Thank you for contacting us. For immediate assistance, please call our 24/7 line at (503) 555-1234."
        }
    }
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn screens_spam_keywords_and_urls() {
        assert!(contains_blocked_content("cheap viagra here"));
        assert!(contains_blocked_content("visit www.example.com now"));
        assert!(contains_blocked_content("see https://spam.example"));
        assert!(!contains_blocked_content("my basement flooded last night"));
    }

    #[test]
    fn screens_repeated_character_runs() {
        assert!(contains_blocked_content(&"a".repeat(20)));
        assert!(!contains_blocked_content("aaah, that is bad"));
    }
}
