//! Shared test harness: in-memory fakes for the lead store and telephony
//! seams, plus helpers for driving the router in-process.
#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use parking_lot::Mutex;
use serde_json::Value;
use tower::ServiceExt;

use lead_capture_server::config::Config;
use lead_capture_server::models::lead::{Lead, LeadPatch, LeadStatus, NewLead};
use lead_capture_server::rate_limit::EndpointLimits;
use lead_capture_server::router;
use lead_capture_server::state::AppState;
use lead_capture_server::store::{LeadStore, StoreError};
use lead_capture_server::telephony::{CallRequest, TelephonyClient, TelephonyError};

fn status_str(status: LeadStatus) -> String {
    match status {
        LeadStatus::New => "new",
        LeadStatus::Contacted => "contacted",
    }
    .to_string()
}

/// Lead store backed by a vec, mimicking the document store's
/// create/find/patch surface.
#[derive(Default)]
pub struct InMemoryLeadStore {
    pub leads: Mutex<Vec<Lead>>,
}

impl InMemoryLeadStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn lead(&self, id: &str) -> Option<Lead> {
        self.leads.lock().iter().find(|l| l.id == id).cloned()
    }

    pub fn count(&self) -> usize {
        self.leads.lock().len()
    }
}

#[async_trait]
impl LeadStore for InMemoryLeadStore {
    async fn create(&self, lead: &NewLead) -> Result<String, StoreError> {
        let mut leads = self.leads.lock();
        let id = format!("lead-{}", leads.len() + 1);
        leads.push(Lead {
            id: id.clone(),
            name: lead.name.clone(),
            phone: lead.phone.clone(),
            email: lead.email.clone(),
            zip: lead.zip.clone(),
            service: lead.service.clone(),
            message: lead.message.clone(),
            locale: lead.locale,
            source: lead.source,
            status: status_str(lead.status),
            user_agent: lead.user_agent.clone(),
            ip: lead.ip.clone(),
            created_at: lead.created_at,
            twilio_call_sid: None,
            twilio_call_status: None,
            twilio_call_duration: None,
            notes: None,
            last_updated: None,
        });
        Ok(id)
    }

    async fn find_by_call_sid(&self, call_sid: &str) -> Result<Option<Lead>, StoreError> {
        Ok(self
            .leads
            .lock()
            .iter()
            .find(|l| l.twilio_call_sid.as_deref() == Some(call_sid))
            .cloned())
    }

    async fn patch(&self, id: &str, patch: &LeadPatch) -> Result<(), StoreError> {
        let mut leads = self.leads.lock();
        let lead = leads
            .iter_mut()
            .find(|l| l.id == id)
            .ok_or_else(|| StoreError::Malformed(format!("no lead with id {id}")))?;

        if let Some(sid) = &patch.twilio_call_sid {
            lead.twilio_call_sid = Some(sid.clone());
        }
        if let Some(status) = &patch.twilio_call_status {
            lead.twilio_call_status = Some(status.clone());
        }
        if let Some(duration) = patch.twilio_call_duration {
            lead.twilio_call_duration = Some(duration);
        }
        if let Some(status) = patch.status {
            lead.status = status_str(status);
        }
        if let Some(notes) = &patch.notes {
            lead.notes = Some(notes.clone());
        }
        if let Some(updated) = patch.last_updated {
            lead.last_updated = Some(updated);
        }
        Ok(())
    }
}

/// Lead store whose writes always fail, for exercising the opaque-500 path.
pub struct FailingLeadStore;

#[async_trait]
impl LeadStore for FailingLeadStore {
    async fn create(&self, _lead: &NewLead) -> Result<String, StoreError> {
        Err(StoreError::UnexpectedStatus(503))
    }

    async fn find_by_call_sid(&self, _call_sid: &str) -> Result<Option<Lead>, StoreError> {
        Err(StoreError::UnexpectedStatus(503))
    }

    async fn patch(&self, _id: &str, _patch: &LeadPatch) -> Result<(), StoreError> {
        Err(StoreError::UnexpectedStatus(503))
    }
}

/// Telephony client that records placements and answers with a fixed sid,
/// or errors, for the degraded path.
pub struct FakeTelephony {
    pub calls: Mutex<Vec<CallRequest>>,
    fail: bool,
}

impl FakeTelephony {
    pub fn answering() -> Arc<Self> {
        Arc::new(Self {
            calls: Mutex::new(Vec::new()),
            fail: false,
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            calls: Mutex::new(Vec::new()),
            fail: true,
        })
    }
}

#[async_trait]
impl TelephonyClient for FakeTelephony {
    async fn place_call(&self, call: &CallRequest) -> Result<String, TelephonyError> {
        self.calls.lock().push(call.clone());
        if self.fail {
            return Err(TelephonyError::Provider {
                status: 500,
                body: "upstream unavailable".to_string(),
            });
        }
        Ok("CA1234567890abcdef".to_string())
    }
}

pub fn test_config() -> Config {
    Config {
        server_port: 0,
        public_base_url: "https://example.com".to_string(),
        sanity_project_id: "testproject".to_string(),
        sanity_dataset: "test".to_string(),
        sanity_api_token: "test-token".to_string(),
        twilio_account_sid: Some("AC0000".to_string()),
        twilio_auth_token: Some("secret".to_string()),
        twilio_phone_number: Some("+15039998888".to_string()),
        on_call_phone: Some("+15030001111".to_string()),
        business_phone: None,
        on_call_number_primary: None,
        on_call_number_fallback: None,
        anthropic_api_key: None,
    }
}

pub fn app_with(
    config: Config,
    leads: Arc<dyn LeadStore>,
    telephony: Option<Arc<dyn TelephonyClient>>,
) -> Router {
    router(AppState {
        config: Arc::new(config),
        leads,
        telephony,
        triage: None,
        limits: Arc::new(EndpointLimits::default()),
    })
}

pub fn app(leads: Arc<dyn LeadStore>, telephony: Option<Arc<dyn TelephonyClient>>) -> Router {
    app_with(test_config(), leads, telephony)
}

pub async fn post_json(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("build request");
    send(app, request).await
}

pub async fn post_form(app: &Router, uri: &str, body: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .expect("build request");
    send(app, request).await
}

pub async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.expect("send request");
    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("read body")
        .to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::String(
            String::from_utf8_lossy(&bytes).into_owned(),
        ))
    };
    (status, body)
}

/// Seed a callback lead with an attached call sid, as the callback flow
/// leaves it right after placement.
pub async fn seed_callback_lead(store: &InMemoryLeadStore, call_sid: &str) -> String {
    let ctx = lead_capture_server::models::lead::ClientContext {
        ip: "203.0.113.9".to_string(),
        user_agent: "test".to_string(),
    };
    let new_lead = NewLead::from_callback(
        "+15035551234".to_string(),
        lead_capture_server::models::lead::Locale::En,
        &ctx,
    );
    let id = store.create(&new_lead).await.expect("seed lead");
    store
        .patch(&id, &LeadPatch::attach_call_sid(call_sid.to_string()))
        .await
        .expect("attach sid");
    id
}
