mod common;

use serde_json::json;

use common::{FakeTelephony, InMemoryLeadStore, app, app_with, post_json, test_config};

#[tokio::test]
async fn successful_callback_persists_one_lead_with_the_call_sid() {
    let store = InMemoryLeadStore::new();
    let telephony = FakeTelephony::answering();
    let app = app(store.clone(), Some(telephony.clone()));

    let (status, body) = post_json(
        &app,
        "/api/callback",
        json!({ "phone": "5035551234", "locale": "en" }),
    )
    .await;

    assert_eq!(status, 201);
    assert_eq!(body["success"], true);
    assert!(body.get("warning").is_none());
    let callback_id = body["callbackId"].as_str().expect("callbackId present");

    assert_eq!(store.count(), 1);
    let lead = store.lead(callback_id).expect("lead persisted");
    assert_eq!(
        serde_json::to_value(lead.source).expect("serialize source"),
        "callback_button"
    );
    assert_eq!(lead.twilio_call_sid.as_deref(), Some("CA1234567890abcdef"));
    assert_eq!(lead.phone, "5035551234");
    // Sentinel values for the contact-form-only fields
    assert_eq!(lead.name, "Callback Request");
    assert_eq!(lead.service, "emergency-callback");
}

#[tokio::test]
async fn bridge_call_targets_the_on_call_number_with_callback_urls() {
    let store = InMemoryLeadStore::new();
    let telephony = FakeTelephony::answering();
    let app = app(store.clone(), Some(telephony.clone()));

    let (status, _) = post_json(
        &app,
        "/api/callback",
        json!({ "phone": "+15035551234", "locale": "es" }),
    )
    .await;
    assert_eq!(status, 201);

    let calls = telephony.calls.lock();
    assert_eq!(calls.len(), 1);
    let call = &calls[0];
    assert_eq!(call.to, "+15030001111");
    assert_eq!(call.from, "+15039998888");
    assert_eq!(
        call.voice_url,
        "https://example.com/api/callback/bridge?customer=%2B15035551234&locale=es"
    );
    assert_eq!(call.status_callback, "https://example.com/api/callback/status");
    assert_eq!(
        call.status_events,
        vec!["initiated", "ringing", "answered", "completed"]
    );
}

#[tokio::test]
async fn provider_failure_still_succeeds_with_a_warning() {
    let store = InMemoryLeadStore::new();
    let telephony = FakeTelephony::failing();
    let app = app(store.clone(), Some(telephony.clone()));

    let (status, body) = post_json(
        &app,
        "/api/callback",
        json!({ "phone": "5035551234", "locale": "en" }),
    )
    .await;

    assert_eq!(status, 201);
    assert_eq!(body["success"], true);
    assert!(body["callbackId"].as_str().is_some());
    assert_eq!(
        body["warning"],
        "Automated callback failed, manual follow-up will be initiated"
    );

    // The lead was persisted before the placement attempt
    assert_eq!(store.count(), 1);
    let lead = store.lead(body["callbackId"].as_str().expect("id")).expect("lead");
    assert_eq!(lead.twilio_call_sid, None);
}

#[tokio::test]
async fn no_telephony_deployment_captures_without_warning() {
    let store = InMemoryLeadStore::new();
    let app = app(store.clone(), None);

    let (status, body) = post_json(
        &app,
        "/api/callback",
        json!({ "phone": "5035551234" }),
    )
    .await;

    assert_eq!(status, 201);
    assert_eq!(body["success"], true);
    assert!(body.get("warning").is_none());
    assert_eq!(store.count(), 1);
}

#[tokio::test]
async fn missing_on_call_number_degrades_to_a_warning() {
    let store = InMemoryLeadStore::new();
    let telephony = FakeTelephony::answering();
    let mut config = test_config();
    config.on_call_phone = None;
    config.business_phone = None;
    let app = app_with(config, store.clone(), Some(telephony.clone()));

    let (status, body) = post_json(
        &app,
        "/api/callback",
        json!({ "phone": "5035551234" }),
    )
    .await;

    assert_eq!(status, 201);
    assert!(body["warning"].as_str().is_some());
    assert_eq!(store.count(), 1);
    assert!(telephony.calls.lock().is_empty());
}

#[tokio::test]
async fn invalid_phone_is_rejected_before_any_side_effect() {
    let store = InMemoryLeadStore::new();
    let telephony = FakeTelephony::answering();
    let app = app(store.clone(), Some(telephony.clone()));

    let (status, body) = post_json(
        &app,
        "/api/callback",
        json!({ "phone": "123" }),
    )
    .await;

    assert_eq!(status, 400);
    assert_eq!(body["success"], false);
    let errors = body["errors"].as_array().expect("errors array");
    assert!(errors.iter().any(|e| e["field"] == "phone"));
    assert_eq!(store.count(), 0);
    assert!(telephony.calls.lock().is_empty());
}

#[tokio::test]
async fn fourth_request_in_the_window_is_rate_limited_localized() {
    let store = InMemoryLeadStore::new();
    let app = app(store.clone(), None);

    for _ in 0..3 {
        let (status, _) = post_json(
            &app,
            "/api/callback",
            json!({ "phone": "5035551234", "locale": "es" }),
        )
        .await;
        assert_eq!(status, 201);
    }

    let (status, body) = post_json(
        &app,
        "/api/callback",
        json!({ "phone": "5035551234", "locale": "es" }),
    )
    .await;

    assert_eq!(status, 429);
    assert_eq!(
        body["message"],
        "Ha alcanzado el límite de solicitudes. Por favor intente nuevamente en unos minutos."
    );
    // No further side effects past the limit
    assert_eq!(store.count(), 3);
}
