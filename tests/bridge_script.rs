mod common;

use axum::body::Body;
use axum::http::Request;

use common::{InMemoryLeadStore, app, app_with, send, test_config};

async fn get(app: &axum::Router, uri: &str) -> (axum::http::StatusCode, String) {
    let request = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .expect("build request");
    let (status, body) = send(app, request).await;
    (status, body.as_str().unwrap_or_default().to_string())
}

#[tokio::test]
async fn customer_bridge_renders_twiml_for_the_provider() {
    let app = app(InMemoryLeadStore::new(), None);

    let (status, body) = get(
        &app,
        "/api/callback/bridge?customer=%2B15035551234&locale=en",
    )
    .await;

    assert_eq!(status, 200);
    assert!(body.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
    assert!(body.contains("New customer waiting. Connecting now."));
    assert!(body.contains("<Number>+15035551234</Number>"));
    assert!(body.contains("callerId=\"+15039998888\""));
    assert!(body.contains("Customer unavailable."));
}

#[tokio::test]
async fn spanish_locale_renders_spanish_script() {
    let app = app(InMemoryLeadStore::new(), None);

    let (status, body) = get(
        &app,
        "/api/callback/bridge?customer=%2B15035551234&locale=es",
    )
    .await;

    assert_eq!(status, 200);
    assert!(body.contains("Nuevo cliente esperando. Conectando ahora."));
    assert!(body.contains("language=\"es-US\""));
}

#[tokio::test]
async fn missing_customer_is_a_client_error() {
    let app = app(InMemoryLeadStore::new(), None);

    let (status, body) = get(&app, "/api/callback/bridge?locale=en").await;

    assert_eq!(status, 400);
    assert_eq!(body, "Missing customer phone");
}

#[tokio::test]
async fn query_injection_cannot_alter_the_script() {
    let app = app(InMemoryLeadStore::new(), None);

    let (status, body) = get(
        &app,
        "/api/callback/bridge?customer=%3C%2FNumber%3E%3CSay%3Epwned%3C%2FSay%3E",
    )
    .await;

    assert_eq!(status, 200);
    assert!(!body.contains("<Say>pwned</Say>"));
    assert!(body.contains("&lt;/Number&gt;&lt;Say&gt;pwned&lt;/Say&gt;"));
}

#[tokio::test]
async fn technician_bridge_requires_configuration() {
    let app = app(InMemoryLeadStore::new(), None);

    let request = Request::builder()
        .method("POST")
        .uri("/api/twiml/bridge")
        .body(Body::empty())
        .expect("build request");
    let (status, _) = send(&app, request).await;

    assert_eq!(status, 404);
}

#[tokio::test]
async fn technician_bridge_dials_primary_then_fallback() {
    let mut config = test_config();
    config.on_call_number_primary = Some("+15030000001".to_string());
    config.on_call_number_fallback = Some("+15030000002".to_string());
    let app = app_with(config, InMemoryLeadStore::new(), None);

    let request = Request::builder()
        .method("POST")
        .uri("/api/twiml/bridge")
        .body(Body::empty())
        .expect("build request");
    let (status, body) = send(&app, request).await;
    let body = body.as_str().unwrap_or_default().to_string();

    assert_eq!(status, 200);
    assert!(body.contains("Connecting you now."));
    let primary = body.find("+15030000001").expect("primary present");
    let fallback = body.find("+15030000002").expect("fallback present");
    assert!(primary < fallback);
    assert!(body.contains("<Dial timeout=\"20\""));
}
