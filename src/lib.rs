//! Lead capture and callback bridge service.
//!
//! An HTTP API backing a bilingual service-business website: it validates
//! and persists contact-form leads, bridges "call me now" requests to staff
//! through the telephony provider, reconciles the provider's asynchronous
//! call-status webhooks onto the lead records, and triages chat messages.
//!
//! Leads live in an external document store; this service only ever
//! creates and patches single documents. Lead capture is the primary
//! guarantee throughout: telephony and the triage model are best-effort
//! integrations that degrade cleanly when unconfigured or failing.

pub mod config;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod models;
pub mod rate_limit;
pub mod services;
pub mod state;
pub mod store;
pub mod telephony;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;

/// Build the HTTP router. Separated from `main` so integration tests can
/// drive the exact production routes in-process.
pub fn router(state: AppState) -> Router {
    Router::new()
        // Browser-facing endpoints
        .route("/api/lead", post(handlers::leads::submit_lead))
        .route("/api/callback", post(handlers::callback::request_callback))
        .route("/api/chat/triage", post(handlers::triage::triage_message))
        // Provider-facing endpoints (the bridge script also accepts GET for
        // manual testing)
        .route(
            "/api/callback/bridge",
            get(handlers::callback::bridge_script).post(handlers::callback::bridge_script),
        )
        .route("/api/callback/status", post(handlers::callback::call_status))
        .route("/api/twiml/bridge", post(handlers::callback::technician_bridge))
        // Monitoring
        .route("/health", get(handlers::health::health_check))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
