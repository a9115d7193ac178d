//! Lead Capture Server - Main Application Entry Point
//!
//! REST API for a cleanup/restoration business website: lead intake,
//! callback bridging through the telephony provider, call-status
//! reconciliation, and chat triage.
//!
//! # Startup Flow
//!
//! 1. Load configuration from environment variables
//! 2. Build shared state (lead store client, optional telephony and triage
//!    clients, rate limiters)
//! 3. Build HTTP router with routes and middleware
//! 4. Start server on configured port

use tracing_subscriber::EnvFilter;

use lead_capture_server::{config, router, state::AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging with tracing subscriber. Reads RUST_LOG environment variable (defaults to "info" level)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    // Load configuration
    let config = config::Config::from_env()?;
    tracing::info!(
        telephony = config.telephony().is_some(),
        triage = config.anthropic_api_key.is_some(),
        "Configuration loaded"
    );

    let port = config.server_port;
    let state = AppState::from_config(config)?;
    let app = router(state);

    // Bind to network address and start server
    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    // Start serving HTTP requests
    axum::serve(listener, app).await?;

    Ok(())
}
