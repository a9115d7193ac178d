//! HTTP request handlers (route handlers).
//!
//! Each handler is an async function that:
//! 1. Receives HTTP request data (JSON body, query params, form body)
//! 2. Hands off to the matching service
//! 3. Returns HTTP response (JSON or TwiML, status code)

/// Callback request, bridge script, and status webhook endpoints
pub mod callback;
/// Health check endpoint
pub mod health;
/// Contact-form lead intake endpoint
pub mod leads;
/// Chat triage endpoint
pub mod triage;
