//! Data models: the lead document, request/response types, and validation.

/// Chat triage request/response types
pub mod chat;
/// Lead document and intake/callback request types
pub mod lead;
/// Field-level input validation
pub mod validate;
