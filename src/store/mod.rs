//! The lead store seam.
//!
//! Leads live in an external document store. The service only needs three
//! operations, so they are a trait: production runs against the hosted
//! content store over HTTP (`SanityStore`), tests run against an in-memory
//! implementation.

use async_trait::async_trait;

use crate::models::lead::{Lead, LeadPatch, NewLead};

mod sanity;

pub use sanity::SanityStore;

/// Errors encountered while talking to the lead store.
///
/// All of these are fatal to the originating request: without a persisted
/// lead there is no guarantee of follow-up, so the caller must be told to
/// retry or call directly.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The HTTP request itself failed (connect, timeout, TLS).
    #[error("content store request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The store answered with a non-success status.
    #[error("content store returned status {0}")]
    UnexpectedStatus(u16),

    /// The store answered 2xx but the body did not have the expected shape.
    #[error("malformed content store response: {0}")]
    Malformed(String),
}

/// The document operations this service performs against the lead store.
#[async_trait]
pub trait LeadStore: Send + Sync {
    /// Persist a new lead, returning the store-assigned id.
    async fn create(&self, lead: &NewLead) -> Result<String, StoreError>;

    /// Find the lead correlated with a telephony call id, if any.
    async fn find_by_call_sid(&self, call_sid: &str) -> Result<Option<Lead>, StoreError>;

    /// Apply a partial update to an existing lead.
    async fn patch(&self, id: &str, patch: &LeadPatch) -> Result<(), StoreError>;
}
