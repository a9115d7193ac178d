//! Content-store-backed lead store.
//!
//! Talks to the hosted document store's HTTP API: one mutation endpoint for
//! create/patch, one query endpoint for the call-sid lookup. The store
//! provides single-document atomic create/patch; nothing here assumes more
//! than that.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use url::Url;

use crate::models::lead::{Lead, LeadPatch, NewLead};
use crate::store::{LeadStore, StoreError};

/// Store API version this service is pinned to.
const API_VERSION: &str = "2024-01-01";

/// Per-request timeout. Store writes gate the visitor-facing response, so
/// they must not hang on a slow upstream.
const REQUEST_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(10);

/// HTTP client for the hosted content store.
pub struct SanityStore {
    http: reqwest::Client,
    mutate_url: Url,
    query_url: Url,
    token: String,
}

#[derive(Debug, Deserialize)]
struct MutateResponse {
    #[serde(default)]
    results: Vec<MutateResult>,
}

#[derive(Debug, Deserialize)]
struct MutateResult {
    id: String,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    result: Option<Lead>,
}

impl SanityStore {
    pub fn new(project_id: &str, dataset: &str, token: &str) -> anyhow::Result<Self> {
        let base = format!("https://{project_id}.api.sanity.io/v{API_VERSION}");
        let mutate_url = Url::parse(&format!("{base}/data/mutate/{dataset}?returnIds=true"))?;
        let query_url = Url::parse(&format!("{base}/data/query/{dataset}"))?;

        let http = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;

        Ok(Self {
            http,
            mutate_url,
            query_url,
            token: token.to_string(),
        })
    }

    async fn mutate(&self, mutations: serde_json::Value) -> Result<MutateResponse, StoreError> {
        let response = self
            .http
            .post(self.mutate_url.clone())
            .bearer_auth(&self.token)
            .json(&json!({ "mutations": mutations }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(StoreError::UnexpectedStatus(status.as_u16()));
        }

        response
            .json::<MutateResponse>()
            .await
            .map_err(|e| StoreError::Malformed(e.to_string()))
    }
}

#[async_trait]
impl LeadStore for SanityStore {
    async fn create(&self, lead: &NewLead) -> Result<String, StoreError> {
        // The `_type` discriminator is store schema, not lead data, so it is
        // attached here rather than carried on the model.
        let mut doc = serde_json::to_value(lead).map_err(|e| StoreError::Malformed(e.to_string()))?;
        if let Some(map) = doc.as_object_mut() {
            map.insert("_type".to_string(), json!("lead"));
        }

        let response = self.mutate(json!([{ "create": doc }])).await?;
        response
            .results
            .into_iter()
            .next()
            .map(|r| r.id)
            .ok_or_else(|| StoreError::Malformed("mutation returned no document id".to_string()))
    }

    async fn find_by_call_sid(&self, call_sid: &str) -> Result<Option<Lead>, StoreError> {
        let sid_param = serde_json::to_string(call_sid)
            .map_err(|e| StoreError::Malformed(e.to_string()))?;

        let mut url = self.query_url.clone();
        url.query_pairs_mut()
            .append_pair("query", r#"*[_type == "lead" && twilioCallSid == $sid][0]"#)
            .append_pair("$sid", &sid_param);

        let response = self.http.get(url).bearer_auth(&self.token).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(StoreError::UnexpectedStatus(status.as_u16()));
        }

        let body = response
            .json::<QueryResponse>()
            .await
            .map_err(|e| StoreError::Malformed(e.to_string()))?;
        Ok(body.result)
    }

    async fn patch(&self, id: &str, patch: &LeadPatch) -> Result<(), StoreError> {
        let set = serde_json::to_value(patch).map_err(|e| StoreError::Malformed(e.to_string()))?;
        self.mutate(json!([{ "patch": { "id": id, "set": set } }]))
            .await?;
        Ok(())
    }
}
