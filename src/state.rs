//! Shared application state handed to every handler.

use std::sync::Arc;

use crate::config::Config;
use crate::rate_limit::EndpointLimits;
use crate::services::triage::TriageClient;
use crate::store::{LeadStore, SanityStore};
use crate::telephony::{TelephonyClient, TwilioClient};

/// Everything a request handler needs: configuration, the lead store, the
/// optional telephony and triage clients, and the per-endpoint rate limiters.
///
/// `telephony`/`triage` being `None` is the expected partially-configured
/// deployment, not an error state.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub leads: Arc<dyn LeadStore>,
    pub telephony: Option<Arc<dyn TelephonyClient>>,
    pub triage: Option<Arc<TriageClient>>,
    pub limits: Arc<EndpointLimits>,
}

impl AppState {
    /// Build production state: hosted content store, plus telephony and
    /// triage clients when their credentials are present.
    pub fn from_config(config: Config) -> anyhow::Result<Self> {
        let leads: Arc<dyn LeadStore> = Arc::new(SanityStore::new(
            &config.sanity_project_id,
            &config.sanity_dataset,
            &config.sanity_api_token,
        )?);

        let telephony: Option<Arc<dyn TelephonyClient>> = match config.telephony() {
            Some(telephony_config) => Some(Arc::new(TwilioClient::new(&telephony_config)?)),
            None => None,
        };

        let triage = match &config.anthropic_api_key {
            Some(api_key) => Some(Arc::new(TriageClient::new(api_key.clone())?)),
            None => None,
        };

        Ok(Self {
            config: Arc::new(config),
            leads,
            telephony,
            triage,
            limits: Arc::new(EndpointLimits::default()),
        })
    }
}
