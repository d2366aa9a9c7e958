use anyhow::Result;
use reqwest::Client;
use serde_json::Value;
use url::Url;

use super::filing::FilingReference;
use super::rate_limiter::RateLimiter;
use crate::core::types::FactSource;

/// Client for the XBRL-to-JSON converter, which turns a filing's inline XBRL
/// into an object keyed by fact-series name.
pub struct XbrlClient {
    client: Client,
    base_url: Url,
    api_key: String,
    user_agent: String,
}

impl XbrlClient {
    pub fn new(client: Client, base_url: &Url, api_key: &str, user_agent: &str) -> Self {
        Self {
            client,
            base_url: base_url.clone(),
            api_key: api_key.to_string(),
            user_agent: user_agent.to_string(),
        }
    }

    pub fn request_url(&self, reference: &FilingReference) -> Result<Url> {
        let mut url = self.base_url.join("xbrl-to-json")?;
        {
            let mut pairs = url.query_pairs_mut();
            match reference.as_url() {
                Some(htm_url) => pairs.append_pair("htm-url", htm_url.as_str()),
                None => pairs.append_pair("accession-no", reference.as_str()),
            };
            pairs.append_pair("token", &self.api_key);
        }
        Ok(url)
    }
}

#[async_trait::async_trait]
impl FactSource for XbrlClient {
    async fn fetch_facts(&self, reference: &FilingReference) -> Result<Value> {
        let url = self.request_url(reference)?;
        super::utils::get_json(&self.client, &url, &self.user_agent, RateLimiter::sec_api()).await
    }
}
