use anyhow::{anyhow, Result};
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use url::Url;

use super::filing::{FilingHit, FilingMetadata};
use super::rate_limiter::RateLimiter;
use crate::core::types::FilingSearch;

pub const PAGE_SIZE: usize = 50;

/// One page request against the full-text query API, most recent filings first.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequest {
    pub query: String,
    pub from: usize,
    pub size: usize,
}

impl SearchRequest {
    pub fn first_page(query: impl Into<String>, size: usize) -> Self {
        Self {
            query: query.into(),
            from: 0,
            size,
        }
    }

    pub fn next_page(&self) -> Self {
        Self {
            from: self.from + self.size,
            ..self.clone()
        }
    }

    pub fn to_body(&self) -> Value {
        json!({
            "query": self.query,
            "from": self.from.to_string(),
            "size": self.size.to_string(),
            "sort": [{ "filedAt": { "order": "desc" } }],
        })
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    filings: Vec<FilingHit>,
}

pub struct SearchClient {
    client: Client,
    endpoint: Url,
    user_agent: String,
}

impl SearchClient {
    pub fn new(client: Client, base_url: &Url, api_key: &str, user_agent: &str) -> Self {
        let mut endpoint = base_url.clone();
        endpoint.query_pairs_mut().append_pair("token", api_key);
        Self {
            client,
            endpoint,
            user_agent: user_agent.to_string(),
        }
    }
}

#[async_trait::async_trait]
impl FilingSearch for SearchClient {
    async fn search(&self, request: &SearchRequest) -> Result<Vec<FilingMetadata>> {
        log::debug!(
            "Searching filings: {} (from {}, size {})",
            request.query,
            request.from,
            request.size
        );

        let body = super::utils::post_json(
            &self.client,
            &self.endpoint,
            &request.to_body(),
            &self.user_agent,
            RateLimiter::sec_api(),
        )
        .await?;

        let response: SearchResponse = serde_json::from_value(body)
            .map_err(|e| anyhow!("Failed to parse search response: {}", e))?;

        Ok(response
            .filings
            .into_iter()
            .filter_map(FilingHit::into_metadata)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_body() {
        let request = SearchRequest::first_page("formType:\"N-CSR\"", PAGE_SIZE).next_page();
        assert_eq!(
            request.to_body(),
            json!({
                "query": "formType:\"N-CSR\"",
                "from": "50",
                "size": "50",
                "sort": [{"filedAt": {"order": "desc"}}]
            })
        );
    }

    #[test]
    fn test_endpoint_carries_token() {
        let base = Url::parse("https://api.sec-api.io").unwrap();
        let client = SearchClient::new(Client::new(), &base, "key", "ua");
        assert_eq!(client.endpoint.as_str(), "https://api.sec-api.io/?token=key");
    }
}
