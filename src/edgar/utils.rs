use anyhow::{anyhow, Context, Result};
use reqwest::{Client, RequestBuilder};
use serde_json::Value;
use url::Url;

use super::rate_limiter::RateLimiter;

pub async fn get_json(
    client: &Client,
    url: &Url,
    user_agent: &str,
    rate_limiter: &RateLimiter,
) -> Result<Value> {
    let request = client.get(url.as_str());
    send_json(request, url, user_agent, rate_limiter).await
}

pub async fn post_json(
    client: &Client,
    url: &Url,
    body: &Value,
    user_agent: &str,
    rate_limiter: &RateLimiter,
) -> Result<Value> {
    let request = client.post(url.as_str()).json(body);
    send_json(request, url, user_agent, rate_limiter).await
}

async fn send_json(
    request: RequestBuilder,
    url: &Url,
    user_agent: &str,
    rate_limiter: &RateLimiter,
) -> Result<Value> {
    let display_url = redacted(url);
    log::debug!("Fetching URL: {}", display_url);

    let _permit = rate_limiter.acquire().await?;

    let response = request
        .header(reqwest::header::USER_AGENT, user_agent)
        .header(reqwest::header::ACCEPT, mime::APPLICATION_JSON.as_ref())
        .header(reqwest::header::ACCEPT_ENCODING, "gzip, deflate")
        .send()
        .await
        .with_context(|| format!("Request to {} failed", display_url))?;

    log::debug!("Response status: {}", response.status());

    if !response.status().is_success() {
        return Err(anyhow!(
            "HTTP request to {} failed with status: {}",
            display_url,
            response.status()
        ));
    }

    let content = response.text().await?;
    log::debug!("Received content length: {}", content.len());

    serde_json::from_str::<Value>(&content)
        .map_err(|e| anyhow!("Invalid JSON from {}: {}", display_url, e))
}

/// The API key travels as a `token` query parameter; keep it out of logs.
pub fn redacted(url: &Url) -> String {
    let mut url = url.clone();
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| {
            let v = if k == "token" { "***".to_string() } else { v.into_owned() };
            (k.into_owned(), v)
        })
        .collect();
    if pairs.is_empty() {
        return url.to_string();
    }
    url.query_pairs_mut().clear().extend_pairs(pairs);
    url.to_string()
}
