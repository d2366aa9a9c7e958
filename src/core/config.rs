use anyhow::Result;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

use crate::batch::{DEFAULT_CONCURRENCY, DEFAULT_UNIT_TIMEOUT};
use crate::error::DisclosureError;

pub const DEFAULT_API_URL: &str = "https://api.sec-api.io/";
pub const DEFAULT_MAPPING_FILE: &str = "class_series_mapping.csv";

#[derive(Clone, Debug)]
pub struct DisclosureConfig {
    pub api_key: String,
    pub api_url: Url,
    pub user_agent: String,
    pub mapping_file: PathBuf,
    pub data_dir: PathBuf,
    pub concurrency: usize,
    pub unit_timeout: Duration,
}

impl DisclosureConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup("SEC_API_KEY")
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| DisclosureError::configuration("SEC_API_KEY environment variable not set"))?;

        let raw_url = lookup("SEC_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string());
        // A trailing slash keeps `Url::join` from replacing the last path segment.
        let raw_url = if raw_url.ends_with('/') {
            raw_url
        } else {
            format!("{}/", raw_url)
        };
        let api_url = Url::parse(&raw_url).map_err(|e| {
            DisclosureError::configuration(format!("Invalid SEC_API_URL {}: {}", raw_url, e))
        })?;

        let user_agent =
            lookup("USER_AGENT").unwrap_or_else(|| "software@example.com".to_string());

        let mapping_file = PathBuf::from(
            lookup("DISCLOSURE_MAPPING_FILE").unwrap_or_else(|| DEFAULT_MAPPING_FILE.to_string()),
        );

        let data_dir = PathBuf::from(
            lookup("DISCLOSURE_DATA_DIR")
                .unwrap_or_else(|| crate::utils::dirs::DATA_DIR.to_string()),
        );

        let concurrency = parse_number(&lookup, "DISCLOSURE_CONCURRENCY")?
            .unwrap_or(DEFAULT_CONCURRENCY as u64) as usize;

        let unit_timeout = parse_number(&lookup, "DISCLOSURE_TIMEOUT_SECS")?
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_UNIT_TIMEOUT);

        Ok(Self {
            api_key,
            api_url,
            user_agent,
            mapping_file,
            data_dir,
            concurrency,
            unit_timeout,
        })
    }

    pub fn http_client(&self) -> Result<reqwest::Client> {
        Ok(reqwest::Client::builder()
            .user_agent(&self.user_agent)
            .timeout(self.unit_timeout)
            .connect_timeout(Duration::from_secs(10))
            .gzip(true)
            .build()?)
    }
}

fn parse_number<F>(lookup: &F, key: &str) -> Result<Option<u64>>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw.trim().parse::<u64>().map(Some).map_err(|_| {
            anyhow::Error::from(DisclosureError::configuration(format!(
                "{} must be a positive integer, got {:?}",
                key, raw
            )))
        }),
    }
}
