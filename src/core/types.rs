use anyhow::Result;
use serde_json::Value;

use crate::edgar::filing::{FilingMetadata, FilingReference};
use crate::edgar::search::SearchRequest;

/// Paged filing search. An empty page means the results are exhausted.
#[async_trait::async_trait]
pub trait FilingSearch: Send + Sync {
    async fn search(&self, request: &SearchRequest) -> Result<Vec<FilingMetadata>>;
}

/// Structured-fact extraction for one filing. The returned value is a JSON
/// object keyed by fact-series name.
#[async_trait::async_trait]
pub trait FactSource: Send + Sync {
    async fn fetch_facts(&self, reference: &FilingReference) -> Result<Value>;
}
