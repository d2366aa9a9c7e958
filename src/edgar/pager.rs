use anyhow::Result;

use super::filing::FilingMetadata;
use super::query::Query;
use super::search::{SearchRequest, PAGE_SIZE};
use crate::core::types::FilingSearch;
use crate::error::DisclosureError;

/// Walks the paged search API until a page comes back empty or `limit`
/// filings have been collected.
pub struct FilingPager<'a> {
    search: &'a dyn FilingSearch,
    page_size: usize,
}

impl<'a> FilingPager<'a> {
    pub fn new(search: &'a dyn FilingSearch) -> Self {
        Self {
            search,
            page_size: PAGE_SIZE,
        }
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Returns at most `limit` filings, most recent first.
    ///
    /// An invalid query is a configuration error. A failing search is logged
    /// and reported as no filings at all.
    pub async fn collect(&self, query: &Query, limit: usize) -> Result<Vec<FilingMetadata>> {
        query
            .validate()
            .map_err(|e| DisclosureError::configuration(e.to_string()))?;

        let mut request = SearchRequest::first_page(query.to_query_string(), self.page_size);
        let mut filings: Vec<FilingMetadata> = Vec::new();

        while filings.len() < limit {
            let page = match self.search.search(&request).await {
                Ok(page) => page,
                Err(e) => {
                    log::error!("Error during filing search: {:#}", e);
                    return Ok(Vec::new());
                }
            };

            if page.is_empty() {
                log::debug!("Empty page at offset {}, search exhausted", request.from);
                break;
            }

            log::debug!("Page at offset {} returned {} filings", request.from, page.len());
            filings.extend(page);
            request = request.next_page();
        }

        filings.truncate(limit);
        log::info!("Collected {} filings for query {}", filings.len(), request.query);
        Ok(filings)
    }
}
