pub mod filing;
pub mod pager;
pub mod parsing;
pub mod query;
pub mod rate_limiter;
pub mod report;
pub mod search;
pub mod utils;
pub mod xbrl;

use anyhow::{anyhow, Result};

use crate::core::types::FilingSearch;
use filing::FilingMetadata;
use pager::FilingPager;
use query::Query;

/// Most recent filing of any form made by the fund filer `cik`.
pub async fn latest_filing(search: &dyn FilingSearch, cik: &str) -> Result<FilingMetadata> {
    let filings = FilingPager::new(search)
        .collect(&Query::for_cik(cik), 1)
        .await?;

    filings
        .into_iter()
        .next()
        .ok_or_else(|| anyhow!("No filing found for CIK: {}", cik))
}
