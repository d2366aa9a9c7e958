use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

use super::report::ReportType;

/// Locator of one filing: usually the filing's primary iXBRL document URL,
/// otherwise an accession number.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilingReference(String);

impl FilingReference {
    pub fn new(reference: impl Into<String>) -> Self {
        FilingReference(reference.into().trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_url(&self) -> Option<Url> {
        Url::parse(&self.0)
            .ok()
            .filter(|url| matches!(url.scheme(), "http" | "https"))
    }
}

impl fmt::Display for FilingReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for FilingReference {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilingMetadata {
    pub filing_reference: FilingReference,
    pub filed_at: Option<DateTime<FixedOffset>>,
    pub ticker: Option<String>,
    pub cik: Option<String>,
    pub accession_number: Option<String>,
    pub form_type: Option<ReportType>,
    pub company_name: Option<String>,
}

impl FilingMetadata {
    /// Metadata for a filing known only by its reference (uploaded lists).
    pub fn from_reference(reference: FilingReference) -> Self {
        Self {
            filing_reference: reference,
            filed_at: None,
            ticker: None,
            cik: None,
            accession_number: None,
            form_type: None,
            company_name: None,
        }
    }
}

/// One filing as returned by the full-text query API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilingHit {
    pub id: Option<String>,
    #[serde(rename = "accessionNo")]
    pub accession_no: Option<String>,
    pub cik: Option<String>,
    pub ticker: Option<String>,
    #[serde(rename = "companyName")]
    pub company_name: Option<String>,
    #[serde(rename = "formType")]
    pub form_type: Option<String>,
    #[serde(rename = "filedAt")]
    pub filed_at: Option<String>,
    #[serde(rename = "linkToFilingDetails")]
    pub link_to_filing_details: Option<String>,
    #[serde(rename = "linkToHtml")]
    pub link_to_html: Option<String>,
}

impl FilingHit {
    /// Converts a hit into metadata; hits without any usable locator are dropped.
    pub fn into_metadata(self) -> Option<FilingMetadata> {
        let reference = self
            .link_to_filing_details
            .or(self.link_to_html)
            .or_else(|| self.accession_no.clone())
            .filter(|r| !r.trim().is_empty())?;

        let filed_at = self.filed_at.as_deref().and_then(|raw| {
            DateTime::parse_from_rfc3339(raw)
                .map_err(|e| log::debug!("Unparseable filedAt {:?}: {}", raw, e))
                .ok()
        });

        Some(FilingMetadata {
            filing_reference: FilingReference::new(reference),
            filed_at,
            ticker: self.ticker.filter(|t| !t.is_empty()),
            cik: self.cik,
            accession_number: self.accession_no,
            form_type: self.form_type.and_then(|f| f.parse().ok()),
            company_name: self.company_name,
        })
    }
}
