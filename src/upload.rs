use anyhow::{Context, Result};
use std::io::Read;
use std::path::Path;

use crate::edgar::filing::{FilingMetadata, FilingReference};
use crate::error::DisclosureError;

pub const FILING_URL_COLUMN: &str = "filingURL";
pub const MAX_UPLOADED_FILINGS: usize = 100;

/// Reads a CSV filing list with a `filingURL` column. Blank cells are skipped.
pub fn read_filing_list(path: &Path) -> Result<Vec<FilingMetadata>> {
    let file = std::fs::File::open(path).map_err(|e| {
        DisclosureError::configuration(format!("Cannot read filing list {}: {}", path.display(), e))
    })?;
    read_filing_list_from(file)
}

pub fn read_filing_list_from<R: Read>(reader: R) -> Result<Vec<FilingMetadata>> {
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);

    let column = reader
        .headers()?
        .iter()
        .position(|h| h == FILING_URL_COLUMN)
        .ok_or_else(|| {
            DisclosureError::configuration(format!(
                "CSV must contain a column named '{}'",
                FILING_URL_COLUMN
            ))
        })?;

    let mut filings = Vec::new();
    for (line, record) in reader.records().enumerate() {
        let record = record.with_context(|| format!("Invalid filing list row {}", line + 2))?;
        if line >= MAX_UPLOADED_FILINGS {
            return Err(DisclosureError::configuration(format!(
                "Filing list exceeds the limit of {} rows",
                MAX_UPLOADED_FILINGS
            ))
            .into());
        }
        match record.get(column).map(str::trim) {
            Some(url) if !url.is_empty() => {
                filings.push(FilingMetadata::from_reference(FilingReference::new(url)))
            }
            _ => log::debug!("Skipping row {} without a filing URL", line + 2),
        }
    }

    Ok(filings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reads_filing_urls() {
        let csv = "company,filingURL\nA,https://www.sec.gov/a.htm\nB,\nC,https://www.sec.gov/c.htm\n";
        let filings = read_filing_list_from(csv.as_bytes()).unwrap();
        assert_eq!(filings.len(), 2);
        assert_eq!(filings[1].filing_reference.as_str(), "https://www.sec.gov/c.htm");
        assert!(filings[0].filed_at.is_none());
    }

    #[test]
    fn test_missing_column() {
        let err = read_filing_list_from("url\nhttps://x\n".as_bytes()).unwrap_err();
        assert!(err.downcast_ref::<DisclosureError>().unwrap().is_configuration());
    }

    #[test]
    fn test_row_limit() {
        let mut csv = String::from("filingURL\n");
        for i in 0..MAX_UPLOADED_FILINGS {
            csv.push_str(&format!("https://www.sec.gov/{}.htm\n", i));
        }
        assert_eq!(read_filing_list_from(csv.as_bytes()).unwrap().len(), 100);

        csv.push_str("https://www.sec.gov/one-too-many.htm\n");
        let err = read_filing_list_from(csv.as_bytes()).unwrap_err();
        assert!(err.downcast_ref::<DisclosureError>().unwrap().is_configuration());
    }
}
