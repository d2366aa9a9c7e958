use anyhow::{anyhow, Result};
use chrono::NaiveDate;
use itertools::Itertools;

use super::report::ReportType;

/// Filters for a filing search. Dates are inclusive.
#[derive(Debug, Clone)]
pub struct Query {
    pub report_types: Vec<ReportType>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub ciks: Vec<String>,
}

impl Query {
    pub fn new(report_types: Vec<ReportType>, start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Query {
            report_types,
            start_date: Some(start_date),
            end_date: Some(end_date),
            ciks: Vec::new(),
        }
    }

    /// All filings of one fund filer, regardless of form or date.
    pub fn for_cik(cik: &str) -> Self {
        Query {
            report_types: Vec::new(),
            start_date: None,
            end_date: None,
            ciks: vec![cik.trim().to_string()],
        }
    }

    pub fn with_ciks(mut self, ciks: Vec<String>) -> Self {
        self.ciks = ciks;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.report_types.is_empty() && self.ciks.is_empty() {
            return Err(anyhow!("At least one form type or CIK must be specified"));
        }
        if let Some(cik) = self.ciks.iter().find(|cik| normalized_cik(cik).is_empty()) {
            return Err(anyhow!("Invalid CIK: {:?}", cik));
        }
        if let (Some(start), Some(end)) = (self.start_date, self.end_date) {
            if start > end {
                return Err(anyhow!("Start date must be before or equal to end date"));
            }
        }
        Ok(())
    }

    /// Renders the Lucene-style query string understood by the search API,
    /// e.g. `(formType:"N-CSR" OR formType:"N-CSRS") AND filedAt:[2024-01-01 TO 2024-03-31]`.
    pub fn to_query_string(&self) -> String {
        let mut clauses = Vec::new();

        if !self.report_types.is_empty() {
            let forms = self
                .report_types
                .iter()
                .map(|rt| format!("formType:\"{}\"", rt))
                .join(" OR ");
            clauses.push(format!("({})", forms));
        }

        if !self.ciks.is_empty() {
            let ciks = self
                .ciks
                .iter()
                .map(|cik| normalized_cik(cik))
                .join(" OR ");
            clauses.push(format!("cik:({})", ciks));
        }

        if self.start_date.is_some() || self.end_date.is_some() {
            let bound = |d: Option<NaiveDate>| {
                d.map(|d| d.format("%Y-%m-%d").to_string())
                    .unwrap_or_else(|| "*".to_string())
            };
            clauses.push(format!(
                "filedAt:[{} TO {}]",
                bound(self.start_date),
                bound(self.end_date)
            ));
        }

        clauses.join(" AND ")
    }
}

// The search index stores CIKs without zero padding.
fn normalized_cik(cik: &str) -> &str {
    cik.trim().trim_start_matches('0')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_form_and_date_query() {
        let query = Query::new(
            ReportType::shareholder_reports(),
            date(2024, 1, 1),
            date(2024, 3, 31),
        );
        assert_eq!(
            query.to_query_string(),
            "(formType:\"N-CSR\" OR formType:\"N-CSRS\") AND filedAt:[2024-01-01 TO 2024-03-31]"
        );
        assert!(query.validate().is_ok());
    }

    #[test]
    fn test_cik_query() {
        let query = Query::for_cik("0001331971");
        assert_eq!(query.to_query_string(), "cik:(1331971)");
        assert!(query.validate().is_ok());
    }

    #[test]
    fn test_form_query_with_cik_filter() {
        let query = Query::new(vec![ReportType::FormNCSR], date(2024, 1, 1), date(2024, 1, 31))
            .with_ciks(vec!["0000036405".to_string(), "1331971".to_string()]);
        let rendered = query.to_query_string();
        assert!(rendered.contains("cik:(36405 OR 1331971)"));
        assert!(rendered.starts_with("(formType:\"N-CSR\")"));
    }

    #[test]
    fn test_validate_rejects_blank_ciks() {
        for cik in ["0000000000", "", "  "] {
            assert!(Query::for_cik(cik).validate().is_err(), "{:?} accepted", cik);
        }
        let query = Query::new(vec![ReportType::FormNCSR], date(2024, 1, 1), date(2024, 1, 31))
            .with_ciks(vec!["1331971".to_string(), "000".to_string()]);
        assert!(query.validate().is_err());
        assert!(Query::for_cik(" 0001331971 ").validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_input() {
        let query = Query::new(vec![], date(2024, 1, 1), date(2024, 3, 31));
        assert!(query.validate().is_err());

        let query = Query::new(
            vec![ReportType::FormNCSR],
            date(2024, 3, 31),
            date(2024, 1, 1),
        );
        assert!(query.validate().is_err());
    }
}
