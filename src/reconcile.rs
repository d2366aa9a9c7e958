//! Per-filing reconciliation: harvest the configured fact series, key every
//! occurrence by share class, and outer-merge the series into one row per class.

use anyhow::Result;
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use strum::{Display, EnumIter, EnumString};

use crate::core::types::FactSource;
use crate::edgar::filing::FilingReference;
use crate::edgar::parsing::{
    extract_class_id, normalize, ClassId, FactDocument, FactValue, ValueColumn,
};
use crate::error::DisclosureError;

pub const EXPENSE_RATIO_PCT: &str = "ExpenseRatioPct";
pub const EXPENSES_PAID_AMT: &str = "ExpensesPaidAmt";
pub const AVG_ANNUAL_RETURN_PCT: &str = "AvgAnnlRtrPct";
pub const AVG_ANNUAL_RETURN_TABLE: &str = "AvgAnnlRtrTableTextBlock";

/// Which fact series a run harvests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, EnumIter)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum RunMode {
    /// Expense ratio and expenses paid.
    Expenses,
    /// Expenses paid and average annual returns, with the return-table marker.
    Performance,
    /// All three series, with the return-table marker.
    Full,
}

impl RunMode {
    pub fn includes_performance(&self) -> bool {
        !matches!(self, RunMode::Expenses)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeriesSpec {
    pub name: String,
    pub column: ValueColumn,
}

impl SeriesSpec {
    pub fn new(name: &str, column: ValueColumn) -> Self {
        Self {
            name: name.to_string(),
            column,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcileConfig {
    /// Series merged in this order; earlier series win the period columns.
    pub series: Vec<SeriesSpec>,
    /// Fact whose mere presence in a filing sets `has_performance_data`.
    pub performance_marker: Option<String>,
}

impl ReconcileConfig {
    pub fn for_mode(mode: RunMode) -> Self {
        let expense_pct = SeriesSpec::new(EXPENSE_RATIO_PCT, ValueColumn::ExpensePct);
        let expense_amt = SeriesSpec::new(EXPENSES_PAID_AMT, ValueColumn::ExpenseAmt);
        let performance = SeriesSpec::new(AVG_ANNUAL_RETURN_PCT, ValueColumn::PerformancePct);
        let marker = Some(AVG_ANNUAL_RETURN_TABLE.to_string());

        match mode {
            RunMode::Expenses => Self {
                series: vec![expense_pct, expense_amt],
                performance_marker: None,
            },
            RunMode::Performance => Self {
                series: vec![expense_amt, performance],
                performance_marker: marker,
            },
            RunMode::Full => Self {
                series: vec![expense_pct, expense_amt, performance],
                performance_marker: marker,
            },
        }
    }
}

/// One share class of one filing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconciledRow {
    pub class_id: ClassId,
    pub filing_reference: FilingReference,
    pub expense_pct: Option<FactValue>,
    pub expense_amt: Option<FactValue>,
    pub performance_pct: Option<FactValue>,
    /// Set from the whole document, not from this class's own values.
    pub has_performance_data: bool,
    pub period_start: Option<String>,
    pub period_end: Option<String>,
    pub filed_at: Option<DateTime<FixedOffset>>,
    pub ticker: Option<String>,
}

impl ReconciledRow {
    fn new(class_id: ClassId, filing_reference: FilingReference, has_performance_data: bool) -> Self {
        Self {
            class_id,
            filing_reference,
            expense_pct: None,
            expense_amt: None,
            performance_pct: None,
            has_performance_data,
            period_start: None,
            period_end: None,
            filed_at: None,
            ticker: None,
        }
    }

    pub fn value(&self, column: ValueColumn) -> Option<&FactValue> {
        match column {
            ValueColumn::ExpensePct => self.expense_pct.as_ref(),
            ValueColumn::ExpenseAmt => self.expense_amt.as_ref(),
            ValueColumn::PerformancePct => self.performance_pct.as_ref(),
        }
    }

    fn set_value(&mut self, column: ValueColumn, value: Option<FactValue>) {
        match column {
            ValueColumn::ExpensePct => self.expense_pct = value,
            ValueColumn::ExpenseAmt => self.expense_amt = value,
            ValueColumn::PerformancePct => self.performance_pct = value,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Reconciliation {
    pub rows: Vec<ReconciledRow>,
    /// Occurrences dropped because no class id could be derived.
    pub skipped: usize,
}

pub struct FilingReconciler<'a> {
    source: &'a dyn FactSource,
    config: &'a ReconcileConfig,
}

impl<'a> FilingReconciler<'a> {
    pub fn new(source: &'a dyn FactSource, config: &'a ReconcileConfig) -> Self {
        Self { source, config }
    }

    /// Fetches and reconciles one filing.
    ///
    /// Fails with [`DisclosureError::Fetch`] when extraction fails or returns
    /// nothing, and [`DisclosureError::Shape`] when the document is not an object.
    pub async fn reconcile(&self, reference: &FilingReference) -> Result<Reconciliation> {
        let value = self
            .source
            .fetch_facts(reference)
            .await
            .map_err(|e| DisclosureError::fetch(reference.as_str(), format!("{:#}", e)))?;

        let document = FactDocument::from_value(reference.as_str(), value)?;
        Ok(reconcile_document(&document, reference, self.config))
    }
}

pub fn reconcile_document(
    document: &FactDocument,
    reference: &FilingReference,
    config: &ReconcileConfig,
) -> Reconciliation {
    let has_performance_data = config
        .performance_marker
        .as_deref()
        .map(|marker| document.contains(marker))
        .unwrap_or(false);

    let mut merged: BTreeMap<ClassId, ReconciledRow> = BTreeMap::new();
    let mut skipped = 0;

    for spec in &config.series {
        let mut seen = HashSet::new();
        let mut duplicates = 0;

        for row in normalize(document.series(&spec.name)) {
            let Some(class_id) = row.segment_value.as_deref().and_then(extract_class_id) else {
                skipped += 1;
                continue;
            };

            // First occurrence per class wins, later periods of the same series are ignored.
            if !seen.insert(class_id.clone()) {
                duplicates += 1;
                continue;
            }

            let entry = merged.entry(class_id.clone()).or_insert_with(|| {
                ReconciledRow::new(class_id, reference.clone(), has_performance_data)
            });

            if entry.period_start.is_none() && entry.period_end.is_none() {
                entry.period_start = row.period_start;
                entry.period_end = row.period_end.or(row.period_instant);
            }
            entry.set_value(spec.column, row.value);
        }

        if duplicates > 0 {
            log::debug!(
                "Ignored {} repeated {} occurrences in filing: {}",
                duplicates,
                spec.name,
                reference
            );
        }
    }

    if skipped > 0 {
        log::info!(
            "Skipped {} rows with missing class id in filing: {}",
            skipped,
            reference
        );
    }

    Reconciliation {
        rows: merged.into_values().collect(),
        skipped,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn occurrence(value: &str, class_member: &str) -> Value {
        json!({
            "value": value,
            "period": {"startDate": "2023-01-01", "endDate": "2023-12-31"},
            "segment": {"dimension": "oef:ClassAxis", "value": class_member}
        })
    }

    fn document(value: Value) -> FactDocument {
        FactDocument::from_value("test", value).unwrap()
    }

    fn reference() -> FilingReference {
        FilingReference::new("https://www.sec.gov/Archives/edgar/data/1/a.htm")
    }

    #[test]
    fn test_outer_merge_keeps_partial_classes() {
        let doc = document(json!({
            EXPENSES_PAID_AMT: [occurrence("52", "x:C000000001Member")],
            AVG_ANNUAL_RETURN_PCT: [occurrence("0.1234", "x:C000000002Member")],
        }));
        let config = ReconcileConfig::for_mode(RunMode::Performance);
        let result = reconcile_document(&doc, &reference(), &config);

        assert_eq!(result.rows.len(), 2);
        let first = &result.rows[0];
        assert_eq!(first.class_id.as_str(), "C000000001");
        assert_eq!(first.expense_amt, Some(FactValue::Text("52".into())));
        assert!(first.performance_pct.is_none());

        let second = &result.rows[1];
        assert_eq!(second.class_id.as_str(), "C000000002");
        assert!(second.expense_amt.is_none());
        assert_eq!(second.performance_pct, Some(FactValue::Text("0.1234".into())));
    }

    #[test]
    fn test_merges_series_on_class_id() {
        let doc = document(json!({
            EXPENSE_RATIO_PCT: [
                occurrence("0.0075", "x:C000000002Member"),
                occurrence("0.0050", "x:C000000001Member")
            ],
            EXPENSES_PAID_AMT: [
                occurrence("52", "x:C000000001Member"),
                occurrence("78", "x:C000000002Member")
            ],
        }));
        let config = ReconcileConfig::for_mode(RunMode::Expenses);
        let result = reconcile_document(&doc, &reference(), &config);

        assert_eq!(result.rows.len(), 2);
        assert_eq!(result.rows[0].class_id.as_str(), "C000000001");
        assert_eq!(result.rows[0].expense_pct, Some(FactValue::Text("0.0050".into())));
        assert_eq!(result.rows[0].expense_amt, Some(FactValue::Text("52".into())));
        assert_eq!(result.rows[1].expense_pct, Some(FactValue::Text("0.0075".into())));
        assert_eq!(result.rows[1].expense_amt, Some(FactValue::Text("78".into())));
        assert_eq!(result.rows[1].period_end.as_deref(), Some("2023-12-31"));
        assert!(result.rows.iter().all(|r| !r.has_performance_data));
    }

    #[test]
    fn test_drops_occurrences_without_class_id() {
        let doc = document(json!({
            EXPENSES_PAID_AMT: [
                occurrence("52", "x:SomeOtherMember"),
                {"value": "10"},
                occurrence("78", "x:C000000003Member")
            ],
        }));
        let config = ReconcileConfig::for_mode(RunMode::Performance);
        let result = reconcile_document(&doc, &reference(), &config);

        assert_eq!(result.rows.len(), 1);
        assert_eq!(result.rows[0].class_id.as_str(), "C000000003");
        assert_eq!(result.skipped, 2);
    }

    #[test]
    fn test_first_occurrence_per_series_wins() {
        let doc = document(json!({
            AVG_ANNUAL_RETURN_PCT: [
                occurrence("0.10", "x:C000000001Member"),
                occurrence("0.07", "x:C000000001Member")
            ],
        }));
        let config = ReconcileConfig::for_mode(RunMode::Performance);
        let result = reconcile_document(&doc, &reference(), &config);

        assert_eq!(result.rows.len(), 1);
        assert_eq!(result.rows[0].performance_pct, Some(FactValue::Text("0.10".into())));
    }

    #[test]
    fn test_marker_flags_every_row_of_the_filing() {
        let doc = document(json!({
            EXPENSES_PAID_AMT: [occurrence("52", "x:C000000001Member")],
            AVG_ANNUAL_RETURN_TABLE: "<table>...</table>",
        }));
        let config = ReconcileConfig::for_mode(RunMode::Performance);
        let result = reconcile_document(&doc, &reference(), &config);

        assert_eq!(result.rows.len(), 1);
        assert!(result.rows[0].performance_pct.is_none());
        assert!(result.rows[0].has_performance_data);
    }

    #[test]
    fn test_filing_without_series_yields_no_rows() {
        let doc = document(json!({"DocumentType": "N-CSR"}));
        let config = ReconcileConfig::for_mode(RunMode::Full);
        let result = reconcile_document(&doc, &reference(), &config);
        assert_eq!(result, Reconciliation::default());
    }

    #[test]
    fn test_run_mode_parsing() {
        assert_eq!("performance".parse::<RunMode>().unwrap(), RunMode::Performance);
        assert_eq!("FULL".parse::<RunMode>().unwrap(), RunMode::Full);
        assert!("other".parse::<RunMode>().is_err());
        assert!(!RunMode::Expenses.includes_performance());
    }
}
