pub mod export;
pub mod summary;

pub use export::{export_csv, write_csv};
pub use summary::{
    highest_performance, lowest_expense, performance_by_entity, summarize, DisclosureSummary,
    RankingFilter,
};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::{EnrichedRow, MappingRecord};
    use crate::reconcile::ReconciledRow;
    use serde_json::json;

    fn enriched(class_id: &str, expense: Option<&str>, perf: Option<&str>, flag: bool, entity: Option<&str>) -> EnrichedRow {
        let row: ReconciledRow = serde_json::from_value(json!({
            "class_id": class_id,
            "filing_reference": "https://www.sec.gov/a.htm",
            "expense_pct": null,
            "expense_amt": expense,
            "performance_pct": perf,
            "has_performance_data": flag,
            "period_start": "2023-01-01",
            "period_end": "2023-12-31",
            "filed_at": null,
            "ticker": null
        }))
        .unwrap();
        let mapping = entity.map(|e| MappingRecord {
            class_id: class_id.to_string(),
            ticker: Some("TICK".to_string()),
            class_name: Some("Class A".to_string()),
            series_name: Some("Growth".to_string()),
            series_id: Some("S000000001".to_string()),
            entity_name: Some(e.to_string()),
        });
        EnrichedRow { row, mapping }
    }

    fn sample() -> Vec<EnrichedRow> {
        vec![
            enriched("C000000001", Some("52"), Some("0.12"), true, Some("Alpha")),
            enriched("C000000002", Some("12"), Some("0.03"), true, Some("Alpha")),
            enriched("C000000003", Some("80"), None, false, Some("Beta")),
            enriched("C000000004", Some("150"), Some("0.20"), true, None),
        ]
    }

    #[test]
    fn test_summarize() {
        let summary = summarize(&sample());
        assert_eq!(summary.share_classes, 4);
        assert_eq!(summary.disclosing, 3);
        assert_eq!(summary.class_percent(), 75.0);

        let entities = summary.entities.clone().unwrap();
        assert_eq!(entities.total, 2);
        assert_eq!(entities.disclosing, 1);
        assert_eq!(summary.entity_percent(), Some(50.0));
    }

    #[test]
    fn test_summary_without_entities() {
        let rows = vec![enriched("C000000001", None, None, false, None)];
        let summary = summarize(&rows);
        assert!(summary.entities.is_none());
        assert_eq!(summary.class_percent(), 0.0);
    }

    #[test]
    fn test_performance_by_entity() {
        assert_eq!(performance_by_entity(&sample()), vec![("Alpha".to_string(), 2)]);
    }

    #[test]
    fn test_rankings_respect_filter() {
        let rows = sample();
        let filter = RankingFilter::default();

        let lowest: Vec<_> = lowest_expense(&rows, &filter)
            .iter()
            .map(|r| r.row.class_id.as_str())
            .collect();
        assert_eq!(lowest, vec!["C000000002", "C000000001"]);

        let highest: Vec<_> = highest_performance(&rows, &RankingFilter { top_n: 1, ..filter })
            .iter()
            .map(|r| r.row.class_id.as_str())
            .collect();
        assert_eq!(highest, vec!["C000000001"]);
    }

    #[test]
    fn test_rankings_skip_non_numeric_rows() {
        let rows = vec![
            enriched("C000000001", Some("n/a"), Some("0.50"), true, None),
            enriched("C000000002", Some("1,000"), Some("0.40"), true, None),
            enriched("C000000003", Some("20"), Some("0.30"), true, None),
        ];
        let filter = RankingFilter {
            max_expense: 5_000.0,
            ..RankingFilter::default()
        };

        let highest: Vec<_> = highest_performance(&rows, &filter)
            .iter()
            .map(|r| r.row.class_id.as_str())
            .collect();
        assert_eq!(highest, vec!["C000000002", "C000000003"]);
        assert_eq!(lowest_expense(&rows, &filter)[0].row.class_id.as_str(), "C000000003");
    }

    #[test]
    fn test_csv_column_order() {
        let mut out = Vec::new();
        write_csv(&mut out, &sample()[..1], true).unwrap();
        let text = String::from_utf8(out).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next().unwrap(),
            "classId,ticker,className,seriesName,seriesId,expensePct,expenseAmt,period.start,period.end,filingReference,performancePct,hasPerformanceData"
        );
        assert_eq!(
            lines.next().unwrap(),
            "C000000001,TICK,Class A,Growth,S000000001,,52,2023-01-01,2023-12-31,https://www.sec.gov/a.htm,0.12,true"
        );
    }

    #[test]
    fn test_csv_without_performance_columns() {
        let mut out = Vec::new();
        write_csv(&mut out, &sample()[3..], false).unwrap();
        let text = String::from_utf8(out).unwrap();
        let row = text.lines().nth(1).unwrap();
        assert_eq!(row, "C000000004,,,,,,150,2023-01-01,2023-12-31,https://www.sec.gov/a.htm");
    }
}
