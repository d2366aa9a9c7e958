use anyhow::{Context, Result};
use csv::WriterBuilder;
use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::mapping::EnrichedRow;

pub const BASE_COLUMNS: [&str; 10] = [
    "classId",
    "ticker",
    "className",
    "seriesName",
    "seriesId",
    "expensePct",
    "expenseAmt",
    "period.start",
    "period.end",
    "filingReference",
];

pub const PERFORMANCE_COLUMNS: [&str; 2] = ["performancePct", "hasPerformanceData"];

pub fn columns(include_performance: bool) -> Vec<&'static str> {
    let mut columns = BASE_COLUMNS.to_vec();
    if include_performance {
        columns.extend(PERFORMANCE_COLUMNS);
    }
    columns
}

/// Writes rows in the fixed column order; missing values become empty cells.
pub fn write_csv<W: Write>(writer: W, rows: &[EnrichedRow], include_performance: bool) -> Result<()> {
    let mut writer = WriterBuilder::new().has_headers(true).from_writer(writer);
    writer.write_record(columns(include_performance))?;

    for enriched in rows {
        let row = &enriched.row;
        let text = |v: Option<&str>| v.unwrap_or_default().to_string();
        let value = |v: &Option<crate::edgar::parsing::FactValue>| {
            v.as_ref().map(|v| v.to_string()).unwrap_or_default()
        };

        let mut record = vec![
            row.class_id.to_string(),
            text(enriched.ticker()),
            text(enriched.class_name()),
            text(enriched.series_name()),
            text(enriched.series_id()),
            value(&row.expense_pct),
            value(&row.expense_amt),
            text(row.period_start.as_deref()),
            text(row.period_end.as_deref()),
            row.filing_reference.to_string(),
        ];
        if include_performance {
            record.push(value(&row.performance_pct));
            record.push(row.has_performance_data.to_string());
        }
        writer.write_record(&record)?;
    }

    writer.flush()?;
    Ok(())
}

pub fn export_csv(path: &Path, rows: &[EnrichedRow], include_performance: bool) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        crate::utils::dirs::ensure_dir(parent)?;
    }
    let file = File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    write_csv(file, rows, include_performance)?;
    log::info!("Exported {} rows to {}", rows.len(), path.display());
    Ok(())
}
