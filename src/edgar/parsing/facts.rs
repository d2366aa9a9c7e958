use serde_json::{Map, Value};

use super::types::{FactRow, FactSeries, FactValue};

/// Flattens one fact series into rows, one per occurrence.
///
/// Absent series produce no rows. Elements of a collection that are not
/// objects are skipped; missing fields inside an occurrence become `None`.
pub fn normalize(series: FactSeries<'_>) -> Vec<FactRow> {
    match series {
        FactSeries::Absent => Vec::new(),
        FactSeries::Single(occurrence) => vec![normalize_occurrence(occurrence)],
        FactSeries::Collection(items) => items
            .iter()
            .filter_map(|item| match item {
                Value::Object(occurrence) => Some(normalize_occurrence(occurrence)),
                other => {
                    log::debug!("Skipping non-object fact occurrence: {}", other);
                    None
                }
            })
            .collect(),
    }
}

fn normalize_occurrence(occurrence: &Map<String, Value>) -> FactRow {
    let mut row = FactRow {
        value: occurrence.get("value").and_then(FactValue::from_json),
        unit_ref: occurrence.get("unitRef").and_then(text),
        decimals: occurrence.get("decimals").and_then(text),
        segment_value: occurrence.get("segment").and_then(segment_value),
        ..Default::default()
    };

    match occurrence.get("period") {
        Some(Value::Object(period)) => {
            row.period_start = period
                .get("startDate")
                .or_else(|| period.get("start"))
                .and_then(text);
            row.period_end = period
                .get("endDate")
                .or_else(|| period.get("end"))
                .and_then(text);
            row.period_instant = period.get("instant").and_then(text);
        }
        Some(Value::String(descriptor)) => row.period_descriptor = Some(descriptor.clone()),
        _ => {}
    }

    row
}

// Multi-dimensional facts carry a list of segments; their member values are
// joined so a class id in any of them is still found.
fn segment_value(segment: &Value) -> Option<String> {
    match segment {
        Value::Object(map) => map.get("value").and_then(text),
        Value::Array(items) => {
            let values: Vec<String> = items
                .iter()
                .filter_map(|item| match item {
                    Value::Object(map) => map.get("value").and_then(text),
                    other => text(other),
                })
                .collect();
            (!values.is_empty()).then(|| values.join(" "))
        }
        other => text(other),
    }
}

fn text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}
