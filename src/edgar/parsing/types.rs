use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

use crate::error::DisclosureError;

/// Fact value as reported: sec-api emits most numbers as strings, some as JSON numbers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FactValue {
    Number(f64),
    Text(String),
}

impl FactValue {
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Null => None,
            Value::Number(n) => n.as_f64().map(FactValue::Number),
            Value::String(s) => Some(FactValue::Text(s.clone())),
            other => Some(FactValue::Text(other.to_string())),
        }
    }

    /// Numeric view of the value; text like `"1,234.5"` is accepted.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FactValue::Number(n) => Some(*n),
            FactValue::Text(s) => s.trim().replace(',', "").parse::<f64>().ok(),
        }
    }
}

impl fmt::Display for FactValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FactValue::Number(n) => write!(f, "{}", n),
            FactValue::Text(s) => write!(f, "{}", s),
        }
    }
}

/// The column a fact series' `value` is renamed to before merging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueColumn {
    ExpensePct,
    ExpenseAmt,
    PerformancePct,
}

impl ValueColumn {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueColumn::ExpensePct => "expense_pct",
            ValueColumn::ExpenseAmt => "expense_amt",
            ValueColumn::PerformancePct => "performance_pct",
        }
    }
}

impl fmt::Display for ValueColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One flattened fact occurrence. Field names follow the dotted column
/// names a JSON flattening produces (`period.start`, `segment.value`, ...).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FactRow {
    pub value: Option<FactValue>,
    #[serde(rename = "period.start")]
    pub period_start: Option<String>,
    #[serde(rename = "period.end")]
    pub period_end: Option<String>,
    #[serde(rename = "period.instant")]
    pub period_instant: Option<String>,
    /// Free-form duration such as `"12 months"` when no dates are given.
    #[serde(rename = "period")]
    pub period_descriptor: Option<String>,
    #[serde(rename = "segment.value")]
    pub segment_value: Option<String>,
    #[serde(rename = "unitRef")]
    pub unit_ref: Option<String>,
    pub decimals: Option<String>,
}

/// A named fact series as found in the response, before normalization.
#[derive(Debug, Clone, Copy)]
pub enum FactSeries<'a> {
    Absent,
    Single(&'a Map<String, Value>),
    Collection(&'a [Value]),
}

impl<'a> FactSeries<'a> {
    pub fn from_json(value: Option<&'a Value>) -> Self {
        match value {
            Some(Value::Object(map)) => FactSeries::Single(map),
            Some(Value::Array(items)) => FactSeries::Collection(items),
            Some(Value::Null) | None => FactSeries::Absent,
            Some(other) => {
                log::debug!("Ignoring scalar fact series: {}", other);
                FactSeries::Absent
            }
        }
    }
}

/// The fact document returned for one filing, keyed by fact-series name.
#[derive(Debug, Clone)]
pub struct FactDocument {
    facts: Map<String, Value>,
}

impl FactDocument {
    /// Validates the top-level shape. `null`, `{}` and non-objects are rejected.
    pub fn from_value(reference: &str, value: Value) -> Result<Self, DisclosureError> {
        match value {
            Value::Object(facts) if !facts.is_empty() => Ok(Self { facts }),
            Value::Object(_) | Value::Null => Err(DisclosureError::fetch(
                reference,
                "fact extraction returned an empty document",
            )),
            other => Err(DisclosureError::shape(
                reference,
                format!("expected a JSON object, got {}", json_kind(&other)),
            )),
        }
    }

    pub fn series(&self, name: &str) -> FactSeries<'_> {
        FactSeries::from_json(self.facts.get(name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.facts.contains_key(name)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
