//! Share-class reference table (`classid, Ticker, Class Name, Series Name,
//! Series ID`) and the left join that attaches it to reconciled rows.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use crate::error::DisclosureError;
use crate::reconcile::ReconciledRow;

pub const REQUIRED_COLUMNS: [&str; 5] = ["classid", "Ticker", "Class Name", "Series Name", "Series ID"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MappingRecord {
    #[serde(rename = "classid")]
    pub class_id: String,
    #[serde(rename = "Ticker")]
    pub ticker: Option<String>,
    #[serde(rename = "Class Name")]
    pub class_name: Option<String>,
    #[serde(rename = "Series Name")]
    pub series_name: Option<String>,
    #[serde(rename = "Series ID")]
    pub series_id: Option<String>,
    #[serde(rename = "Entity Name", default)]
    pub entity_name: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct MappingTable {
    records: HashMap<String, MappingRecord>,
}

impl MappingTable {
    pub fn from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(DisclosureError::configuration(format!(
                "Required file '{}' is missing",
                path.display()
            ))
            .into());
        }
        let file = std::fs::File::open(path)
            .with_context(|| format!("Failed to open mapping file {}", path.display()))?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);

        let headers = reader.headers()?.clone();
        let missing: Vec<&str> = REQUIRED_COLUMNS
            .iter()
            .copied()
            .filter(|column| !headers.iter().any(|h| h == *column))
            .collect();
        if !missing.is_empty() {
            return Err(DisclosureError::configuration(format!(
                "Mapping file must include columns: {}",
                missing.join(", ")
            ))
            .into());
        }

        let mut records = HashMap::new();
        for (line, record) in reader.deserialize::<MappingRecord>().enumerate() {
            let record = record.with_context(|| format!("Invalid mapping row {}", line + 2))?;
            let key = record.class_id.trim().to_string();
            if key.is_empty() {
                continue;
            }
            if records.contains_key(&key) {
                log::warn!("Duplicate mapping for class id {}, keeping the first", key);
                continue;
            }
            records.insert(key, record);
        }

        log::info!("Loaded {} share-class mappings", records.len());
        Ok(Self { records })
    }

    pub fn get(&self, class_id: &str) -> Option<&MappingRecord> {
        self.records.get(class_id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// A reconciled row after the left join; `mapping` is `None` when the class
/// id is not in the reference table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedRow {
    pub row: ReconciledRow,
    pub mapping: Option<MappingRecord>,
}

impl EnrichedRow {
    pub fn ticker(&self) -> Option<&str> {
        self.mapping.as_ref().and_then(|m| m.ticker.as_deref())
    }

    pub fn class_name(&self) -> Option<&str> {
        self.mapping.as_ref().and_then(|m| m.class_name.as_deref())
    }

    pub fn series_name(&self) -> Option<&str> {
        self.mapping.as_ref().and_then(|m| m.series_name.as_deref())
    }

    pub fn series_id(&self) -> Option<&str> {
        self.mapping.as_ref().and_then(|m| m.series_id.as_deref())
    }

    pub fn entity_name(&self) -> Option<&str> {
        self.mapping.as_ref().and_then(|m| m.entity_name.as_deref())
    }
}

/// Left join on class id; every input row is kept, in order.
pub fn enrich(rows: &[ReconciledRow], table: &MappingTable) -> Vec<EnrichedRow> {
    rows.iter()
        .map(|row| EnrichedRow {
            row: row.clone(),
            mapping: table.get(row.class_id.as_str()).cloned(),
        })
        .collect()
}
