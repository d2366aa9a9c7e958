use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use strum::{EnumIter, IntoEnumIterator};

/// Form types relevant to registered fund disclosures.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter)]
#[serde(try_from = "String", into = "String")]
pub enum ReportType {
    FormNCSR,
    FormNCSRS,
    FormN1A,
    Form485BPOS,
    FormNPORT,
    FormNQ,
    Other(String),
}

impl TryFrom<String> for ReportType {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        ReportType::from_str(&s)
    }
}

impl From<ReportType> for String {
    fn from(rt: ReportType) -> Self {
        rt.to_string()
    }
}

impl fmt::Display for ReportType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportType::FormNCSR => write!(f, "N-CSR"),
            ReportType::FormNCSRS => write!(f, "N-CSRS"),
            ReportType::FormN1A => write!(f, "N-1A"),
            ReportType::Form485BPOS => write!(f, "485BPOS"),
            ReportType::FormNPORT => write!(f, "NPORT-P"),
            ReportType::FormNQ => write!(f, "N-Q"),
            ReportType::Other(s) => write!(f, "{}", s),
        }
    }
}

pub static REPORT_TYPES: Lazy<String> = Lazy::new(|| {
    ReportType::iter()
        .filter(|t| !matches!(t, ReportType::Other(_)))
        .map(|t| t.to_string())
        .collect::<Vec<_>>()
        .join(", ")
});

impl ReportType {
    pub fn list_types() -> &'static str {
        &REPORT_TYPES
    }

    /// Shareholder reports, the forms that carry tailored expense and return tables.
    pub fn shareholder_reports() -> Vec<ReportType> {
        vec![ReportType::FormNCSR, ReportType::FormNCSRS]
    }
}

impl FromStr for ReportType {
    type Err = String;
    fn from_str(s: &str) -> std::result::Result<ReportType, std::string::String> {
        let s = s.trim();
        if s.is_empty() {
            return Err("Form type cannot be empty".to_string());
        }
        match s.to_uppercase().as_str() {
            "N-CSR" => Ok(ReportType::FormNCSR),
            "N-CSRS" => Ok(ReportType::FormNCSRS),
            "N-1A" => Ok(ReportType::FormN1A),
            "485BPOS" => Ok(ReportType::Form485BPOS),
            "NPORT-P" | "N-PORT" => Ok(ReportType::FormNPORT),
            "N-Q" => Ok(ReportType::FormNQ),
            _ => Ok(ReportType::Other(s.to_string())),
        }
    }
}
