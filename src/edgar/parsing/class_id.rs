use anyhow::{anyhow, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

static CLASS_ID_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"C\d{9}").unwrap());

/// Share-class identifier as assigned by EDGAR: `C` followed by nine digits.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ClassId(String);

impl ClassId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for ClassId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for ClassId {
    type Err = anyhow::Error;

    /// Strict parse: the whole (trimmed) input must be a class id.
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        match CLASS_ID_RE.find(s) {
            Some(m) if m.start() == 0 && m.end() == s.len() => Ok(ClassId(s.to_string())),
            _ => Err(anyhow!("Invalid class id: {}", s)),
        }
    }
}

impl TryFrom<String> for ClassId {
    type Error = anyhow::Error;

    fn try_from(s: String) -> Result<Self> {
        ClassId::from_str(&s)
    }
}

impl From<ClassId> for String {
    fn from(id: ClassId) -> Self {
        id.0
    }
}

/// Returns the first class id embedded anywhere in `text`.
///
/// Segment members look like `ck0000051931:C000012345Member`; only the
/// ten-character `C#########` window is taken, even when more digits follow.
pub fn extract_class_id(text: &str) -> Option<ClassId> {
    CLASS_ID_RE
        .find(text)
        .map(|m| ClassId(m.as_str().to_string()))
}
