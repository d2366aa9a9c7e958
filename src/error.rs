use thiserror::Error;

/// Failure categories surfaced by the pipeline.
///
/// Only `Configuration` and `EmptyResult` ever reach the caller of a batch.
/// `Fetch` and `Shape` are raised per filing and recovered by skipping it.
#[derive(Debug, Error)]
pub enum DisclosureError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("failed to fetch {reference}: {message}")]
    Fetch { reference: String, message: String },

    #[error("unexpected document shape for {reference}: {message}")]
    Shape { reference: String, message: String },

    #[error("no valid data extracted")]
    EmptyResult,
}

impl DisclosureError {
    pub fn configuration(message: impl Into<String>) -> Self {
        DisclosureError::Configuration(message.into())
    }

    pub fn fetch(reference: impl Into<String>, message: impl ToString) -> Self {
        DisclosureError::Fetch {
            reference: reference.into(),
            message: message.to_string(),
        }
    }

    pub fn shape(reference: impl Into<String>, message: impl Into<String>) -> Self {
        DisclosureError::Shape {
            reference: reference.into(),
            message: message.into(),
        }
    }

    pub fn is_configuration(&self) -> bool {
        matches!(self, DisclosureError::Configuration(_))
    }
}
