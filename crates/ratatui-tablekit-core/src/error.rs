//! Error types for the loading APIs.
//!
//! Rendering never fails: malformed schema entries are skipped. Only turning external documents
//! (JSON schemas and configuration) into typed values can produce an [`Error`].

use thiserror::Error;

/// Errors produced while loading column schemas or configuration.
#[derive(Error, Debug)]
pub enum Error {
    /// The document is not valid JSON, or does not match the expected shape.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A schema entry has the wrong type in one of its reserved keys.
    #[error("invalid column schema at {path}: {reason}")]
    Schema { path: String, reason: String },

    /// A configuration value is out of range.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl Error {
    pub(crate) fn schema(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Schema {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
