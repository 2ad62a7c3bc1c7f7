//! Error types for generation, export and settings storage.
//!
//! Step validation is not represented here: an incomplete step is an
//! [`IgnoreReason`](crate::IgnoreReason), not a failure.

use std::path::PathBuf;
use thiserror::Error;

/// Failure of the remote content-generation call.
#[derive(Debug, Error)]
pub enum GenerateError {
    /// No provider, model or API key has been set up.
    #[error("AI provider is not configured")]
    NotConfigured,

    /// The backend could not be built or the request failed.
    #[error("backend request failed: {0}")]
    Backend(String),

    /// The backend did not answer in time.
    #[error("backend did not respond within {secs}s")]
    Timeout { secs: u64 },

    /// The backend answered with no text.
    #[error("backend returned an empty response")]
    EmptyResponse,

    /// The response text could not be read as a report.
    #[error("malformed response: {0}")]
    Malformed(String),

    /// The response parsed but every report section was empty.
    #[error("response contains no report content")]
    InvalidPayload,
}

/// Failure while writing an exported report.
#[derive(Debug, Error)]
pub enum ExportError {
    /// Export was requested before a report was generated.
    #[error("no generated report to export")]
    NothingToExport,

    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize report: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Failure while persisting AI settings.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize settings: {0}")]
    Serialize(#[from] serde_json::Error),
}
