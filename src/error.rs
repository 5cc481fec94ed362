//! Error types for Classroom Lens

use thiserror::Error;

/// Errors that can occur while reading reports or encoding their views
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Failed to parse behavior report: {0}")]
    ParseError(String),

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Invalid report: {0}")]
    InvalidReport(String),

    #[error("Encoding error: {0}")]
    EncodingError(String),
}
