//! Domain error types
//!
//! This module defines the error hierarchy for hms-export.
//! All errors are domain-specific and don't expose third-party types.

use thiserror::Error;

/// Message carried by every export error raised for an empty record set.
pub const NO_DATA_TO_EXPORT: &str = "No data to export";

/// Main hms-export error type
///
/// This is the primary error type used throughout the application.
/// It wraps specific error types and provides context for error handling.
#[derive(Debug, Error)]
pub enum HmsExportError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Records API errors
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Export input errors (e.g. an empty record set)
    #[error("Export error: {0}")]
    Export(String),

    /// Document rendering errors (PDF drawing, CSV writing)
    #[error("Render error: {0}")]
    Render(String),

    /// Validation errors, including unknown status values
    #[error("Validation error: {0}")]
    Validation(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Generic errors with context
    #[error("{0}")]
    Other(String),
}

impl HmsExportError {
    /// The error raised when an exporter is handed an empty record set
    pub fn no_data() -> Self {
        HmsExportError::Export(NO_DATA_TO_EXPORT.to_string())
    }

    /// Whether this error is the empty-input export error
    pub fn is_no_data(&self) -> bool {
        matches!(self, HmsExportError::Export(msg) if msg == NO_DATA_TO_EXPORT)
    }
}

/// Records API errors
///
/// Errors that occur when talking to the hospital backend.
/// These errors don't expose third-party HTTP client types.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Failed to connect to the backend
    #[error("Failed to connect to records API: {0}")]
    ConnectionFailed(String),

    /// Response body did not match the expected envelope
    #[error("Invalid response from server: {0}")]
    InvalidResponse(String),

    /// Resource not found (404)
    #[error("Not found: {0}")]
    NotFound(String),

    /// Server error (5xx)
    #[error("Server error: {status} - {message}")]
    ServerError { status: u16, message: String },

    /// Client error (4xx)
    #[error("Client error: {status} - {message}")]
    ClientError { status: u16, message: String },

    /// Timeout
    #[error("Request timeout: {0}")]
    Timeout(String),
}

// Conversion from std::io::Error
impl From<std::io::Error> for HmsExportError {
    fn from(err: std::io::Error) -> Self {
        HmsExportError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for HmsExportError {
    fn from(err: serde_json::Error) -> Self {
        HmsExportError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for HmsExportError {
    fn from(err: toml::de::Error) -> Self {
        HmsExportError::Configuration(format!("TOML parse error: {err}"))
    }
}

// Conversion from csv writer errors
impl From<csv::Error> for HmsExportError {
    fn from(err: csv::Error) -> Self {
        HmsExportError::Render(format!("CSV write error: {err}"))
    }
}
