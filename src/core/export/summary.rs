//! Export summary and reporting
//!
//! This module defines structures for tracking and reporting export results.

use super::ExportFormat;
use crate::domain::HmsExportError;
use std::path::PathBuf;
use std::time::Duration;

/// Summary of an export operation
#[derive(Debug, Clone)]
pub struct ExportSummary {
    /// Requested output format
    pub format: ExportFormat,

    /// Raw records received from the source
    pub records_fetched: usize,

    /// Records that made it into the document
    pub records_exported: usize,

    /// Raw records dropped by normalization
    pub records_skipped: usize,

    /// Where the document was written, if it was
    pub output_path: Option<PathBuf>,

    /// Size of the written document
    pub bytes_written: usize,

    /// Duration of the export
    pub duration: Duration,

    /// Errors encountered during export
    pub errors: Vec<ExportError>,
}

impl ExportSummary {
    /// Create a new empty export summary
    pub fn new(format: ExportFormat) -> Self {
        Self {
            format,
            records_fetched: 0,
            records_exported: 0,
            records_skipped: 0,
            output_path: None,
            bytes_written: 0,
            duration: Duration::from_secs(0),
            errors: Vec::new(),
        }
    }

    /// Set the duration
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    /// Add an error
    pub fn add_error(&mut self, error: ExportError) {
        self.errors.push(error);
    }

    /// Check if the export produced a file without errors
    pub fn is_successful(&self) -> bool {
        self.errors.is_empty() && self.output_path.is_some()
    }

    /// The first recorded error, which decides the exit code
    pub fn primary_error(&self) -> Option<&ExportError> {
        self.errors.first()
    }

    /// Log the summary
    pub fn log_summary(&self) {
        tracing::info!(
            format = %self.format,
            fetched = self.records_fetched,
            exported = self.records_exported,
            skipped = self.records_skipped,
            bytes = self.bytes_written,
            output = ?self.output_path,
            duration_ms = self.duration.as_millis() as u64,
            "Export summary"
        );

        if !self.errors.is_empty() {
            tracing::warn!(
                error_count = self.errors.len(),
                "Export completed with errors"
            );
            for error in &self.errors {
                tracing::warn!(
                    error_type = ?error.error_type,
                    message = %error.message,
                    context = ?error.context,
                    "Export error"
                );
            }
        }
    }
}

impl Default for ExportSummary {
    fn default() -> Self {
        Self::new(ExportFormat::default())
    }
}

/// Type of export error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportErrorType {
    /// Records API could not be reached or answered with an error
    Api,
    /// Input file could not be read or parsed
    Input,
    /// Nothing to export, or an exporter rejected its input
    Export,
    /// Document could not be produced
    Render,
    /// Output could not be written
    Storage,
    /// Configuration error
    Configuration,
    /// Unknown error
    Unknown,
}

impl ExportErrorType {
    /// Classify a domain error
    pub fn of(error: &HmsExportError) -> Self {
        match error {
            HmsExportError::Api(_) => ExportErrorType::Api,
            HmsExportError::Serialization(_) | HmsExportError::Validation(_) => {
                ExportErrorType::Input
            }
            HmsExportError::Export(_) => ExportErrorType::Export,
            HmsExportError::Render(_) => ExportErrorType::Render,
            HmsExportError::Io(_) => ExportErrorType::Storage,
            HmsExportError::Configuration(_) => ExportErrorType::Configuration,
            HmsExportError::Other(_) => ExportErrorType::Unknown,
        }
    }
}

/// Export error with context
#[derive(Debug, Clone)]
pub struct ExportError {
    /// Type of error
    pub error_type: ExportErrorType,

    /// Error message
    pub message: String,

    /// Optional context (e.g., patient ID, input path)
    pub context: Option<String>,
}

impl ExportError {
    /// Create a new export error
    pub fn new(error_type: ExportErrorType, message: String) -> Self {
        Self {
            error_type,
            message,
            context: None,
        }
    }

    /// Add context to the error
    pub fn with_context(mut self, context: String) -> Self {
        self.context = Some(context);
        self
    }
}

impl From<&HmsExportError> for ExportError {
    fn from(error: &HmsExportError) -> Self {
        ExportError::new(ExportErrorType::of(error), error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ApiError;

    #[test]
    fn test_export_summary_creation() {
        let summary = ExportSummary::new(ExportFormat::Pdf);

        assert_eq!(summary.format, ExportFormat::Pdf);
        assert_eq!(summary.records_fetched, 0);
        assert_eq!(summary.records_exported, 0);
        assert_eq!(summary.records_skipped, 0);
        assert!(summary.output_path.is_none());
        assert_eq!(summary.duration, Duration::from_secs(0));
        assert!(summary.errors.is_empty());
    }

    #[test]
    fn test_export_summary_with_duration() {
        let summary = ExportSummary::default().with_duration(Duration::from_secs(2));

        assert_eq!(summary.duration, Duration::from_secs(2));
    }

    #[test]
    fn test_export_summary_is_successful() {
        let mut summary = ExportSummary::default();
        assert!(!summary.is_successful());

        summary.output_path = Some(PathBuf::from("exports/medical-records.pdf"));
        assert!(summary.is_successful());

        summary.add_error(ExportError::new(
            ExportErrorType::Storage,
            "disk full".to_string(),
        ));
        assert!(!summary.is_successful());
    }

    #[test]
    fn test_export_error_with_context() {
        let error = ExportError::new(ExportErrorType::Api, "Request failed".to_string())
            .with_context("patient_id=42".to_string());

        assert_eq!(error.error_type, ExportErrorType::Api);
        assert_eq!(error.context, Some("patient_id=42".to_string()));
    }

    #[test]
    fn test_error_classification() {
        let cases = [
            (HmsExportError::no_data(), ExportErrorType::Export),
            (
                HmsExportError::Api(ApiError::Timeout("30s".to_string())),
                ExportErrorType::Api,
            ),
            (HmsExportError::Render("font".to_string()), ExportErrorType::Render),
            (HmsExportError::Io("denied".to_string()), ExportErrorType::Storage),
            (
                HmsExportError::Serialization("eof".to_string()),
                ExportErrorType::Input,
            ),
        ];
        for (error, expected) in cases {
            assert_eq!(ExportError::from(&error).error_type, expected);
        }
    }

    #[test]
    fn test_primary_error_is_first() {
        let mut summary = ExportSummary::default();
        summary.add_error(ExportError::new(ExportErrorType::Api, "first".to_string()));
        summary.add_error(ExportError::new(ExportErrorType::Unknown, "second".to_string()));

        assert_eq!(summary.primary_error().unwrap().message, "first");
    }
}
