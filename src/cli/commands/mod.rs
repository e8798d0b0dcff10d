//! CLI command implementations
//!
//! Exit codes shared by every command:
//!
//! | Code | Meaning |
//! |------|---------|
//! | 0 | Success |
//! | 2 | Configuration error |
//! | 3 | Export error (including "No data to export") |
//! | 4 | Records API or connection error |
//! | 5 | Fatal error |

pub mod appointments;
pub mod export;
pub mod init;
pub mod validate;

use crate::config::{load_config_or_default, HmsExportConfig};
use crate::core::export::{ExportErrorType, ExportFormat, ExportSummary};

pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_CONFIG: i32 = 2;
pub const EXIT_EXPORT: i32 = 3;
pub const EXIT_API: i32 = 4;
pub const EXIT_FATAL: i32 = 5;

/// Exit code for a failed export
pub fn exit_code_for(error_type: ExportErrorType) -> i32 {
    match error_type {
        ExportErrorType::Configuration => EXIT_CONFIG,
        ExportErrorType::Export | ExportErrorType::Input | ExportErrorType::Render => EXIT_EXPORT,
        ExportErrorType::Api => EXIT_API,
        ExportErrorType::Storage | ExportErrorType::Unknown => EXIT_FATAL,
    }
}

/// Load configuration for a command, printing the failure
pub(crate) fn load_for_command(config_path: Option<&str>) -> Result<HmsExportConfig, i32> {
    load_config_or_default(config_path).map_err(|e| {
        tracing::error!(error = %e, "Failed to load configuration");
        eprintln!("❌ Failed to load configuration: {e}");
        EXIT_CONFIG
    })
}

/// CLI format flag, falling back to the configured default
pub(crate) fn resolve_format(
    flag: Option<&str>,
    config: &HmsExportConfig,
) -> Result<ExportFormat, i32> {
    let parsed = match flag {
        Some(f) => f.parse(),
        None => config.export.format(),
    };
    parsed.map_err(|e| {
        eprintln!("❌ {e}");
        EXIT_CONFIG
    })
}

/// Print the summary and turn it into an exit code
pub(crate) fn report_summary(summary: &ExportSummary) -> i32 {
    println!();
    println!("📊 Export Summary:");
    println!("  Format: {}", summary.format);
    println!("  Records fetched: {}", summary.records_fetched);
    println!("  Records exported: {}", summary.records_exported);
    if summary.records_skipped > 0 {
        println!("  Records skipped: {}", summary.records_skipped);
    }
    println!("  Duration: {:.2}s", summary.duration.as_secs_f64());

    if let Some(path) = &summary.output_path {
        println!("  Output: {} ({} bytes)", path.display(), summary.bytes_written);
    }
    println!();

    match summary.primary_error() {
        None => {
            println!("✅ Export completed successfully!");
            EXIT_SUCCESS
        }
        Some(error) => {
            println!("❌ Export failed: {}", error.message);
            if let Some(context) = &error.context {
                println!("   Context: {context}");
            }
            exit_code_for(error.error_type)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::export::ExportError;
    use std::path::PathBuf;

    #[test]
    fn test_exit_codes() {
        assert_eq!(exit_code_for(ExportErrorType::Configuration), 2);
        assert_eq!(exit_code_for(ExportErrorType::Export), 3);
        assert_eq!(exit_code_for(ExportErrorType::Api), 4);
        assert_eq!(exit_code_for(ExportErrorType::Storage), 5);
    }

    #[test]
    fn test_report_summary_exit_code() {
        let mut summary = ExportSummary::new(ExportFormat::Csv);
        summary.output_path = Some(PathBuf::from("exports/medical-records-2024-01-01.csv"));
        assert_eq!(report_summary(&summary), EXIT_SUCCESS);

        let mut failed = ExportSummary::new(ExportFormat::Csv);
        failed.add_error(ExportError::new(
            ExportErrorType::Export,
            "Export error: No data to export".to_string(),
        ));
        assert_eq!(report_summary(&failed), EXIT_EXPORT);
    }

    #[test]
    fn test_resolve_format() {
        let config = HmsExportConfig::default();
        assert_eq!(resolve_format(Some("PDF"), &config), Ok(ExportFormat::Pdf));
        assert_eq!(resolve_format(None, &config), Ok(ExportFormat::Csv));
        assert_eq!(resolve_format(Some("docx"), &config), Err(EXIT_CONFIG));
    }
}
