//! Export command implementation
//!
//! This module implements the `export` command for exporting one patient's
//! medical record timeline as CSV, JSON or PDF.

use super::{load_for_command, report_summary, resolve_format, EXIT_CONFIG, EXIT_FATAL};
use crate::core::export::{ExportCoordinator, ExportRequest, ExportTarget};
use crate::domain::{PatientId, PatientInfo};
use chrono::NaiveDate;
use clap::Args;
use std::path::PathBuf;

/// Arguments for the export command
#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Patient whose timeline is exported
    #[arg(short, long)]
    pub patient_id: String,

    /// Read records from a JSON file instead of the records API
    #[arg(short, long, value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// Output format (csv, json or pdf); defaults to export.default_format
    #[arg(short, long)]
    pub format: Option<String>,

    /// Output directory; defaults to export.output_dir
    #[arg(short, long, value_name = "DIR")]
    pub output: Option<PathBuf>,

    /// File name without date or extension
    #[arg(long)]
    pub name: Option<String>,

    /// Patient name printed in the PDF patient box
    #[arg(long)]
    pub patient_name: Option<String>,

    /// Patient number printed in the PDF patient box
    #[arg(long)]
    pub patient_number: Option<String>,

    /// Date of birth (YYYY-MM-DD) printed in the PDF patient box
    #[arg(long, value_name = "DATE")]
    pub date_of_birth: Option<NaiveDate>,
}

impl ExportArgs {
    fn patient_info(&self) -> Option<PatientInfo> {
        let name = self.patient_name.as_ref()?;
        let mut patient = PatientInfo::new(name.clone());
        patient.patient_number = self.patient_number.clone();
        patient.date_of_birth = self.date_of_birth;
        Some(patient)
    }

    /// Execute the export command
    pub async fn execute(&self, config_path: Option<&str>) -> anyhow::Result<i32> {
        tracing::info!(patient_id = %self.patient_id, "Starting export command");

        let config = match load_for_command(config_path) {
            Ok(c) => c,
            Err(code) => return Ok(code),
        };

        let patient_id = match PatientId::new(self.patient_id.as_str()) {
            Ok(id) => id,
            Err(e) => {
                eprintln!("❌ {e}");
                return Ok(EXIT_CONFIG);
            }
        };

        let format = match resolve_format(self.format.as_deref(), &config) {
            Ok(f) => f,
            Err(code) => return Ok(code),
        };

        let mut request =
            match ExportRequest::from_config(&config, ExportTarget::Timeline { patient_id }, format)
            {
                Ok(r) => r,
                Err(e) => {
                    eprintln!("❌ {e}");
                    return Ok(EXIT_CONFIG);
                }
            };
        if let Some(dir) = &self.output {
            request = request.with_output_dir(dir);
        }
        if let Some(name) = &self.name {
            request.options.base_name = name.clone();
        }
        if let Some(patient) = self.patient_info() {
            request.options = request.options.with_patient(patient);
        }

        let coordinator = match ExportCoordinator::from_config(&config, self.input.as_deref()) {
            Ok(c) => c,
            Err(e) => {
                tracing::error!(error = %e, "Failed to create export coordinator");
                eprintln!("Failed to initialize export: {e}");
                return Ok(EXIT_FATAL);
            }
        };

        println!(
            "🚀 Exporting {} as {} from {}",
            request.target,
            request.format,
            coordinator.source().describe()
        );

        let summary = coordinator.execute_export(&request).await;
        Ok(report_summary(&summary))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use clap::Parser;
    use serde_json::json;
    use tempfile::TempDir;

    fn parse(args: &[&str]) -> ExportArgs {
        match Cli::parse_from(args).command {
            Commands::Export(args) => args,
            other => panic!("Expected export, got {other:?}"),
        }
    }

    #[test]
    fn test_export_args_parse() {
        let args = parse(&[
            "hms-export",
            "export",
            "--patient-id",
            "42",
            "--format",
            "pdf",
            "--patient-name",
            "Jane Doe",
            "--date-of-birth",
            "1980-02-29",
        ]);

        assert_eq!(args.patient_id, "42");
        assert_eq!(args.format.as_deref(), Some("pdf"));
        let patient = args.patient_info().unwrap();
        assert_eq!(patient.name, "Jane Doe");
        assert_eq!(patient.date_of_birth, NaiveDate::from_ymd_opt(1980, 2, 29));
    }

    #[test]
    fn test_no_patient_box_without_name() {
        let args = parse(&["hms-export", "export", "-p", "42", "--patient-number", "P-1"]);
        assert!(args.patient_info().is_none());
    }

    #[tokio::test]
    async fn test_export_from_file() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("records.json");
        std::fs::write(
            &input,
            json!([{ "id": 1, "type": "appointment", "date": "2024-01-01", "title": "Checkup" }])
                .to_string(),
        )
        .unwrap();
        let out = dir.path().join("out");

        let args = parse(&[
            "hms-export",
            "export",
            "-p",
            "42",
            "--input",
            input.to_str().unwrap(),
            "--output",
            out.to_str().unwrap(),
            "--format",
            "json",
            "--name",
            "timeline",
        ]);

        let config = dir.path().join("hms-export.toml");
        std::fs::write(&config, "[report]\nhospital_name = \"Test Hospital\"\n").unwrap();

        let code = args.execute(Some(config.to_str().unwrap())).await.unwrap();

        assert_eq!(code, crate::cli::commands::EXIT_SUCCESS);
        let written: Vec<_> = std::fs::read_dir(&out).unwrap().collect();
        assert_eq!(written.len(), 1);
    }

    #[tokio::test]
    async fn test_patient_id_with_url_syntax_is_rejected() {
        let dir = TempDir::new().unwrap();
        let config = dir.path().join("hms-export.toml");
        std::fs::write(&config, "").unwrap();
        let out = dir.path().join("out");

        let args = parse(&[
            "hms-export",
            "export",
            "-p",
            "../42",
            "--output",
            out.to_str().unwrap(),
        ]);
        let code = args.execute(Some(config.to_str().unwrap())).await.unwrap();

        assert_eq!(code, EXIT_CONFIG);
        assert!(!out.exists());
    }

    #[tokio::test]
    async fn test_missing_explicit_config_is_config_error() {
        let dir = TempDir::new().unwrap();
        let args = parse(&["hms-export", "export", "-p", "42"]);
        let missing = dir.path().join("absent.toml");

        let code = args.execute(Some(missing.to_str().unwrap())).await.unwrap();
        assert_eq!(code, EXIT_CONFIG);
    }
}
