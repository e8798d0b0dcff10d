//! Export formats and artifacts
//!
//! Every exporter is a function from records plus [`ExportOptions`] to an
//! [`ExportArtifact`] held in memory. Nothing touches the disk until
//! [`write_artifact`] is called with a finished artifact, so a failed export
//! never leaves a partial file behind.

pub mod coordinator;
pub mod csv;
pub mod json;
pub mod pdf;
pub mod summary;

pub use coordinator::{ExportCoordinator, ExportRequest, ExportTarget};
pub use csv::{write_csv, HeaderStrategy, UTF8_BOM};
pub use json::{read_json, write_json, JsonExport};
pub use pdf::{build_appointment_layout, build_records_layout, render_pdf, ReportOptions};
pub use summary::{ExportError, ExportErrorType, ExportSummary};

use crate::core::transform::{appointments_to_rows, flatten_records_for_csv};
use crate::domain::{AppointmentRow, HmsExportError, PatientInfo, Result, TimelineEntry};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Output document format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Csv,
    Json,
    Pdf,
}

impl ExportFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
            ExportFormat::Pdf => "pdf",
        }
    }

    /// File extension, without the dot
    pub fn extension(&self) -> &'static str {
        self.as_str()
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "text/csv; charset=utf-8",
            ExportFormat::Json => "application/json",
            ExportFormat::Pdf => "application/pdf",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExportFormat {
    type Err = HmsExportError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "csv" | "spreadsheet" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            "pdf" | "report" => Ok(Self::Pdf),
            _ => Err(HmsExportError::Configuration(format!(
                "Invalid export format: {s}. Expected 'csv', 'json' or 'pdf'"
            ))),
        }
    }
}

/// Everything an export needs besides the records themselves
#[derive(Debug, Clone)]
pub struct ExportOptions {
    /// File name without date suffix or extension
    pub base_name: String,
    pub csv_header: HeaderStrategy,
    pub report: ReportOptions,
    /// Printed in the patient box of the records report
    pub patient: Option<PatientInfo>,
    /// Day the appointment report covers
    pub report_date: Option<NaiveDate>,
    pub generated_at: DateTime<Utc>,
}

impl ExportOptions {
    pub fn new(base_name: impl Into<String>) -> Self {
        Self {
            base_name: base_name.into(),
            csv_header: HeaderStrategy::default(),
            report: ReportOptions::default(),
            patient: None,
            report_date: None,
            generated_at: Utc::now(),
        }
    }

    pub fn with_csv_header(mut self, strategy: HeaderStrategy) -> Self {
        self.csv_header = strategy;
        self
    }

    pub fn with_report(mut self, report: ReportOptions) -> Self {
        self.report = report;
        self
    }

    pub fn with_patient(mut self, patient: PatientInfo) -> Self {
        self.patient = Some(patient);
        self
    }

    pub fn with_report_date(mut self, date: NaiveDate) -> Self {
        self.report_date = Some(date);
        self
    }

    pub fn with_generated_at(mut self, at: DateTime<Utc>) -> Self {
        self.generated_at = at;
        self
    }
}

/// A finished export held in memory
#[derive(Debug, Clone, PartialEq)]
pub struct ExportArtifact {
    pub file_name: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

impl ExportArtifact {
    fn new(base_name: &str, format: ExportFormat, date: NaiveDate, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name_for(base_name, format, date),
            content_type: format.content_type(),
            bytes,
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

fn sanitize_base_name(base: &str) -> String {
    let cleaned: String = base
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.' {
                c
            } else {
                '-'
            }
        })
        .collect();
    let cleaned = cleaned.trim_matches(['-', '.']).to_string();
    if cleaned.is_empty() {
        "export".to_string()
    } else {
        cleaned
    }
}

/// `<name>-YYYY-MM-DD.csv`, `<name>-YYYY-MM-DD.json` or `<name>.pdf`
///
/// ```
/// use chrono::NaiveDate;
/// use hms_export::core::export::{file_name_for, ExportFormat};
///
/// let day = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
/// assert_eq!(file_name_for("medical-records", ExportFormat::Csv, day), "medical-records-2024-03-09.csv");
/// assert_eq!(file_name_for("Jane Doe", ExportFormat::Pdf, day), "Jane-Doe.pdf");
/// ```
pub fn file_name_for(base: &str, format: ExportFormat, date: NaiveDate) -> String {
    let base = sanitize_base_name(base);
    match format {
        ExportFormat::Pdf => format!("{base}.pdf"),
        _ => format!("{base}-{}.{}", date.format("%Y-%m-%d"), format.extension()),
    }
}

/// Export a patient timeline in the requested format
///
/// # Errors
///
/// Fails with the "No data to export" error when `records` is empty, and
/// with a render error when the document cannot be produced.
pub fn export_timeline(
    records: &[TimelineEntry],
    format: ExportFormat,
    options: &ExportOptions,
) -> Result<ExportArtifact> {
    if records.is_empty() {
        return Err(HmsExportError::no_data());
    }

    let bytes = match format {
        ExportFormat::Csv => write_csv(&flatten_records_for_csv(records)?, options.csv_header)?,
        ExportFormat::Json => write_json(records, options.generated_at)?,
        ExportFormat::Pdf => {
            let layout = build_records_layout(
                records,
                options.patient.as_ref(),
                &options.report,
                options.generated_at,
            )?;
            render_pdf(&layout)?
        }
    };

    tracing::debug!(
        format = %format,
        records = records.len(),
        bytes = bytes.len(),
        "Timeline export produced"
    );

    Ok(ExportArtifact::new(
        &options.base_name,
        format,
        options.generated_at.date_naive(),
        bytes,
    ))
}

/// Export an appointment list in the requested format
///
/// # Errors
///
/// Fails with the "No data to export" error when `appointments` is empty.
pub fn export_appointments(
    appointments: &[AppointmentRow],
    format: ExportFormat,
    options: &ExportOptions,
) -> Result<ExportArtifact> {
    if appointments.is_empty() {
        return Err(HmsExportError::no_data());
    }

    let bytes = match format {
        ExportFormat::Csv => write_csv(&appointments_to_rows(appointments), options.csv_header)?,
        ExportFormat::Json => write_json(appointments, options.generated_at)?,
        ExportFormat::Pdf => {
            let layout = build_appointment_layout(
                appointments,
                options.report_date,
                &options.report,
                options.generated_at,
            )?;
            render_pdf(&layout)?
        }
    };

    tracing::debug!(
        format = %format,
        appointments = appointments.len(),
        bytes = bytes.len(),
        "Appointment export produced"
    );

    Ok(ExportArtifact::new(
        &options.base_name,
        format,
        options.generated_at.date_naive(),
        bytes,
    ))
}

/// Write a finished artifact into `dir`
///
/// Bytes go to a hidden temporary file first and are renamed into place, so
/// readers never observe a half-written export.
pub fn write_artifact(dir: impl AsRef<Path>, artifact: &ExportArtifact) -> Result<PathBuf> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir).map_err(|e| {
        HmsExportError::Io(format!(
            "Failed to create output directory {}: {e}",
            dir.display()
        ))
    })?;

    let target = dir.join(&artifact.file_name);
    let staging = dir.join(format!(".{}.partial", artifact.file_name));

    fs::write(&staging, &artifact.bytes).map_err(|e| {
        HmsExportError::Io(format!("Failed to write {}: {e}", staging.display()))
    })?;
    if let Err(e) = fs::rename(&staging, &target) {
        let _ = fs::remove_file(&staging);
        return Err(HmsExportError::Io(format!(
            "Failed to move export into place at {}: {e}",
            target.display()
        )));
    }

    tracing::info!(
        path = %target.display(),
        bytes = artifact.bytes.len(),
        "Export written"
    );

    Ok(target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AppointmentStatus, RecordType, Vitals};
    use chrono::TimeZone;
    use tempfile::TempDir;
    use test_case::test_case;

    fn generated() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 2, 14, 30, 0).unwrap()
    }

    fn options() -> ExportOptions {
        ExportOptions::new("medical-records").with_generated_at(generated())
    }

    fn records() -> Vec<TimelineEntry> {
        let date = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        vec![TimelineEntry::new(1, RecordType::Appointment, date)
            .with_title("Checkup")
            .with_status("completed")
            .with_vitals(Vitals {
                temperature: Some(37.0),
                ..Vitals::default()
            })]
    }

    #[test_case("csv", ExportFormat::Csv; "csv lowercase")]
    #[test_case("CSV", ExportFormat::Csv; "csv uppercase")]
    #[test_case(" Json ", ExportFormat::Json; "json padded")]
    #[test_case("pdf", ExportFormat::Pdf; "pdf")]
    #[test_case("report", ExportFormat::Pdf; "report alias")]
    fn test_export_format_from_str(input: &str, expected: ExportFormat) {
        assert_eq!(input.parse::<ExportFormat>().unwrap(), expected);
    }

    #[test]
    fn test_export_format_rejects_unknown() {
        let err = "xlsx".parse::<ExportFormat>().unwrap_err();
        assert!(matches!(err, HmsExportError::Configuration(_)));
    }

    #[test]
    fn test_file_names() {
        let day = NaiveDate::from_ymd_opt(2024, 5, 2).unwrap();
        assert_eq!(
            file_name_for("medical-records", ExportFormat::Json, day),
            "medical-records-2024-05-02.json"
        );
        assert_eq!(file_name_for("../etc/passwd", ExportFormat::Pdf, day), "etc-passwd.pdf");
        assert_eq!(file_name_for("  ", ExportFormat::Csv, day), "export-2024-05-02.csv");
    }

    #[test]
    fn test_export_timeline_csv_artifact() {
        let artifact = export_timeline(&records(), ExportFormat::Csv, &options()).unwrap();
        assert_eq!(artifact.file_name, "medical-records-2024-05-02.csv");
        assert_eq!(artifact.content_type, "text/csv; charset=utf-8");
        assert!(artifact.bytes.starts_with(UTF8_BOM));
    }

    #[test]
    fn test_export_timeline_pdf_artifact() {
        let artifact = export_timeline(&records(), ExportFormat::Pdf, &options()).unwrap();
        assert_eq!(artifact.file_name, "medical-records.pdf");
        assert_eq!(artifact.content_type, "application/pdf");
        assert!(artifact.bytes.starts_with(b"%PDF"));
    }

    #[test_case(ExportFormat::Csv; "csv")]
    #[test_case(ExportFormat::Json; "json")]
    #[test_case(ExportFormat::Pdf; "pdf")]
    fn test_empty_input_rejected(format: ExportFormat) {
        let err = export_timeline(&[], format, &options()).unwrap_err();
        assert!(err.to_string().contains("No data to export"));
        let err = export_appointments(&[], format, &options()).unwrap_err();
        assert!(err.is_no_data());
    }

    #[test]
    fn test_export_appointments_json() {
        let date = Utc.with_ymd_and_hms(2024, 5, 2, 9, 0, 0).unwrap();
        let rows = vec![AppointmentRow::new(7, date, AppointmentStatus::CheckedIn)];
        let artifact = export_appointments(
            &rows,
            ExportFormat::Json,
            &ExportOptions::new("appointments").with_generated_at(generated()),
        )
        .unwrap();
        assert_eq!(artifact.file_name, "appointments-2024-05-02.json");

        let parsed: JsonExport<AppointmentRow> = read_json(&artifact.bytes).unwrap();
        assert_eq!(parsed.total_records, 1);
        assert_eq!(parsed.records, rows);
    }

    #[test]
    fn test_write_artifact_creates_directory() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("nested").join("exports");
        let artifact = export_timeline(&records(), ExportFormat::Json, &options()).unwrap();

        let path = write_artifact(&out, &artifact).unwrap();

        assert_eq!(path, out.join("medical-records-2024-05-02.json"));
        assert_eq!(fs::read(&path).unwrap(), artifact.bytes);
        let leftovers: Vec<_> = fs::read_dir(&out)
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(".partial"))
            .collect();
        assert!(leftovers.is_empty());
    }
}
