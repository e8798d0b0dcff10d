//! Export coordinator - main orchestrator for the export process
//!
//! Fetches raw items from a [`RecordSource`], normalizes them, renders the
//! requested document and writes it to the output directory. This is the one
//! place where export failures are caught and logged; they come back as
//! entries in the [`ExportSummary`].

use super::summary::{ExportError, ExportSummary};
use super::{export_appointments, export_timeline, write_artifact, ExportFormat, ExportOptions};
use crate::adapters::api::{ApiClient, FileSource, RecordSource};
use crate::config::HmsExportConfig;
use crate::core::events::AppointmentStatusStore;
use crate::core::transform::{build_timeline, normalize_appointments};
use crate::domain::{HmsExportError, PatientId, Result};
use crate::{log_error_with_context, log_export_complete, log_export_start};
use chrono::NaiveDate;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::Instrument;
use uuid::Uuid;

/// What to export
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportTarget {
    /// One patient's medical record timeline
    Timeline { patient_id: PatientId },
    /// The appointment list, optionally for a single day
    Appointments { date: Option<NaiveDate> },
}

impl std::fmt::Display for ExportTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExportTarget::Timeline { patient_id } => write!(f, "patient {patient_id} timeline"),
            ExportTarget::Appointments { date: Some(date) } => {
                write!(f, "appointments on {}", date.format("%Y-%m-%d"))
            }
            ExportTarget::Appointments { date: None } => f.write_str("appointments"),
        }
    }
}

/// A single export run
#[derive(Debug, Clone)]
pub struct ExportRequest {
    pub target: ExportTarget,
    pub format: ExportFormat,
    pub output_dir: PathBuf,
    pub options: ExportOptions,
}

impl ExportRequest {
    /// Build a request with names and report settings taken from configuration
    pub fn from_config(
        config: &HmsExportConfig,
        target: ExportTarget,
        format: ExportFormat,
    ) -> Result<Self> {
        let base_name = match &target {
            ExportTarget::Timeline { patient_id } => {
                format!("{}-{}", config.export.file_name_prefix, patient_id)
            }
            ExportTarget::Appointments { .. } => config.export.appointments_file_name_prefix.clone(),
        };

        let mut options = ExportOptions::new(base_name)
            .with_csv_header(config.export.header_strategy()?)
            .with_report(config.report.to_options()?);
        if let ExportTarget::Appointments { date: Some(date) } = &target {
            options = options.with_report_date(*date);
        }

        Ok(Self {
            target,
            format,
            output_dir: PathBuf::from(&config.export.output_dir),
            options,
        })
    }

    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    pub fn with_options(mut self, options: ExportOptions) -> Self {
        self.options = options;
        self
    }
}

/// Export coordinator
pub struct ExportCoordinator {
    source: Arc<dyn RecordSource>,
    status_store: Option<Arc<AppointmentStatusStore>>,
}

impl ExportCoordinator {
    pub fn new(source: Arc<dyn RecordSource>) -> Self {
        Self {
            source,
            status_store: None,
        }
    }

    /// Read from `input` when given, otherwise from the configured API
    pub fn from_config(config: &HmsExportConfig, input: Option<&Path>) -> Result<Self> {
        let source: Arc<dyn RecordSource> = match input {
            Some(path) => Arc::new(FileSource::new(path)),
            None => Arc::new(ApiClient::new(config.api.clone())?),
        };
        Ok(Self::new(source))
    }

    /// Apply optimistic statuses from `store` to appointment exports
    pub fn with_status_store(mut self, store: Arc<AppointmentStatusStore>) -> Self {
        self.status_store = Some(store);
        self
    }

    pub fn source(&self) -> &dyn RecordSource {
        self.source.as_ref()
    }

    /// Execute the export
    ///
    /// Never fails: every error is logged once here and recorded in the
    /// returned summary. Nothing is written unless the whole document was
    /// produced.
    pub async fn execute_export(&self, request: &ExportRequest) -> ExportSummary {
        let export_id = Uuid::new_v4();
        let span = tracing::info_span!("export", export_id = %export_id, format = %request.format);

        async {
            let start_time = Instant::now();
            let mut summary = ExportSummary::new(request.format);

            log_export_start!(request.format, request.target);

            if let Err(e) = self.run(request, &mut summary).await {
                let context = request.target.to_string();
                log_error_with_context!(&e, context.as_str());
                summary.add_error(
                    ExportError::from(&e).with_context(format!(
                        "{} from {}",
                        request.target,
                        self.source.describe()
                    )),
                );
            } else {
                log_export_complete!(summary.records_exported, start_time.elapsed());
            }

            let summary = summary.with_duration(start_time.elapsed());
            summary.log_summary();
            summary
        }
        .instrument(span)
        .await
    }

    async fn run(&self, request: &ExportRequest, summary: &mut ExportSummary) -> Result<()> {
        let (artifact, exported) = match &request.target {
            ExportTarget::Timeline { patient_id } => {
                let raw = self.source.fetch_timeline(patient_id).await?;
                summary.records_fetched = raw.len();

                let timeline = build_timeline(&raw);
                summary.records_skipped = raw.len() - timeline.len();

                (
                    export_timeline(&timeline, request.format, &request.options)?,
                    timeline.len(),
                )
            }
            ExportTarget::Appointments { date } => {
                let raw = self.source.fetch_appointments(*date).await?;
                summary.records_fetched = raw.len();

                let mut rows = normalize_appointments(&raw)?;
                if let Some(store) = &self.status_store {
                    let changed = store.apply_to(&mut rows)?;
                    if changed > 0 {
                        tracing::info!(changed, "Applied pending status changes");
                    }
                }

                (
                    export_appointments(&rows, request.format, &request.options)?,
                    rows.len(),
                )
            }
        };

        if artifact.is_empty() {
            return Err(HmsExportError::Render(format!(
                "{} export produced no bytes",
                request.format
            )));
        }

        let path = write_artifact(&request.output_dir, &artifact)?;
        summary.records_exported = exported;
        summary.bytes_written = artifact.len();
        summary.output_path = Some(path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::events::HmsEvent;
    use crate::core::export::summary::ExportErrorType;
    use crate::domain::{ApiError, AppointmentStatus, RecordId};
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use tempfile::TempDir;

    struct StaticSource {
        timeline: Vec<Value>,
        appointments: Vec<Value>,
    }

    #[async_trait]
    impl RecordSource for StaticSource {
        async fn fetch_timeline(&self, _patient_id: &PatientId) -> Result<Vec<Value>> {
            Ok(self.timeline.clone())
        }

        async fn fetch_appointments(&self, _date: Option<NaiveDate>) -> Result<Vec<Value>> {
            Ok(self.appointments.clone())
        }

        fn describe(&self) -> String {
            "static items".to_string()
        }
    }

    struct FailingSource;

    #[async_trait]
    impl RecordSource for FailingSource {
        async fn fetch_timeline(&self, _patient_id: &PatientId) -> Result<Vec<Value>> {
            Err(ApiError::ConnectionFailed("refused".to_string()).into())
        }

        async fn fetch_appointments(&self, _date: Option<NaiveDate>) -> Result<Vec<Value>> {
            Err(ApiError::Timeout("30s".to_string()).into())
        }

        fn describe(&self) -> String {
            "nowhere".to_string()
        }
    }

    fn coordinator(timeline: Vec<Value>, appointments: Vec<Value>) -> ExportCoordinator {
        ExportCoordinator::new(Arc::new(StaticSource {
            timeline,
            appointments,
        }))
    }

    fn timeline_request(dir: &Path, format: ExportFormat) -> ExportRequest {
        ExportRequest::from_config(
            &HmsExportConfig::default(),
            ExportTarget::Timeline {
                patient_id: PatientId::new("42").unwrap(),
            },
            format,
        )
        .unwrap()
        .with_output_dir(dir)
    }

    #[tokio::test]
    async fn test_timeline_export_writes_file() {
        let dir = TempDir::new().unwrap();
        let coordinator = coordinator(
            vec![
                json!({ "id": 1, "type": "appointment", "date": "2024-01-01", "title": "Checkup" }),
                json!({ "id": 2, "type": "laboratory", "date": "2024-01-03", "testName": "CBC" }),
                json!("not a record"),
            ],
            vec![],
        );

        let summary = coordinator
            .execute_export(&timeline_request(dir.path(), ExportFormat::Csv))
            .await;

        assert!(summary.is_successful(), "{:?}", summary.errors);
        assert_eq!(summary.records_fetched, 3);
        assert_eq!(summary.records_exported, 2);
        assert_eq!(summary.records_skipped, 1);
        let path = summary.output_path.unwrap();
        assert!(path
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with("medical-records-42-"));
        assert!(path.exists());
    }

    #[tokio::test]
    async fn test_empty_timeline_leaves_no_file() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("out");
        let coordinator = coordinator(vec![], vec![]);

        let summary = coordinator
            .execute_export(&timeline_request(&out, ExportFormat::Pdf))
            .await;

        assert!(!summary.is_successful());
        let error = summary.primary_error().unwrap();
        assert_eq!(error.error_type, ExportErrorType::Export);
        assert!(error.message.contains("No data to export"));
        assert!(!out.exists());
    }

    #[tokio::test]
    async fn test_source_failure_recorded() {
        let dir = TempDir::new().unwrap();
        let coordinator = ExportCoordinator::new(Arc::new(FailingSource));

        let summary = coordinator
            .execute_export(&timeline_request(dir.path(), ExportFormat::Json))
            .await;

        let error = summary.primary_error().unwrap();
        assert_eq!(error.error_type, ExportErrorType::Api);
        assert!(error.context.as_deref().unwrap().contains("nowhere"));
    }

    #[tokio::test]
    async fn test_appointment_export_applies_status_store() {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(AppointmentStatusStore::new());
        store
            .apply(&HmsEvent::PatientArrived {
                appointment_id: RecordId::from(1),
            })
            .unwrap();

        let coordinator = coordinator(
            vec![],
            vec![json!({ "id": 1, "appointmentDate": "2024-07-01T09:00:00Z", "status": "scheduled" })],
        )
        .with_status_store(store);

        let request = ExportRequest::from_config(
            &HmsExportConfig::default(),
            ExportTarget::Appointments {
                date: NaiveDate::from_ymd_opt(2024, 7, 1),
            },
            ExportFormat::Json,
        )
        .unwrap()
        .with_output_dir(dir.path());

        let summary = coordinator.execute_export(&request).await;
        assert!(summary.is_successful(), "{:?}", summary.errors);

        let bytes = std::fs::read(summary.output_path.unwrap()).unwrap();
        let parsed: crate::core::export::JsonExport<crate::domain::AppointmentRow> =
            crate::core::export::read_json(&bytes).unwrap();
        assert_eq!(parsed.records[0].status, AppointmentStatus::CheckedIn);
    }

    #[tokio::test]
    async fn test_unknown_appointment_status_fails_export() {
        let dir = TempDir::new().unwrap();
        let coordinator = coordinator(
            vec![],
            vec![json!({ "id": 1, "appointmentDate": "2024-07-01", "status": "teleported" })],
        );
        let request = ExportRequest::from_config(
            &HmsExportConfig::default(),
            ExportTarget::Appointments { date: None },
            ExportFormat::Csv,
        )
        .unwrap()
        .with_output_dir(dir.path());

        let summary = coordinator.execute_export(&request).await;
        assert_eq!(
            summary.primary_error().unwrap().error_type,
            ExportErrorType::Input
        );
    }
}
