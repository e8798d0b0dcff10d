//! Appointments command implementation
//!
//! Exports the appointment list as CSV, JSON or a landscape PDF report.
//! Status changes recorded from the dashboard (`--events`) are applied on top
//! of what the backend returns.

use super::{load_for_command, report_summary, resolve_format, EXIT_CONFIG, EXIT_FATAL};
use crate::core::events::{read_event_log, replay};
use crate::core::export::{ExportCoordinator, ExportRequest, ExportTarget};
use chrono::{Local, NaiveDate};
use clap::Args;
use std::path::PathBuf;
use std::sync::Arc;

/// Arguments for the appointments command
#[derive(Args, Debug)]
pub struct AppointmentsArgs {
    /// Only appointments on this day (YYYY-MM-DD)
    #[arg(short, long, value_name = "DATE", conflicts_with = "today")]
    pub date: Option<NaiveDate>,

    /// Only today's appointments
    #[arg(long)]
    pub today: bool,

    /// Read appointments from a JSON file instead of the records API
    #[arg(short, long, value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// Output format (csv, json or pdf); defaults to export.default_format
    #[arg(short, long)]
    pub format: Option<String>,

    /// Output directory; defaults to export.output_dir
    #[arg(short, long, value_name = "DIR")]
    pub output: Option<PathBuf>,

    /// Appointment events to apply (JSON array or one event per line)
    #[arg(long, value_name = "FILE")]
    pub events: Option<PathBuf>,
}

impl AppointmentsArgs {
    fn report_date(&self) -> Option<NaiveDate> {
        if self.today {
            Some(Local::now().date_naive())
        } else {
            self.date
        }
    }

    /// Execute the appointments command
    pub async fn execute(&self, config_path: Option<&str>) -> anyhow::Result<i32> {
        let date = self.report_date();
        tracing::info!(date = ?date, "Starting appointments command");

        let config = match load_for_command(config_path) {
            Ok(c) => c,
            Err(code) => return Ok(code),
        };

        let format = match resolve_format(self.format.as_deref(), &config) {
            Ok(f) => f,
            Err(code) => return Ok(code),
        };

        let mut request =
            match ExportRequest::from_config(&config, ExportTarget::Appointments { date }, format) {
                Ok(r) => r,
                Err(e) => {
                    eprintln!("❌ {e}");
                    return Ok(EXIT_CONFIG);
                }
            };
        if let Some(dir) = &self.output {
            request = request.with_output_dir(dir);
        }

        let mut coordinator =
            match ExportCoordinator::from_config(&config, self.input.as_deref()) {
                Ok(c) => c,
                Err(e) => {
                    tracing::error!(error = %e, "Failed to create export coordinator");
                    eprintln!("Failed to initialize export: {e}");
                    return Ok(EXIT_FATAL);
                }
            };

        if let Some(path) = &self.events {
            let store = match read_event_log(path).await {
                Ok(events) => replay(events).await,
                Err(e) => Err(e),
            };
            match store {
                Ok(store) => {
                    tracing::info!(tracked = store.len(), "Loaded appointment events");
                    coordinator = coordinator.with_status_store(Arc::new(store));
                }
                Err(e) => {
                    eprintln!("❌ {e}");
                    return Ok(EXIT_CONFIG);
                }
            }
        }

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
