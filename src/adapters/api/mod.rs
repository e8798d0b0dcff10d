//! Hospital records API adapter
//!
//! Raw records come from a [`RecordSource`]: either the live REST API
//! ([`ApiClient`]) or a JSON dump on disk ([`FileSource`]). Both hand back
//! untyped JSON items; normalization into the timeline model happens in
//! [`crate::core::transform`].

pub mod client;
pub mod models;

pub use client::ApiClient;
pub use models::{extract_items, ApiEnvelope, Pagination};

use crate::domain::timestamp::parse_timestamp;
use crate::domain::{HmsExportError, PatientId, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::Value;
use std::path::{Path, PathBuf};

const APPOINTMENT_DATE_KEYS: [&str; 4] =
    ["appointmentDate", "appointment_date", "date", "scheduled_at"];

/// Source of raw timeline and appointment items
#[async_trait]
pub trait RecordSource: Send + Sync {
    /// All timeline items for one patient
    async fn fetch_timeline(&self, patient_id: &PatientId) -> Result<Vec<Value>>;

    /// Appointments, optionally restricted to one day
    async fn fetch_appointments(&self, date: Option<NaiveDate>) -> Result<Vec<Value>>;

    /// Where items come from, for log lines
    fn describe(&self) -> String;
}

/// Items read from a JSON file
///
/// Accepts a bare array, an API response (`{ "data": ... }`) or a previous
/// JSON export (`{ "records": [...] }`).
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_items(&self) -> Result<Vec<Value>> {
        let contents = tokio::fs::read(&self.path).await.map_err(|e| {
            HmsExportError::Io(format!("Failed to read {}: {e}", self.path.display()))
        })?;
        let value: Value = serde_json::from_slice(&contents).map_err(|e| {
            HmsExportError::Serialization(format!(
                "{} is not valid JSON: {e}",
                self.path.display()
            ))
        })?;
        extract_items(value)
    }
}

#[async_trait]
impl RecordSource for FileSource {
    async fn fetch_timeline(&self, patient_id: &PatientId) -> Result<Vec<Value>> {
        let items = self.read_items().await?;
        tracing::debug!(
            path = %self.path.display(),
            patient_id = %patient_id,
            count = items.len(),
            "Read timeline items from file"
        );
        Ok(items)
    }

    async fn fetch_appointments(&self, date: Option<NaiveDate>) -> Result<Vec<Value>> {
        let items = self.read_items().await?;
        let Some(date) = date else {
            return Ok(items);
        };

        // Same UTC day the exported row will carry
        Ok(items
            .into_iter()
            .filter(|item| appointment_day(item) == Some(date))
            .collect())
    }

    fn describe(&self) -> String {
        format!("file {}", self.path.display())
    }
}

fn appointment_day(item: &Value) -> Option<NaiveDate> {
    APPOINTMENT_DATE_KEYS
        .iter()
        .filter_map(|key| item.get(*key).and_then(Value::as_str))
        .find_map(parse_timestamp)
        .map(|at| at.date_naive())
}
