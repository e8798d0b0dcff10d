//! JSON export envelope

use crate::domain::{HmsExportError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Envelope<'a, T> {
    export_date: DateTime<Utc>,
    total_records: usize,
    records: &'a [T],
}

/// A JSON export read back from disk
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JsonExport<T> {
    pub export_date: DateTime<Utc>,
    pub total_records: usize,
    pub records: Vec<T>,
}

/// Serialize records into the pretty-printed export envelope
///
/// The records are written unchanged, so reading the `records` array back
/// yields values equal to the input.
///
/// # Errors
///
/// Returns the "No data to export" error when `records` is empty.
pub fn write_json<T: Serialize>(records: &[T], exported_at: DateTime<Utc>) -> Result<Vec<u8>> {
    if records.is_empty() {
        return Err(HmsExportError::no_data());
    }

    let envelope = Envelope {
        export_date: exported_at,
        total_records: records.len(),
        records,
    };

    Ok(serde_json::to_vec_pretty(&envelope)?)
}

/// Parse a previously written export
pub fn read_json<T: serde::de::DeserializeOwned>(bytes: &[u8]) -> Result<JsonExport<T>> {
    Ok(serde_json::from_slice(bytes)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{RecordType, TimelineEntry, Vitals};
    use chrono::TimeZone;

    #[test]
    fn test_envelope_round_trip() {
        let date = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let records = vec![TimelineEntry::new(1, RecordType::Appointment, date)
            .with_title("Checkup")
            .with_status("completed")
            .with_vitals(Vitals {
                temperature: Some(37.0),
                ..Default::default()
            })];
        let exported_at = Utc.with_ymd_and_hms(2024, 3, 5, 12, 30, 0).unwrap();

        let bytes = write_json(&records, exported_at).unwrap();
        let parsed: JsonExport<TimelineEntry> = read_json(&bytes).unwrap();

        assert_eq!(parsed.total_records, 1);
        assert_eq!(parsed.export_date, exported_at);
        assert_eq!(parsed.records, records);
    }

    #[test]
    fn test_envelope_keys_are_camel_case() {
        let date = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let records = vec![TimelineEntry::new(1, RecordType::MedicalRecord, date)];

        let bytes = write_json(&records, date).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

        assert!(value.get("exportDate").is_some());
        assert_eq!(value["totalRecords"], 1);
        assert_eq!(value["records"][0]["type"], "medical_record");
    }

    #[test]
    fn test_empty_records_rejected() {
        let date = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let err = write_json::<TimelineEntry>(&[], date).unwrap_err();
        assert!(err.is_no_data());
    }
}
