//! Integration tests for the export pipeline
//!
//! These exercise normalization and the three exporters through the public
//! API, the way the CLI drives them.

use chrono::{TimeZone, Utc};
use hms_export::core::export::{
    build_records_layout, export_appointments, export_timeline, read_json, write_artifact,
    ExportFormat, ExportOptions, ReportOptions, UTF8_BOM,
};
use hms_export::core::transform::{build_timeline, normalize_appointments};
use hms_export::domain::{PatientInfo, TimelineEntry};
use serde_json::{json, Value};
use tempfile::TempDir;

fn sample_records() -> Vec<Value> {
    vec![
        json!({
            "id": 1,
            "type": "appointment",
            "date": "2024-01-01",
            "title": "Checkup",
            "status": "completed",
            "vitals": { "temperature": 37 }
        }),
        json!({
            "id": 2,
            "type": "medical_record",
            "date": "2024-03-05T10:30:00Z",
            "diagnosis": "Pneumonia, \"community acquired\"",
            "relatedAdmission": {
                "admissionNumber": "ADM-2024-0002",
                "admissionDate": "2024-03-05T08:00:00Z",
                "status": "admitted",
                "prescriptions": [{
                    "prescriptionNumber": "RX-1",
                    "status": "active",
                    "items": [
                        { "medicationName": "Amoxicillin", "dosage": "500mg" },
                        { "medicationName": "Paracetamol", "dosage": "1g" }
                    ]
                }],
                "progressNotesCount": 8,
                "recentProgressNotes": [
                    { "noteDate": "2024-03-06T09:00:00Z", "subjective": "Feels better" },
                    { "noteDate": "2024-03-07T09:00:00Z", "subjective": "Afebrile" },
                    { "noteDate": "2024-03-08T09:00:00Z", "subjective": "Eating well" },
                    { "noteDate": "2024-03-09T09:00:00Z", "subjective": "Walking" },
                    { "noteDate": "2024-03-10T09:00:00Z", "subjective": "Ready to go" }
                ]
            }
        }),
    ]
}

fn options() -> ExportOptions {
    ExportOptions::new("medical-records-42")
        .with_generated_at(Utc.with_ymd_and_hms(2024, 3, 11, 12, 0, 0).unwrap())
}

fn csv_records(bytes: &[u8]) -> Vec<csv::StringRecord> {
    assert!(bytes.starts_with(UTF8_BOM));
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .from_reader(&bytes[UTF8_BOM.len()..]);
    reader.records().map(|r| r.unwrap()).collect()
}

#[test]
fn test_timeline_is_newest_first() {
    let timeline = build_timeline(&sample_records());
    assert_eq!(timeline.len(), 2);
    assert!(timeline[0].date > timeline[1].date);
}

#[test]
fn test_csv_has_base_row_plus_one_row_per_item() {
    let timeline = build_timeline(&sample_records());
    let artifact = export_timeline(&timeline, ExportFormat::Csv, &options()).unwrap();
    assert_eq!(artifact.file_name, "medical-records-42-2024-03-11.csv");

    let records = csv_records(&artifact.bytes);
    // header + admission record + 2 item rows + appointment
    assert_eq!(records.len(), 5);

    let header = &records[0];
    let type_col = header.iter().position(|h| h == "Type").unwrap();
    let item_rows = records
        .iter()
        .skip(1)
        .filter(|r| r.get(type_col) == Some("Prescription Item"))
        .count();
    assert_eq!(item_rows, 2);
}

#[test]
fn test_csv_quotes_every_cell_and_doubles_quotes() {
    let timeline = build_timeline(&sample_records());
    let artifact = export_timeline(&timeline, ExportFormat::Csv, &options()).unwrap();
    let text = String::from_utf8(artifact.bytes[UTF8_BOM.len()..].to_vec()).unwrap();

    assert!(text.starts_with("\"Date\",\"Type\""));
    assert!(text.contains("\"Pneumonia, \"\"community acquired\"\"\""));
    assert!(text.contains("\r\n"));
}

#[test]
fn test_csv_temperature_keeps_numeric_text() {
    let timeline = build_timeline(&sample_records());
    let artifact = export_timeline(&timeline, ExportFormat::Csv, &options()).unwrap();
    let records = csv_records(&artifact.bytes);

    let temp_col = records[0].iter().position(|h| h == "Temperature").unwrap();
    let checkup = records
        .iter()
        .find(|r| r.iter().any(|cell| cell == "Checkup"))
        .unwrap();
    assert_eq!(checkup.get(temp_col), Some("37"));
}

#[test]
fn test_json_round_trip() {
    let timeline = build_timeline(&sample_records());
    let artifact = export_timeline(&timeline, ExportFormat::Json, &options()).unwrap();

    let export = read_json::<TimelineEntry>(&artifact.bytes).unwrap();
    assert_eq!(export.total_records, 2);
    assert_eq!(export.records, timeline);

    let raw: Value = serde_json::from_slice(&artifact.bytes).unwrap();
    assert_eq!(raw["totalRecords"], 2);
    assert!(raw["exportDate"].is_string());
}

#[test]
fn test_pdf_truncates_progress_notes() {
    let timeline = build_timeline(&sample_records());
    let patient = PatientInfo::new("Jane Doe");
    let layout = build_records_layout(
        &timeline,
        Some(&patient),
        &ReportOptions::default(),
        Utc::now(),
    )
    .unwrap();

    assert!(layout.contains_text("Medical Records - Jane Doe"));
    assert!(layout.contains_text("Progress Notes (8)"));
    assert!(layout.contains_text("+ 3 more progress notes"));

    let artifact = export_timeline(&timeline, ExportFormat::Pdf, &options()).unwrap();
    let document = printpdf::lopdf::Document::load_mem(&artifact.bytes).unwrap();
    let pages: Vec<u32> = document.get_pages().keys().copied().collect();
    let text = document.extract_text(&pages).unwrap();
    assert!(text.contains("+ 3 more progress notes"));
}

#[test]
fn test_pdf_export_produces_document() {
    let timeline = build_timeline(&sample_records());
    let artifact = export_timeline(&timeline, ExportFormat::Pdf, &options()).unwrap();
    assert_eq!(artifact.file_name, "medical-records-42.pdf");
    assert!(artifact.bytes.starts_with(b"%PDF"));
}

#[test]
fn test_empty_input_fails_for_every_format_and_writes_nothing() {
    let dir = TempDir::new().unwrap();
    for format in [ExportFormat::Csv, ExportFormat::Json, ExportFormat::Pdf] {
        let err = export_timeline(&[], format, &options()).unwrap_err();
        assert!(err.is_no_data(), "{format} should reject empty input");

        let err = export_appointments(&[], format, &options()).unwrap_err();
        assert!(err.is_no_data());
    }
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn test_written_artifact_matches_bytes() {
    let dir = TempDir::new().unwrap();
    let appointments = normalize_appointments(&[json!({
        "id": 10,
        "appointmentNumber": "APT-10",
        "appointmentDate": "2024-03-11T09:30:00Z",
        "status": "scheduled",
        "patient": { "firstName": "Jane", "lastName": "Doe" }
    })])
    .unwrap();

    let artifact = export_appointments(&appointments, ExportFormat::Csv, &options()).unwrap();
    let path = write_artifact(dir.path().join("out"), &artifact).unwrap();

    assert_eq!(std::fs::read(&path).unwrap(), artifact.bytes);
    let names: Vec<_> = std::fs::read_dir(dir.path().join("out"))
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
        .collect();
    assert_eq!(names, vec![artifact.file_name.clone()]);
}
