//! Flattening timeline entries into tabular rows
//!
//! Each entry becomes one base row. Every medication line of the entry's
//! admission prescriptions adds one narrower row after it, so an entry whose
//! admission carries N prescription items yields `1 + N` rows. Rows of the
//! two kinds have different columns; the CSV writer reconciles them into one
//! header.

use crate::domain::timestamp::{format_date, format_display};
use crate::domain::{
    AppointmentRow, Diagnosis, HmsExportError, Prescription, PrescriptionItem, Result,
    TimelineEntry,
};
use indexmap::IndexMap;
use serde_json::Value;

/// One flat row: column name to cell value, in column order
pub type FlatRow = IndexMap<String, Value>;

/// `Type` cell of the per-item rows
pub const PRESCRIPTION_ITEM_TYPE: &str = "Prescription Item";

/// Column names of the base row, in order
pub const BASE_COLUMNS: [&str; 24] = [
    "Date",
    "Type",
    "Title",
    "Status",
    "Doctor",
    "Chief Complaint",
    "Diagnosis",
    "Treatment Plan",
    "Notes",
    "Temperature",
    "Blood Pressure",
    "Heart Rate",
    "Oxygen Saturation",
    "Weight",
    "Height",
    "BMI",
    "Pain Level",
    "Admission Number",
    "Admission Date",
    "Admission Status",
    "Discharge Date",
    "Discharge Summary",
    "Prescriptions Count",
    "Progress Notes Count",
];

/// Column names of the per-item rows, in order
pub const PRESCRIPTION_ITEM_COLUMNS: [&str; 11] = [
    "Date",
    "Type",
    "Prescription Number",
    "Prescription Date",
    "Prescription Status",
    "Medication",
    "Dosage",
    "Frequency",
    "Route",
    "Duration",
    "Instructions",
];

/// Column names of appointment report rows, in order
pub const APPOINTMENT_COLUMNS: [&str; 9] = [
    "Appointment #",
    "Date",
    "Time",
    "Patient",
    "Doctor",
    "Department",
    "Type",
    "Status",
    "Reason",
];

fn text(value: Option<&str>) -> Value {
    value
        .map(|s| Value::String(s.to_string()))
        .unwrap_or(Value::Null)
}

fn number(value: Option<f64>) -> Value {
    value.map(Value::from).unwrap_or(Value::Null)
}

fn diagnosis_cell(diagnosis: Option<&Diagnosis>) -> Value {
    match diagnosis {
        None => Value::Null,
        Some(d) => match d.summary() {
            Some(summary) => Value::String(summary.to_string()),
            // No primary text to show: keep the whole object for the writer to inline
            None => serde_json::to_value(d).unwrap_or(Value::Null),
        },
    }
}

fn base_row(entry: &TimelineEntry) -> FlatRow {
    let vitals = entry.vitals.as_ref();
    let admission = entry.related_admission.as_ref();

    let cells: [Value; 24] = [
        Value::String(format_display(&entry.date)),
        Value::String(entry.record_type.label().to_string()),
        Value::String(entry.display_title().to_string()),
        text(entry.status.as_deref()),
        text(entry.doctor.as_deref()),
        text(entry.chief_complaint.as_deref()),
        diagnosis_cell(entry.diagnosis.as_ref()),
        text(entry.treatment_plan.as_deref()),
        text(entry.notes.as_deref().or(entry.findings.as_deref())),
        number(vitals.and_then(|v| v.temperature)),
        text(vitals.and_then(|v| v.blood_pressure.as_deref())),
        number(vitals.and_then(|v| v.heart_rate)),
        number(vitals.and_then(|v| v.oxygen_saturation)),
        number(vitals.and_then(|v| v.weight)),
        number(vitals.and_then(|v| v.height)),
        number(vitals.and_then(|v| v.bmi)),
        number(vitals.and_then(|v| v.pain_level)),
        text(admission.and_then(|a| a.admission_number.as_deref())),
        admission
            .and_then(|a| a.admission_date.as_ref())
            .map(|d| Value::String(format_date(d)))
            .unwrap_or(Value::Null),
        text(admission.and_then(|a| a.status).map(|s| s.label())),
        admission
            .and_then(|a| a.discharge_date.as_ref())
            .map(|d| Value::String(format_date(d)))
            .unwrap_or(Value::Null),
        text(admission.and_then(|a| a.discharge_summary.as_deref())),
        Value::from(entry.all_prescriptions().count()),
        admission
            .map(|a| Value::from(a.total_progress_notes()))
            .unwrap_or(Value::Null),
    ];

    BASE_COLUMNS
        .iter()
        .map(|c| c.to_string())
        .zip(cells)
        .collect()
}

fn prescription_item_row(
    entry: &TimelineEntry,
    prescription: &Prescription,
    item: &PrescriptionItem,
) -> FlatRow {
    let cells: [Value; 11] = [
        Value::String(format_display(&entry.date)),
        Value::String(PRESCRIPTION_ITEM_TYPE.to_string()),
        text(prescription.prescription_number.as_deref()),
        prescription
            .prescription_date
            .as_ref()
            .map(|d| Value::String(format_date(d)))
            .unwrap_or(Value::Null),
        text(prescription.status.map(|s| s.label())),
        text(item.medication_name.as_deref()),
        text(item.dosage.as_deref()),
        text(item.frequency.as_deref()),
        text(item.route.as_deref()),
        text(item.duration.as_deref()),
        text(item.instructions.as_deref()),
    ];

    PRESCRIPTION_ITEM_COLUMNS
        .iter()
        .map(|c| c.to_string())
        .zip(cells)
        .collect()
}

/// Flatten one entry into its base row plus one row per admission prescription item
pub fn flatten_entry(entry: &TimelineEntry) -> Vec<FlatRow> {
    let mut rows = vec![base_row(entry)];

    if let Some(admission) = &entry.related_admission {
        for prescription in &admission.prescriptions {
            for item in &prescription.items {
                rows.push(prescription_item_row(entry, prescription, item));
            }
        }
    }

    rows
}

/// Flatten a list of timeline entries for CSV export
///
/// # Errors
///
/// Returns the "No data to export" error when `records` is empty.
///
/// # Examples
///
/// ```
/// use hms_export::core::transform::flatten::flatten_records_for_csv;
/// use hms_export::domain::TimelineEntry;
///
/// let records: Vec<TimelineEntry> = serde_json::from_value(serde_json::json!([
///     { "type": "appointment", "id": 1, "date": "2024-01-01",
///       "title": "Checkup", "status": "completed", "vitals": { "temperature": 37 } }
/// ])).unwrap();
///
/// let rows = flatten_records_for_csv(&records).unwrap();
/// assert_eq!(rows.len(), 1);
/// assert_eq!(rows[0]["Temperature"], 37.0);
/// ```
pub fn flatten_records_for_csv(records: &[TimelineEntry]) -> Result<Vec<FlatRow>> {
    if records.is_empty() {
        return Err(HmsExportError::no_data());
    }

    Ok(records.iter().flat_map(flatten_entry).collect())
}

/// Flatten appointment report rows, one per appointment
pub fn appointments_to_rows(appointments: &[AppointmentRow]) -> Vec<FlatRow> {
    appointments
        .iter()
        .map(|a| {
            let cells: [Value; 9] = [
                text(a.appointment_number.as_deref()),
                Value::String(format_date(&a.date)),
                text(a.time_slot.as_deref()),
                text(a.patient_name.as_deref()),
                text(a.doctor_name.as_deref()),
                text(a.department.as_deref()),
                text(a.appointment_type.as_deref()),
                Value::String(a.status.label().to_string()),
                text(a.reason.as_deref()),
            ];
            APPOINTMENT_COLUMNS
                .iter()
                .map(|c| c.to_string())
                .zip(cells)
                .collect()
        })
        .collect()
}
