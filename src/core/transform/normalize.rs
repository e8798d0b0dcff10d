//! Record normalization
//!
//! The records API returns a different shape per table: appointments carry
//! `appointment_date` and a doctor object, admissions carry
//! `admission_number`, lab results carry `test_name`, and the newer
//! endpoints answer in camelCase. This module reads each field from whichever
//! key is present and produces [`TimelineEntry`] values.
//!
//! Normalization never fails on missing data: absent fields become `None`.
//! A record is rejected when it is not a JSON object, has no usable date to
//! place it on the timeline, or carries an admission or prescription status
//! outside the known vocabulary.

use crate::domain::status::{AdmissionStatus, AppointmentStatus, PrescriptionStatus};
use crate::domain::timestamp::parse_timestamp;
use crate::domain::{
    AppointmentRow, Diagnosis, HmsExportError, Prescription, PrescriptionItem, ProgressNote,
    RecordId, RecordType, RelatedAdmission, Result, StructuredDiagnosis, TimelineEntry, Vitals,
};
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use std::str::FromStr;

const DATE_KEYS: [&str; 14] = [
    "date",
    "appointmentDate",
    "appointment_date",
    "admissionDate",
    "admission_date",
    "visitDate",
    "visit_date",
    "testDate",
    "test_date",
    "resultDate",
    "result_date",
    "studyDate",
    "study_date",
    "created_at",
];

/// Read-only view over a backend JSON object with multi-key lookups
#[derive(Clone, Copy)]
struct Fields<'a>(&'a Map<String, Value>);

impl<'a> Fields<'a> {
    fn of(value: &'a Value) -> Option<Self> {
        value.as_object().map(Fields)
    }

    fn first(&self, keys: &[&str]) -> Option<&'a Value> {
        keys.iter()
            .filter_map(|k| self.0.get(*k))
            .find(|v| !v.is_null())
    }

    fn has(&self, keys: &[&str]) -> bool {
        self.first(keys).is_some()
    }

    /// First non-blank string; numbers and booleans are stringified
    fn str(&self, keys: &[&str]) -> Option<String> {
        keys.iter().filter_map(|k| self.0.get(*k)).find_map(|v| match v {
            Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        })
    }

    /// First numeric value; numeric strings such as `"37.2"` are accepted
    fn num(&self, keys: &[&str]) -> Option<f64> {
        keys.iter().filter_map(|k| self.0.get(*k)).find_map(|v| match v {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        })
    }

    fn obj(&self, keys: &[&str]) -> Option<Fields<'a>> {
        keys.iter()
            .filter_map(|k| self.0.get(*k))
            .find_map(Fields::of)
    }

    fn arr(&self, keys: &[&str]) -> &'a [Value] {
        keys.iter()
            .filter_map(|k| self.0.get(*k))
            .find_map(|v| v.as_array())
            .map(|a| a.as_slice())
            .unwrap_or(&[])
    }

    fn date(&self, keys: &[&str]) -> Option<DateTime<Utc>> {
        keys.iter()
            .filter_map(|k| self.0.get(*k))
            .filter_map(|v| v.as_str())
            .find_map(parse_timestamp)
    }

    fn id(&self) -> RecordId {
        match self.first(&["id", "_id", "uuid"]) {
            Some(Value::Number(n)) => n
                .as_i64()
                .map(RecordId::Number)
                .unwrap_or_else(|| RecordId::Text(n.to_string())),
            Some(Value::String(s)) => RecordId::Text(s.clone()),
            _ => RecordId::Text(String::new()),
        }
    }
}

/// Decide which timeline type a raw record belongs to
fn classify(fields: &Fields<'_>) -> RecordType {
    if let Some(declared) = fields.str(&["recordType", "record_type", "type"]) {
        if let Ok(record_type) = declared.parse::<RecordType>() {
            return record_type;
        }
    }

    if fields.has(&["admissionNumber", "admission_number"]) {
        RecordType::Admission
    } else if fields.has(&["testName", "test_name", "labTest", "lab_test"]) {
        RecordType::Laboratory
    } else if fields.has(&["modality", "studyType", "study_type", "imagingType"]) {
        RecordType::Imaging
    } else if fields.has(&["appointmentDate", "appointment_date", "appointmentNumber"]) {
        RecordType::Appointment
    } else {
        RecordType::MedicalRecord
    }
}

/// Join first/last name keys of a person object
fn person_name(person: &Fields<'_>) -> Option<String> {
    if let Some(user) = person.obj(&["user"]) {
        if let Some(name) = person_name(&user) {
            return Some(name);
        }
    }

    let first = person.str(&["firstName", "first_name"]);
    let last = person.str(&["lastName", "last_name"]);
    match (first, last) {
        (Some(f), Some(l)) => Some(format!("{f} {l}")),
        (Some(f), None) => Some(f),
        (None, Some(l)) => Some(l),
        (None, None) => person.str(&["fullName", "full_name", "name"]),
    }
}

/// Doctor display name from a string or a person object, prefixed `Dr.`
fn doctor_name(fields: &Fields<'_>, keys: &[&str]) -> Option<String> {
    let name = match fields.first(keys)? {
        Value::String(s) if !s.trim().is_empty() => s.trim().to_string(),
        Value::Object(_) => person_name(&fields.obj(keys)?)?,
        _ => return None,
    };

    if name.starts_with("Dr.") || name.starts_with("Dr ") {
        Some(name)
    } else {
        Some(format!("Dr. {name}"))
    }
}

fn normalize_diagnosis(fields: &Fields<'_>) -> Option<Diagnosis> {
    const KEYS: [&str; 4] = ["diagnosis", "primaryDiagnosis", "primary_diagnosis", "admission_diagnosis"];

    match fields.first(&KEYS)? {
        Value::String(s) if !s.trim().is_empty() => Some(Diagnosis::Text(s.trim().to_string())),
        Value::Object(_) => {
            let d = fields.obj(&KEYS)?;
            let secondary = d
                .arr(&["secondary_diagnoses", "secondaryDiagnoses"])
                .iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect();
            Some(Diagnosis::Structured(StructuredDiagnosis {
                primary_diagnosis: d.str(&["primary_diagnosis", "primaryDiagnosis", "name"]),
                secondary_diagnoses: secondary,
                icd_code: d.str(&["icd_code", "icdCode", "code"]),
            }))
        }
        _ => None,
    }
}

fn normalize_vitals(fields: &Fields<'_>) -> Option<Vitals> {
    let v = fields.obj(&["vitals", "vitalSigns", "vital_signs"])?;

    let blood_pressure = v.str(&["bloodPressure", "blood_pressure"]).or_else(|| {
        let systolic = v.num(&["systolic", "bloodPressureSystolic", "blood_pressure_systolic"])?;
        let diastolic = v.num(&["diastolic", "bloodPressureDiastolic", "blood_pressure_diastolic"])?;
        Some(format!("{systolic}/{diastolic}"))
    });

    let vitals = Vitals {
        temperature: v.num(&["temperature", "temp"]),
        blood_pressure,
        heart_rate: v.num(&["heartRate", "heart_rate", "pulse", "pulse_rate"]),
        oxygen_saturation: v.num(&["oxygenSaturation", "oxygen_saturation", "spo2"]),
        weight: v.num(&["weight"]),
        height: v.num(&["height"]),
        bmi: v.num(&["bmi", "BMI"]),
        pain_level: v.num(&["painLevel", "pain_level", "pain_score"]),
    };

    (!vitals.is_empty()).then_some(vitals)
}

fn normalize_prescription_item(value: &Value) -> Option<PrescriptionItem> {
    let item = Fields::of(value)?;
    let medication_name = item
        .str(&["medicationName", "medication_name", "drugName", "drug_name", "name"])
        .or_else(|| item.obj(&["medication"]).and_then(|m| m.str(&["name", "generic_name"])));

    Some(PrescriptionItem {
        medication_name,
        dosage: item.str(&["dosage", "dose"]),
        frequency: item.str(&["frequency"]),
        route: item.str(&["route"]),
        duration: item.str(&["duration"]),
        instructions: item.str(&["instructions", "notes"]),
    })
}

/// `status` parsed into a closed vocabulary; absent stays `None`
fn parse_status<T: FromStr<Err = HmsExportError>>(fields: &Fields<'_>) -> Result<Option<T>> {
    fields.str(&["status"]).map(|raw| raw.parse()).transpose()
}

fn normalize_prescription(p: &Fields<'_>) -> Result<Prescription> {
    Ok(Prescription {
        prescription_number: p.str(&["prescriptionNumber", "prescription_number"]),
        prescription_date: p.date(&["prescriptionDate", "prescription_date", "created_at", "createdAt"]),
        status: parse_status::<PrescriptionStatus>(p)?,
        items: p
            .arr(&["items", "medications", "prescriptionItems", "prescription_items"])
            .iter()
            .filter_map(normalize_prescription_item)
            .collect(),
    })
}

fn normalize_prescriptions(fields: &Fields<'_>) -> Result<Vec<Prescription>> {
    fields
        .arr(&["prescriptions"])
        .iter()
        .filter_map(Fields::of)
        .map(|p| normalize_prescription(&p))
        .collect()
}

fn normalize_progress_note(value: &Value) -> Option<ProgressNote> {
    let n = Fields::of(value)?;
    let author = doctor_name(&n, &["author", "writtenBy", "written_by", "doctor"])
        .or_else(|| n.obj(&["nurse"]).and_then(|nurse| person_name(&nurse)));

    Some(ProgressNote {
        note_date: n.date(&["noteDate", "note_date", "date", "created_at", "createdAt"]),
        note_type: n.str(&["noteType", "note_type", "type"]),
        author,
        subjective: n.str(&["subjective"]),
        objective: n.str(&["objective"]),
        assessment: n.str(&["assessment"]),
        plan: n.str(&["plan"]),
    })
}

fn normalize_admission(a: &Fields<'_>) -> Result<RelatedAdmission> {
    Ok(RelatedAdmission {
        admission_number: a.str(&["admissionNumber", "admission_number"]),
        admission_date: a.date(&["admissionDate", "admission_date"]),
        status: parse_status::<AdmissionStatus>(a)?,
        discharge_date: a.date(&["dischargeDate", "discharge_date"]),
        discharge_summary: a.str(&["dischargeSummary", "discharge_summary"]),
        prescriptions: normalize_prescriptions(a)?,
        recent_progress_notes: a
            .arr(&["recentProgressNotes", "recent_progress_notes", "progressNotes", "progress_notes"])
            .iter()
            .filter_map(normalize_progress_note)
            .collect(),
        progress_notes_count: a
            .num(&["progressNotesCount", "progress_notes_count"])
            .filter(|n| *n >= 0.0)
            .map(|n| n as u32),
    })
}

fn default_title(record_type: RecordType, fields: &Fields<'_>) -> String {
    match record_type {
        RecordType::Appointment => fields
            .str(&["appointmentType", "appointment_type"])
            .map(|t| format!("Appointment: {t}"))
            .unwrap_or_else(|| "Appointment".to_string()),
        RecordType::Admission => "Hospital Admission".to_string(),
        RecordType::Laboratory => fields
            .str(&["testName", "test_name"])
            .map(|t| format!("Lab Result: {t}"))
            .unwrap_or_else(|| "Lab Result".to_string()),
        RecordType::Imaging => {
            let modality = fields.str(&["modality", "studyType", "study_type", "imagingType"]);
            let body_part = fields.str(&["bodyPart", "body_part"]);
            match (modality, body_part) {
                (Some(m), Some(b)) => format!("Imaging: {m} ({b})"),
                (Some(m), None) => format!("Imaging: {m}"),
                _ => "Imaging Study".to_string(),
            }
        }
        RecordType::MedicalRecord => "Medical Record".to_string(),
    }
}

/// Result text for laboratory and imaging entries
fn findings(fields: &Fields<'_>) -> Option<String> {
    if let Some(text) = fields.str(&["findings", "impression", "interpretation", "resultSummary"]) {
        return Some(text);
    }

    let value = fields.str(&["resultValue", "result_value", "result"])?;
    let mut text = value;
    if let Some(unit) = fields.str(&["unit", "units"]) {
        text = format!("{text} {unit}");
    }
    if let Some(range) = fields.str(&["referenceRange", "reference_range", "normal_range"]) {
        text = format!("{text} (ref: {range})");
    }
    Some(text)
}

/// Normalize one backend record into a timeline entry
///
/// # Errors
///
/// Returns a validation error when `raw` is not an object, carries no
/// parseable date, or has an admission or prescription status outside the
/// known vocabulary.
///
/// # Examples
///
/// ```
/// use hms_export::core::transform::normalize::normalize_record;
/// use hms_export::domain::RecordType;
/// use serde_json::json;
///
/// let entry = normalize_record(&json!({
///     "id": 7,
///     "admission_number": "ADM-2024-0007",
///     "admission_date": "2024-02-10T08:00:00Z",
///     "status": "discharged"
/// }))
/// .unwrap();
///
/// assert_eq!(entry.record_type, RecordType::Admission);
/// assert_eq!(entry.title, "Hospital Admission");
/// ```
pub fn normalize_record(raw: &Value) -> Result<TimelineEntry> {
    let fields = Fields::of(raw).ok_or_else(|| {
        HmsExportError::Validation("Timeline record must be a JSON object".to_string())
    })?;
    let record_type = classify(&fields);
    let date = fields.date(&DATE_KEYS).ok_or_else(|| {
        HmsExportError::Validation(format!("Record {} has no usable date", fields.id()))
    })?;

    let title = fields
        .str(&["title"])
        .unwrap_or_else(|| default_title(record_type, &fields));

    let mut entry = TimelineEntry::new(fields.id(), record_type, date).with_title(title);
    entry.status = fields.str(&["status"]);
    entry.chief_complaint = fields.str(&[
        "chiefComplaint",
        "chief_complaint",
        "reason",
        "reasonForVisit",
        "reason_for_visit",
        "reasonForAdmission",
        "reason_for_admission",
    ]);
    entry.diagnosis = normalize_diagnosis(&fields);
    entry.treatment_plan = fields.str(&["treatmentPlan", "treatment_plan"]);
    entry.notes = fields.str(&["notes", "clinicalNotes", "clinical_notes", "remarks"]);
    entry.doctor = doctor_name(
        &fields,
        &["doctor", "doctorName", "doctor_name", "attendingDoctor", "attending_doctor", "orderedBy", "ordered_by"],
    );
    entry.vitals = normalize_vitals(&fields);
    entry.prescriptions = normalize_prescriptions(&fields)?;

    match record_type {
        RecordType::Laboratory | RecordType::Imaging => {
            entry.findings = findings(&fields);
        }
        RecordType::Admission => {
            // The entry is the stay itself; surface the discharge summary as notes
            entry.status =
                parse_status::<AdmissionStatus>(&fields)?.map(|s| s.as_str().to_string());
            if entry.notes.is_none() {
                entry.notes = fields.str(&["dischargeSummary", "discharge_summary"]);
            }
        }
        RecordType::Appointment | RecordType::MedicalRecord => {
            entry.related_admission = fields
                .obj(&["relatedAdmission", "related_admission", "admission"])
                .map(|a| normalize_admission(&a))
                .transpose()?;
        }
    }

    Ok(entry)
}

/// Normalize a batch of backend records into one timeline, newest first
///
/// Records that cannot be placed on the timeline are skipped with a warning.
/// Entries sharing a timestamp keep their input order.
pub fn build_timeline(raws: &[Value]) -> Vec<TimelineEntry> {
    let mut entries = Vec::with_capacity(raws.len());
    let mut skipped = 0usize;

    for (index, raw) in raws.iter().enumerate() {
        match normalize_record(raw) {
            Ok(entry) => entries.push(entry),
            Err(e) => {
                skipped += 1;
                tracing::warn!(index = index, error = %e, "Skipping record");
            }
        }
    }

    entries.sort_by(|a, b| b.date.cmp(&a.date));

    tracing::debug!(
        total = raws.len(),
        normalized = entries.len(),
        skipped = skipped,
        "Timeline built"
    );

    entries
}

/// Normalize one backend appointment into a report row
///
/// Unlike timeline normalization this is strict about the status: the
/// appointment report groups by status, so an unknown value is an error.
pub fn normalize_appointment(raw: &Value) -> Result<AppointmentRow> {
    let fields = Fields::of(raw).ok_or_else(|| {
        HmsExportError::Validation("Appointment record must be a JSON object".to_string())
    })?;

    let date = fields
        .date(&["appointmentDate", "appointment_date", "date", "scheduled_at"])
        .ok_or_else(|| {
            HmsExportError::Validation(format!("Appointment {} has no usable date", fields.id()))
        })?;

    let status_raw = fields.str(&["status"]).unwrap_or_else(|| "scheduled".to_string());
    let status: AppointmentStatus = status_raw.parse()?;

    let time_slot = fields.str(&["timeSlot", "time_slot", "appointmentTime", "appointment_time"]).or_else(|| {
        let start = fields.str(&["startTime", "start_time"])?;
        match fields.str(&["endTime", "end_time"]) {
            Some(end) => Some(format!("{start} - {end}")),
            None => Some(start),
        }
    });

    let patient_name = fields
        .str(&["patientName", "patient_name"])
        .or_else(|| fields.obj(&["patient"]).and_then(|p| person_name(&p)));

    let department = fields
        .str(&["departmentName", "department_name"])
        .or_else(|| match fields.first(&["department"]) {
            Some(Value::String(s)) => Some(s.clone()),
            _ => fields.obj(&["department"]).and_then(|d| d.str(&["name"])),
        });

    let mut row = AppointmentRow::new(fields.id(), date, status);
    row.appointment_number = fields.str(&["appointmentNumber", "appointment_number"]);
    row.time_slot = time_slot;
    row.patient_name = patient_name;
    row.doctor_name = doctor_name(&fields, &["doctor", "doctorName", "doctor_name"]);
    row.department = department;
    row.appointment_type = fields.str(&["appointmentType", "appointment_type", "type"]);
    row.reason = fields.str(&["reason", "reasonForVisit", "reason_for_visit", "chiefComplaint"]);
    Ok(row)
}

/// Normalize a list of appointments, failing on the first invalid one
pub fn normalize_appointments(raws: &[Value]) -> Result<Vec<AppointmentRow>> {
    let mut rows = raws
        .iter()
        .map(normalize_appointment)
        .collect::<Result<Vec<_>>>()?;
    rows.sort_by(|a, b| a.date.cmp(&b.date));
    Ok(rows)
}
