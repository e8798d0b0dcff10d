//! Timeline entry model
//!
//! A [`TimelineEntry`] is the single record shape every exporter consumes,
//! whatever backend table it came from. Field names serialize in camelCase
//! and the record type in snake_case so the JSON export mirrors what the
//! dashboards exchange with the API.

use super::ids::RecordId;
use super::status::{AdmissionStatus, PrescriptionStatus};
use super::timestamp::flexible;
use super::HmsExportError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of visit a timeline entry represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordType {
    Appointment,
    Admission,
    MedicalRecord,
    Laboratory,
    Imaging,
}

impl RecordType {
    /// All record types in report order
    pub const ALL: [RecordType; 5] = [
        RecordType::Appointment,
        RecordType::Admission,
        RecordType::MedicalRecord,
        RecordType::Laboratory,
        RecordType::Imaging,
    ];

    /// Wire name (`medical_record`, ...)
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordType::Appointment => "appointment",
            RecordType::Admission => "admission",
            RecordType::MedicalRecord => "medical_record",
            RecordType::Laboratory => "laboratory",
            RecordType::Imaging => "imaging",
        }
    }

    /// Human readable name used in CSV cells and report headings
    pub fn label(&self) -> &'static str {
        match self {
            RecordType::Appointment => "Appointment",
            RecordType::Admission => "Admission",
            RecordType::MedicalRecord => "Medical Record",
            RecordType::Laboratory => "Laboratory",
            RecordType::Imaging => "Imaging",
        }
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordType {
    type Err = HmsExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace(['-', ' '], "_").as_str() {
            "appointment" | "appointments" | "visit" => Ok(Self::Appointment),
            "admission" | "admissions" | "hospitalization" => Ok(Self::Admission),
            "medical_record" | "medical_records" | "medicalrecord" => Ok(Self::MedicalRecord),
            "laboratory" | "lab" | "lab_result" | "lab_results" => Ok(Self::Laboratory),
            "imaging" | "radiology" | "imaging_study" => Ok(Self::Imaging),
            _ => Err(HmsExportError::Validation(format!(
                "Unknown record type '{s}'. Expected appointment, admission, medical_record, laboratory or imaging"
            ))),
        }
    }
}

/// Diagnosis as sent by the backend: either free text or a structured object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Diagnosis {
    Text(String),
    Structured(StructuredDiagnosis),
}

impl Diagnosis {
    /// One-line text for tables: the free text, or the primary diagnosis
    pub fn summary(&self) -> Option<&str> {
        match self {
            Diagnosis::Text(text) if !text.trim().is_empty() => Some(text.as_str()),
            Diagnosis::Text(_) => None,
            Diagnosis::Structured(s) => s.primary_diagnosis.as_deref(),
        }
    }
}

/// Structured diagnosis object (keys are snake_case on the wire)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StructuredDiagnosis {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_diagnosis: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub secondary_diagnoses: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icd_code: Option<String>,
}

/// Vital signs captured at the visit
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vitals {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,

    /// Systolic/diastolic as entered, e.g. `120/80`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blood_pressure: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heart_rate: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oxygen_saturation: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bmi: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pain_level: Option<f64>,
}

impl Vitals {
    /// True when no vital sign was recorded
    pub fn is_empty(&self) -> bool {
        self.temperature.is_none()
            && self.blood_pressure.is_none()
            && self.heart_rate.is_none()
            && self.oxygen_saturation.is_none()
            && self.weight.is_none()
            && self.height.is_none()
            && self.bmi.is_none()
            && self.pain_level.is_none()
    }

    /// Labelled readings with units, skipping the ones not recorded
    pub fn readings(&self) -> Vec<(&'static str, String)> {
        let mut out = Vec::new();
        if let Some(t) = self.temperature {
            out.push(("Temperature", format!("{t} °C")));
        }
        if let Some(bp) = &self.blood_pressure {
            out.push(("Blood Pressure", format!("{bp} mmHg")));
        }
        if let Some(hr) = self.heart_rate {
            out.push(("Heart Rate", format!("{hr} bpm")));
        }
        if let Some(spo2) = self.oxygen_saturation {
            out.push(("Oxygen Saturation", format!("{spo2} %")));
        }
        if let Some(w) = self.weight {
            out.push(("Weight", format!("{w} kg")));
        }
        if let Some(h) = self.height {
            out.push(("Height", format!("{h} cm")));
        }
        if let Some(bmi) = self.bmi {
            out.push(("BMI", bmi.to_string()));
        }
        if let Some(pain) = self.pain_level {
            out.push(("Pain Level", format!("{pain}/10")));
        }
        out
    }
}

/// One medication line of a prescription
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrescriptionItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub medication_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dosage: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frequency: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub route: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
}

/// A prescription and its items
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prescription {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prescription_number: Option<String>,

    #[serde(
        default,
        with = "flexible::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub prescription_date: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<PrescriptionStatus>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<PrescriptionItem>,
}

/// SOAP progress note written during an admission
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressNote {
    #[serde(
        default,
        with = "flexible::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub note_date: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subjective: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub objective: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assessment: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan: Option<String>,
}

impl ProgressNote {
    /// Non-empty SOAP sections, keyed by their initial
    pub fn soap_sections(&self) -> Vec<(&'static str, &str)> {
        [
            ("S", self.subjective.as_deref()),
            ("O", self.objective.as_deref()),
            ("A", self.assessment.as_deref()),
            ("P", self.plan.as_deref()),
        ]
        .into_iter()
        .filter_map(|(k, v)| v.filter(|s| !s.trim().is_empty()).map(|s| (k, s)))
        .collect()
    }
}

/// Hospital stay triggered by an appointment or medical record
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelatedAdmission {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admission_number: Option<String>,

    #[serde(
        default,
        with = "flexible::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub admission_date: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<AdmissionStatus>,

    #[serde(
        default,
        with = "flexible::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub discharge_date: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discharge_summary: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub prescriptions: Vec<Prescription>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub recent_progress_notes: Vec<ProgressNote>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress_notes_count: Option<u32>,
}

impl RelatedAdmission {
    /// Total progress notes on the admission
    ///
    /// `recentProgressNotes` is a window; the count field is authoritative
    /// when the backend sends it.
    pub fn total_progress_notes(&self) -> usize {
        let supplied = self.recent_progress_notes.len();
        self.progress_notes_count
            .map(|c| (c as usize).max(supplied))
            .unwrap_or(supplied)
    }

    /// Number of medication lines across all admission prescriptions
    pub fn prescription_item_count(&self) -> usize {
        self.prescriptions.iter().map(|p| p.items.len()).sum()
    }
}

/// Unified record shape for the chronological patient timeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineEntry {
    pub id: RecordId,

    #[serde(rename = "type")]
    pub record_type: RecordType,

    #[serde(with = "flexible")]
    pub date: DateTime<Utc>,

    #[serde(default)]
    pub title: String,

    /// Free-form status as sent by the backend
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chief_complaint: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diagnosis: Option<Diagnosis>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub treatment_plan: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    /// Result text for laboratory and imaging entries
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub findings: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doctor: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vitals: Option<Vitals>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related_admission: Option<RelatedAdmission>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub prescriptions: Vec<Prescription>,
}

impl TimelineEntry {
    /// Creates an entry with only the required fields set
    pub fn new(id: impl Into<RecordId>, record_type: RecordType, date: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            record_type,
            date,
            title: String::new(),
            status: None,
            chief_complaint: None,
            diagnosis: None,
            treatment_plan: None,
            notes: None,
            findings: None,
            doctor: None,
            vitals: None,
            related_admission: None,
            prescriptions: Vec::new(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    pub fn with_doctor(mut self, doctor: impl Into<String>) -> Self {
        self.doctor = Some(doctor.into());
        self
    }

    pub fn with_vitals(mut self, vitals: Vitals) -> Self {
        self.vitals = Some(vitals);
        self
    }

    pub fn with_related_admission(mut self, admission: RelatedAdmission) -> Self {
        self.related_admission = Some(admission);
        self
    }

    /// Title to display, falling back to the record type label
    pub fn display_title(&self) -> &str {
        if self.title.trim().is_empty() {
            self.record_type.label()
        } else {
            &self.title
        }
    }

    /// Every prescription attached to the entry, its own first, then the admission's
    pub fn all_prescriptions(&self) -> impl Iterator<Item = &Prescription> {
        self.prescriptions.iter().chain(
            self.related_admission
                .iter()
                .flat_map(|a| a.prescriptions.iter()),
        )
    }
}
