//! Medical records report layout

use super::layout::{
    Banner, Column, FontStyle, PageWriter, ReportLayout, BODY_SIZE, SMALL_SIZE,
};
use super::ReportOptions;
use crate::domain::status::status_label;
use crate::domain::timestamp::{format_date, format_display};
use crate::domain::{
    Diagnosis, HmsExportError, PatientInfo, RecordType, RelatedAdmission, Result, TimelineEntry,
};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

const NOT_AVAILABLE: &str = "N/A";
const VITALS_PER_ROW: usize = 3;

fn or_na(value: Option<&str>) -> String {
    value
        .filter(|s| !s.trim().is_empty())
        .unwrap_or(NOT_AVAILABLE)
        .to_string()
}

fn diagnosis_text(diagnosis: &Diagnosis) -> Option<String> {
    match diagnosis {
        Diagnosis::Text(text) => Some(text.clone()).filter(|t| !t.trim().is_empty()),
        Diagnosis::Structured(s) => {
            let mut parts = Vec::new();
            if let Some(primary) = &s.primary_diagnosis {
                parts.push(primary.clone());
            }
            if !s.secondary_diagnoses.is_empty() {
                parts.push(format!("Secondary: {}", s.secondary_diagnoses.join(", ")));
            }
            if let Some(code) = &s.icd_code {
                parts.push(format!("ICD-10: {code}"));
            }
            (!parts.is_empty()).then(|| parts.join("; "))
        }
    }
}

/// Text of the note printed when an admission has more notes than the cap
pub fn more_notes_label(remaining: usize) -> String {
    if remaining == 1 {
        "+ 1 more progress note".to_string()
    } else {
        format!("+ {remaining} more progress notes")
    }
}

fn patient_box(writer: &mut PageWriter, patient: Option<&PatientInfo>, today: chrono::NaiveDate) {
    writer.heading("Patient Information");

    let Some(patient) = patient else {
        writer.boxed_pairs(&[vec![("Patient", NOT_AVAILABLE.to_string())]]);
        return;
    };

    let dob = match (patient.date_of_birth, patient.age_on(today)) {
        (Some(dob), Some(age)) => format!("{} (Age {age})", dob.format("%Y-%m-%d")),
        (Some(dob), None) => dob.format("%Y-%m-%d").to_string(),
        _ => NOT_AVAILABLE.to_string(),
    };

    writer.boxed_pairs(&[
        vec![
            ("Name", or_na(Some(patient.name.as_str()))),
            ("Patient No", or_na(patient.patient_number.as_deref())),
        ],
        vec![
            ("Date of Birth", dob),
            ("Gender", or_na(patient.gender.as_deref())),
        ],
        vec![
            ("Blood Type", or_na(patient.blood_type.as_deref())),
            ("Phone", or_na(patient.phone.as_deref())),
        ],
    ]);
}

fn statistics(writer: &mut PageWriter, records: &[TimelineEntry]) {
    writer.heading("Summary");

    let newest = records.iter().map(|r| r.date).max();
    let oldest = records.iter().map(|r| r.date).min();
    let period = match (oldest, newest) {
        (Some(from), Some(to)) => format!("{} to {}", format_date(&from), format_date(&to)),
        _ => NOT_AVAILABLE.to_string(),
    };
    writer.pair_row(0.0, &[("Total Records", records.len().to_string()), ("Period", period)]);
    writer.advance(2.0);

    let mut by_type: BTreeMap<RecordType, usize> = BTreeMap::new();
    let mut by_status: BTreeMap<String, usize> = BTreeMap::new();
    for record in records {
        *by_type.entry(record.record_type).or_default() += 1;
        let status = record
            .status
            .as_deref()
            .map(status_label)
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "Unspecified".to_string());
        *by_status.entry(status).or_default() += 1;
    }

    let mut statuses: Vec<(String, usize)> = by_status.into_iter().collect();
    statuses.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

    let rows: Vec<Vec<String>> = by_type
        .into_iter()
        .map(|(t, n)| vec!["Record Type".to_string(), t.label().to_string(), n.to_string()])
        .chain(
            statuses
                .into_iter()
                .map(|(s, n)| vec!["Status".to_string(), s, n.to_string()]),
        )
        .collect();

    writer.table(
        &[
            Column::new("Group", 40.0),
            Column::new("Value", 100.0),
            Column::new("Count", 40.0),
        ],
        &rows,
    );
}

fn admission_block(writer: &mut PageWriter, admission: &RelatedAdmission, max_notes: usize) {
    writer.advance(1.0);
    writer.line(2.0, BODY_SIZE, FontStyle::Bold, "Hospital Admission");
    writer.pair_row(
        4.0,
        &[
            ("Admission No", or_na(admission.admission_number.as_deref())),
            (
                "Admitted",
                admission
                    .admission_date
                    .as_ref()
                    .map(format_date)
                    .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            ),
        ],
    );
    writer.pair_row(
        4.0,
        &[
            (
                "Status",
                admission
                    .status
                    .map(|s| s.label().to_string())
                    .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            ),
            (
                "Discharged",
                admission
                    .discharge_date
                    .as_ref()
                    .map(format_date)
                    .unwrap_or_else(|| "-".to_string()),
            ),
        ],
    );
    if let Some(summary) = &admission.discharge_summary {
        writer.field(4.0, "Discharge Summary", summary);
    }

    let total = admission.total_progress_notes();
    if total == 0 {
        return;
    }

    writer.line(4.0, BODY_SIZE, FontStyle::Bold, format!("Progress Notes ({total})"));
    let shown: Vec<_> = admission
        .recent_progress_notes
        .iter()
        .take(max_notes)
        .collect();

    for note in &shown {
        let header = [
            note.note_date.as_ref().map(format_display),
            note.note_type.as_deref().map(status_label),
            note.author.clone(),
        ]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(" | ");
        writer.line(6.0, SMALL_SIZE, FontStyle::Bold, if header.is_empty() { "Note".to_string() } else { header });
        for (key, text) in note.soap_sections() {
            writer.paragraph(8.0, SMALL_SIZE, FontStyle::Regular, &format!("{key}: {text}"));
        }
    }

    let remaining = total.saturating_sub(shown.len());
    if remaining > 0 {
        writer.line(6.0, SMALL_SIZE, FontStyle::Italic, more_notes_label(remaining));
    }
}

fn prescriptions_table(writer: &mut PageWriter, entry: &TimelineEntry) {
    let mut rows = Vec::new();
    for prescription in entry.all_prescriptions() {
        let number = or_na(prescription.prescription_number.as_deref());
        let date = prescription
            .prescription_date
            .as_ref()
            .map(format_date)
            .unwrap_or_default();

        if prescription.items.is_empty() {
            rows.push(vec![number, date, "-".to_string(), String::new(), String::new(), String::new(), String::new()]);
            continue;
        }
        for item in &prescription.items {
            rows.push(vec![
                number.clone(),
                date.clone(),
                or_na(item.medication_name.as_deref()),
                item.dosage.clone().unwrap_or_default(),
                item.frequency.clone().unwrap_or_default(),
                item.route.clone().unwrap_or_default(),
                item.duration.clone().unwrap_or_default(),
            ]);
        }
    }

    if rows.is_empty() {
        return;
    }

    writer.advance(1.0);
    writer.line(2.0, BODY_SIZE, FontStyle::Bold, "Prescriptions");
    writer.table(
        &[
            Column::new("Rx No", 26.0),
            Column::new("Date", 22.0),
            Column::new("Medication", 44.0),
            Column::new("Dosage", 22.0),
            Column::new("Frequency", 24.0),
            Column::new("Route", 18.0),
            Column::new("Duration", 24.0),
        ],
        &rows,
    );
}

fn record_section(writer: &mut PageWriter, index: usize, entry: &TimelineEntry, options: &ReportOptions) {
    writer.ensure_space(options.page_break_threshold_mm);

    writer.line(0.0, 10.5, FontStyle::Bold, format!("{}. {}", index + 1, entry.display_title()));
    writer.pair_row(
        0.0,
        &[
            ("Date", format_display(&entry.date)),
            ("Type", entry.record_type.label().to_string()),
            (
                "Status",
                entry
                    .status
                    .as_deref()
                    .map(status_label)
                    .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            ),
        ],
    );

    let fields = [
        ("Doctor", entry.doctor.clone()),
        ("Chief Complaint", entry.chief_complaint.clone()),
        ("Diagnosis", entry.diagnosis.as_ref().and_then(diagnosis_text)),
        ("Treatment Plan", entry.treatment_plan.clone()),
        ("Findings", entry.findings.clone()),
        ("Notes", entry.notes.clone()),
    ];
    for (label, value) in fields {
        if let Some(value) = value {
            writer.field(0.0, label, &value);
        }
    }

    if let Some(vitals) = entry.vitals.as_ref().filter(|v| !v.is_empty()) {
        writer.advance(1.0);
        writer.line(2.0, BODY_SIZE, FontStyle::Bold, "Vital Signs");
        let readings = vitals.readings();
        for chunk in readings.chunks(VITALS_PER_ROW) {
            let pairs: Vec<(&str, String)> = chunk.iter().map(|(l, v)| (*l, v.clone())).collect();
            writer.pair_row(4.0, &pairs);
        }
    }

    if let Some(admission) = &entry.related_admission {
        admission_block(writer, admission, options.max_progress_notes);
    }

    prescriptions_table(writer, entry);
    writer.rule();
}

/// Lay out the medical records report
///
/// # Errors
///
/// Returns the "No data to export" error when `records` is empty.
pub fn build_records_layout(
    records: &[TimelineEntry],
    patient: Option<&PatientInfo>,
    options: &ReportOptions,
    generated_at: DateTime<Utc>,
) -> Result<ReportLayout> {
    if records.is_empty() {
        return Err(HmsExportError::no_data());
    }

    let title = match patient {
        Some(p) if !p.name.trim().is_empty() => format!("Medical Records - {}", p.name),
        _ => "Medical Records Report".to_string(),
    };

    let mut writer = PageWriter::new(
        title.clone(),
        options.orientation,
        Banner {
            heading: options.hospital_name.clone(),
            subheading: title,
            generated: format!("Generated: {}", generated_at.format("%Y-%m-%d %H:%M")),
        },
        options.palette,
    );

    patient_box(&mut writer, patient, generated_at.date_naive());
    statistics(&mut writer, records);

    writer.heading("Medical History");
    for (index, entry) in records.iter().enumerate() {
        record_section(&mut writer, index, entry, options);
    }

    tracing::debug!(records = records.len(), "Medical records report laid out");

    Ok(writer.finish())
}
