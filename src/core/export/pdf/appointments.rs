//! Appointment list report layout (landscape)

use super::layout::{Banner, Column, FontStyle, Orientation, PageWriter, ReportLayout, BODY_SIZE};
use super::ReportOptions;
use crate::domain::timestamp::format_date;
use crate::domain::{AppointmentRow, AppointmentStatus, HmsExportError, Result};
use chrono::{DateTime, NaiveDate, Utc};
use std::collections::BTreeMap;

fn columns() -> Vec<Column> {
    vec![
        Column::new("#", 8.0),
        Column::new("Appt No", 26.0),
        Column::new("Date", 22.0),
        Column::new("Time", 24.0),
        Column::new("Patient", 38.0),
        Column::new("Doctor", 36.0),
        Column::new("Department", 30.0),
        Column::new("Type", 24.0),
        Column::new("Status", 22.0),
        Column::new("Reason", 37.0),
    ]
}

/// `Total: n | Scheduled: x | ...` in status order
pub fn status_summary(appointments: &[AppointmentRow]) -> String {
    let mut counts: BTreeMap<AppointmentStatus, usize> = BTreeMap::new();
    for appointment in appointments {
        *counts.entry(appointment.status).or_default() += 1;
    }

    std::iter::once(format!("Total: {}", appointments.len()))
        .chain(counts.into_iter().map(|(s, n)| format!("{}: {n}", s.label())))
        .collect::<Vec<_>>()
        .join(" | ")
}

/// Lay out the appointment report
///
/// # Errors
///
/// Returns the "No data to export" error when `appointments` is empty.
pub fn build_appointment_layout(
    appointments: &[AppointmentRow],
    report_date: Option<NaiveDate>,
    options: &ReportOptions,
    generated_at: DateTime<Utc>,
) -> Result<ReportLayout> {
    if appointments.is_empty() {
        return Err(HmsExportError::no_data());
    }

    let title = match report_date {
        Some(date) => format!("Appointment Report - {}", date.format("%Y-%m-%d")),
        None => "Appointment Report".to_string(),
    };

    let mut writer = PageWriter::new(
        title.clone(),
        Orientation::Landscape,
        Banner {
            heading: options.hospital_name.clone(),
            subheading: title,
            generated: format!("Generated: {}", generated_at.format("%Y-%m-%d %H:%M")),
        },
        options.palette,
    );

    writer.line(0.0, BODY_SIZE, FontStyle::Bold, status_summary(appointments));
    writer.advance(2.0);

    let rows: Vec<Vec<String>> = appointments
        .iter()
        .enumerate()
        .map(|(i, a)| {
            vec![
                (i + 1).to_string(),
                a.appointment_number.clone().unwrap_or_default(),
                format_date(&a.date),
                a.time_slot.clone().unwrap_or_default(),
                a.patient_name.clone().unwrap_or_default(),
                a.doctor_name.clone().unwrap_or_default(),
                a.department.clone().unwrap_or_default(),
                a.appointment_type.clone().unwrap_or_default(),
                a.status.label().to_string(),
                a.reason.clone().unwrap_or_default(),
            ]
        })
        .collect();

    writer.table(&columns(), &rows);

    tracing::debug!(appointments = appointments.len(), "Appointment report laid out");

    Ok(writer.finish())
}
