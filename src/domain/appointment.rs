//! Appointment list rows for the appointment report

use super::ids::RecordId;
use super::status::AppointmentStatus;
use super::timestamp::flexible;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One appointment as listed on the reception / doctor dashboards
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentRow {
    pub id: RecordId,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub appointment_number: Option<String>,

    #[serde(with = "flexible")]
    pub date: DateTime<Utc>,

    /// Slot as booked, e.g. `09:30 - 10:00`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_slot: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patient_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doctor_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,

    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub appointment_type: Option<String>,

    pub status: AppointmentStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl AppointmentRow {
    pub fn new(id: impl Into<RecordId>, date: DateTime<Utc>, status: AppointmentStatus) -> Self {
        Self {
            id: id.into(),
            appointment_number: None,
            date,
            time_slot: None,
            patient_name: None,
            doctor_name: None,
            department: None,
            appointment_type: None,
            status,
            reason: None,
        }
    }
}
