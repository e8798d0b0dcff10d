//! Closed status vocabularies
//!
//! Statuses arrive as free-form strings and the dashboards disagree on
//! spelling (`no-show` vs `no_show`, `canceled` vs `cancelled`). Parsing
//! folds case, dashes and spaces into one snake_case token and rejects
//! anything outside the vocabulary with a validation error.

use super::HmsExportError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Fold a raw status into its canonical snake_case token
pub fn normalize_status_token(raw: &str) -> String {
    raw.trim()
        .to_lowercase()
        .replace(['-', ' '], "_")
}

fn unknown_status(kind: &str, raw: &str, expected: &[&str]) -> HmsExportError {
    HmsExportError::Validation(format!(
        "Unknown {kind} status '{raw}'. Expected one of: {}",
        expected.join(", ")
    ))
}

/// Appointment lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", try_from = "String")]
pub enum AppointmentStatus {
    Scheduled,
    Confirmed,
    CheckedIn,
    InProgress,
    Completed,
    Cancelled,
    NoShow,
    Rescheduled,
}

impl AppointmentStatus {
    const NAMES: [&'static str; 8] = [
        "scheduled",
        "confirmed",
        "checked_in",
        "in_progress",
        "completed",
        "cancelled",
        "no_show",
        "rescheduled",
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Scheduled => "scheduled",
            Self::Confirmed => "confirmed",
            Self::CheckedIn => "checked_in",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
            Self::NoShow => "no_show",
            Self::Rescheduled => "rescheduled",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Scheduled => "Scheduled",
            Self::Confirmed => "Confirmed",
            Self::CheckedIn => "Checked In",
            Self::InProgress => "In Progress",
            Self::Completed => "Completed",
            Self::Cancelled => "Cancelled",
            Self::NoShow => "No Show",
            Self::Rescheduled => "Rescheduled",
        }
    }

    /// Whether the appointment can no longer change
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled | Self::NoShow)
    }
}

impl FromStr for AppointmentStatus {
    type Err = HmsExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_status_token(s).as_str() {
            "scheduled" | "pending" | "booked" => Ok(Self::Scheduled),
            "confirmed" => Ok(Self::Confirmed),
            "checked_in" | "checkedin" | "arrived" => Ok(Self::CheckedIn),
            "in_progress" | "in_consultation" => Ok(Self::InProgress),
            "completed" | "done" => Ok(Self::Completed),
            "cancelled" | "canceled" => Ok(Self::Cancelled),
            "no_show" | "noshow" | "missed" => Ok(Self::NoShow),
            "rescheduled" => Ok(Self::Rescheduled),
            _ => Err(unknown_status("appointment", s, &Self::NAMES)),
        }
    }
}

impl TryFrom<String> for AppointmentStatus {
    type Error = HmsExportError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Inpatient admission status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", try_from = "String")]
pub enum AdmissionStatus {
    Pending,
    Admitted,
    Transferred,
    Discharged,
    Cancelled,
}

impl AdmissionStatus {
    const NAMES: [&'static str; 5] = ["pending", "admitted", "transferred", "discharged", "cancelled"];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Admitted => "admitted",
            Self::Transferred => "transferred",
            Self::Discharged => "discharged",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Admitted => "Admitted",
            Self::Transferred => "Transferred",
            Self::Discharged => "Discharged",
            Self::Cancelled => "Cancelled",
        }
    }
}

impl FromStr for AdmissionStatus {
    type Err = HmsExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_status_token(s).as_str() {
            "pending" => Ok(Self::Pending),
            "admitted" | "active" | "in_patient" | "inpatient" => Ok(Self::Admitted),
            "transferred" => Ok(Self::Transferred),
            "discharged" => Ok(Self::Discharged),
            "cancelled" | "canceled" => Ok(Self::Cancelled),
            _ => Err(unknown_status("admission", s, &Self::NAMES)),
        }
    }
}

impl TryFrom<String> for AdmissionStatus {
    type Error = HmsExportError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for AdmissionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Prescription status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", try_from = "String")]
pub enum PrescriptionStatus {
    Draft,
    Active,
    Dispensed,
    Completed,
    Cancelled,
    Expired,
}

impl PrescriptionStatus {
    const NAMES: [&'static str; 6] = [
        "draft",
        "active",
        "dispensed",
        "completed",
        "cancelled",
        "expired",
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Active => "active",
            Self::Dispensed => "dispensed",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
            Self::Expired => "expired",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Draft => "Draft",
            Self::Active => "Active",
            Self::Dispensed => "Dispensed",
            Self::Completed => "Completed",
            Self::Cancelled => "Cancelled",
            Self::Expired => "Expired",
        }
    }
}

impl FromStr for PrescriptionStatus {
    type Err = HmsExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_status_token(s).as_str() {
            "draft" => Ok(Self::Draft),
            "active" | "pending" => Ok(Self::Active),
            "dispensed" => Ok(Self::Dispensed),
            "completed" => Ok(Self::Completed),
            "cancelled" | "canceled" | "discontinued" => Ok(Self::Cancelled),
            "expired" => Ok(Self::Expired),
            _ => Err(unknown_status("prescription", s, &Self::NAMES)),
        }
    }
}

impl TryFrom<String> for PrescriptionStatus {
    type Error = HmsExportError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for PrescriptionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Human label for a free-form status string, e.g. `no-show` -> `No Show`
pub fn status_label(raw: &str) -> String {
    normalize_status_token(raw)
        .split('_')
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("no-show", AppointmentStatus::NoShow ; "dashed")]
    #[test_case("no_show", AppointmentStatus::NoShow ; "underscored")]
    #[test_case("No Show", AppointmentStatus::NoShow ; "spaced")]
    #[test_case("checked_in", AppointmentStatus::CheckedIn ; "checked in")]
    #[test_case("CANCELED", AppointmentStatus::Cancelled ; "american spelling")]
    #[test_case(" scheduled ", AppointmentStatus::Scheduled ; "padded")]
    fn test_appointment_status_parse(raw: &str, expected: AppointmentStatus) {
        assert_eq!(raw.parse::<AppointmentStatus>().unwrap(), expected);
    }

    #[test]
    fn test_unknown_status_rejected() {
        let err = "teleported".parse::<AppointmentStatus>().unwrap_err();
        assert!(matches!(err, HmsExportError::Validation(_)));
        assert!(err.to_string().contains("teleported"));

        assert!("floating".parse::<AdmissionStatus>().is_err());
        assert!("".parse::<PrescriptionStatus>().is_err());
    }

    #[test]
    fn test_status_serde_rejects_unknown() {
        let ok: AppointmentStatus = serde_json::from_str("\"no-show\"").unwrap();
        assert_eq!(ok, AppointmentStatus::NoShow);
        assert_eq!(serde_json::to_string(&ok).unwrap(), "\"no_show\"");

        assert!(serde_json::from_str::<AppointmentStatus>("\"lost\"").is_err());
    }

    #[test]
    fn test_terminal_statuses() {
        assert!(AppointmentStatus::Completed.is_terminal());
        assert!(AppointmentStatus::NoShow.is_terminal());
        assert!(!AppointmentStatus::CheckedIn.is_terminal());
    }

    #[test]
    fn test_status_label() {
        assert_eq!(status_label("no-show"), "No Show");
        assert_eq!(status_label("discharged"), "Discharged");
        assert_eq!(status_label("awaiting_results"), "Awaiting Results");
    }
}
