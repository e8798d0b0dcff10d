//! Domain models and types for hms-export.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **Timeline model** ([`TimelineEntry`] and its nested admission,
//!   prescription, progress-note and vitals types)
//! - **Closed status vocabularies** ([`AppointmentStatus`],
//!   [`AdmissionStatus`], [`PrescriptionStatus`])
//! - **Report metadata** ([`PatientInfo`], [`AppointmentRow`])
//! - **Error types** ([`HmsExportError`], [`ApiError`])
//! - **Result type alias** ([`Result`])
//!
//! # Error Handling
//!
//! All fallible operations return [`Result<T, HmsExportError>`]:
//!
//! ```rust
//! use hms_export::domain::{HmsExportError, Result};
//!
//! fn example() -> Result<()> {
//!     let config = hms_export::config::load_config("hms-export.toml")?;
//!     Ok(())
//! }
//! ```

pub mod appointment;
pub mod errors;
pub mod ids;
pub mod patient;
pub mod result;
pub mod status;
pub mod timeline;
pub mod timestamp;

// Re-export commonly used types for convenience
pub use appointment::AppointmentRow;
pub use errors::{ApiError, HmsExportError, NO_DATA_TO_EXPORT};
pub use ids::{PatientId, RecordId};
pub use patient::PatientInfo;
pub use result::Result;
pub use status::{AdmissionStatus, AppointmentStatus, PrescriptionStatus};
pub use timeline::{
    Diagnosis, Prescription, PrescriptionItem, ProgressNote, RecordType, RelatedAdmission,
    StructuredDiagnosis, TimelineEntry, Vitals,
};
