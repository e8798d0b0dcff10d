//! Data transformation logic
//!
//! Two steps sit between the raw backend payloads and the exporters:
//!
//! - **Normalize**: Converts heterogeneous backend records (appointments,
//!   admissions, medical records, lab results, imaging studies) into the
//!   uniform [`TimelineEntry`](crate::domain::TimelineEntry) shape, sorted
//!   newest first
//! - **Flatten**: Converts timeline entries into flat rows for CSV, one base
//!   row per entry plus one row per admission prescription item

pub mod flatten;
pub mod normalize;

pub use flatten::{appointments_to_rows, flatten_entry, flatten_records_for_csv, FlatRow};
pub use normalize::{build_timeline, normalize_appointment, normalize_appointments, normalize_record};
