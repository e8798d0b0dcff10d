//! Core business logic for hms-export.
//!
//! # Modules
//!
//! - [`transform`] - Record normalization and CSV flattening
//! - [`export`] - CSV, JSON and PDF exporters and the export coordinator
//! - [`events`] - Appointment event bus and optimistic status store
//!
//! # Export Workflow
//!
//! 1. **Fetch**: read raw items from the records API or a JSON file
//! 2. **Normalize**: build a newest-first timeline (or appointment rows)
//! 3. **Render**: produce the CSV, JSON or PDF document in memory
//! 4. **Write**: move the finished document into the output directory
//! 5. **Report**: log an export summary
//!
//! # Example
//!
//! ```rust,no_run
//! use hms_export::config::load_config;
//! use hms_export::core::export::{ExportCoordinator, ExportFormat, ExportRequest, ExportTarget};
//! use hms_export::domain::PatientId;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("hms-export.toml")?;
//! let coordinator = ExportCoordinator::from_config(&config, None)?;
//!
//! let request = ExportRequest::from_config(
//!     &config,
//!     ExportTarget::Timeline { patient_id: PatientId::new("42")? },
//!     ExportFormat::Pdf,
//! )?;
//! let summary = coordinator.execute_export(&request).await;
//!
//! println!("Exported: {}", summary.records_exported);
//! println!("Written to: {:?}", summary.output_path);
//! # Ok(())
//! # }
//! ```

pub mod events;
pub mod export;
pub mod transform;
