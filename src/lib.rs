// HMS Export - Medical record export tool
// Copyright (c) 2025 HMS Export Contributors
// Licensed under the MIT License

//! # hms-export - Medical record timeline and export pipeline
//!
//! hms-export turns the heterogeneous record shapes served by a hospital
//! management backend into one chronological patient timeline, and exports
//! that timeline (or an appointment list) as CSV, JSON or a paginated PDF
//! report.
//!
//! ## Overview
//!
//! This library provides the core functionality for:
//! - **Normalizing** appointments, admissions, medical records, lab tests and
//!   imaging studies into [`domain::TimelineEntry`] values
//! - **Flattening** nested admissions, prescriptions and vitals into CSV rows
//! - **Rendering** A4 PDF reports with banners, tables and page numbers
//! - **Writing** JSON exports wrapped in an export envelope
//!
//! ## Architecture
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Business logic (normalization, exporters, coordinator, events)
//! - [`adapters`] - Records API client and file source
//! - [`domain`] - Core domain types and models
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging
//!
//! ## Quick Start
//!
//! ```rust
//! use hms_export::core::export::{export_timeline, ExportFormat, ExportOptions};
//! use hms_export::core::transform::build_timeline;
//! use serde_json::json;
//!
//! let raw = vec![json!({
//!     "id": 1,
//!     "type": "appointment",
//!     "date": "2024-01-01",
//!     "title": "Checkup",
//!     "status": "completed",
//!     "vitals": { "temperature": 37 }
//! })];
//!
//! let timeline = build_timeline(&raw);
//! let artifact = export_timeline(&timeline, ExportFormat::Csv, &ExportOptions::new("records"))
//!     .expect("export");
//! assert!(artifact.file_name.ends_with(".csv"));
//! ```
//!
//! ## Error Handling
//!
//! All library errors are [`domain::HmsExportError`]. Exporters reject an
//! empty record set with the "No data to export" error before anything is
//! written:
//!
//! ```rust
//! use hms_export::core::export::{export_timeline, ExportFormat, ExportOptions};
//!
//! let err = export_timeline(&[], ExportFormat::Pdf, &ExportOptions::new("records")).unwrap_err();
//! assert!(err.is_no_data());
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
