//! External system integrations for hms-export.
//!
//! - [`api`] - Hospital records REST API and JSON file sources
//!
//! Adapters isolate HTTP and file access behind the [`api::RecordSource`]
//! trait so the export pipeline can be driven from a live backend or from a
//! JSON dump, and tested with either.
//!
//! ```rust,no_run
//! use hms_export::adapters::api::{ApiClient, RecordSource};
//! use hms_export::config::ApiConfig;
//! use hms_export::domain::PatientId;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = ApiClient::new(ApiConfig::default())?;
//! let items = client.fetch_timeline(&PatientId::new("42")?).await?;
//! println!("{} raw records", items.len());
//! # Ok(())
//! # }
//! ```

pub mod api;
