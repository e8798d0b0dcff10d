//! Configuration management for hms-export.
//!
//! TOML configuration with:
//! - Environment variable substitution (`${VAR_NAME}`)
//! - `HMS_EXPORT_<SECTION>_<KEY>` environment overrides
//! - Default values for every setting
//! - Validation on load
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use hms_export::config::load_config;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("hms-export.toml")?;
//!
//! println!("API: {}", config.api.base_url);
//! println!("Output: {}", config.export.output_dir);
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration Structure
//!
//! - [`ApplicationConfig`] - Log level
//! - [`ApiConfig`] - Records API URL, token, timeout and page size
//! - [`ExportConfig`] - Output directory, default format, file names, CSV header
//! - [`ReportConfig`] - Hospital name, progress note cap, page break threshold
//! - [`LoggingConfig`] - Log files
//!
//! # Example Configuration
//!
//! ```toml
//! [application]
//! log_level = "info"
//!
//! [api]
//! base_url = "https://hms.example.org/api"
//! token = "${HMS_EXPORT_API_TOKEN}"
//! timeout_seconds = 30
//!
//! [export]
//! output_dir = "./exports"
//! default_format = "pdf"
//!
//! [report]
//! hospital_name = "St. Mary Hospital"
//! max_progress_notes = 5
//! ```

pub mod loader;
pub mod schema;
pub mod secret;

pub use loader::{load_config, load_config_or_default, resolve_config_path, DEFAULT_CONFIG_PATH};
pub use schema::{
    ApiConfig, ApplicationConfig, ExportConfig, HmsExportConfig, LoggingConfig, ReportConfig,
};
pub use secret::{secret_string, ApiToken, SecretString};
