//! Configuration schema types
//!
//! Every section has defaults, so an empty file (or no file at all) is a
//! valid configuration for exporting from local JSON input.

use crate::config::SecretString;
use crate::core::export::csv::HeaderStrategy;
use crate::core::export::pdf::{Color, Palette, ReportOptions};
use crate::core::export::ExportFormat;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Main configuration, mapped from `hms-export.toml`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HmsExportConfig {
    /// Application-level settings
    #[serde(default)]
    pub application: ApplicationConfig,

    /// Records API connection
    #[serde(default)]
    pub api: ApiConfig,

    /// Output settings
    #[serde(default)]
    pub export: ExportConfig,

    /// PDF report presentation
    #[serde(default)]
    pub report: ReportConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl HmsExportConfig {
    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns a description of the first invalid value found
    pub fn validate(&self) -> Result<(), String> {
        self.application.validate()?;
        self.api.validate()?;
        self.export.validate()?;
        self.report.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

/// Application-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

impl ApplicationConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            ));
        }
        Ok(())
    }
}

/// Records API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the hospital backend, e.g. `https://hms.example.org/api`
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Bearer token sent with every request (optional)
    /// Stored securely in memory and zeroized on drop
    #[serde(default)]
    pub token: Option<SecretString>,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,

    /// `limit` query parameter for list endpoints
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            token: None,
            timeout_seconds: default_timeout_seconds(),
            page_size: default_page_size(),
        }
    }
}

impl ApiConfig {
    fn validate(&self) -> Result<(), String> {
        if self.base_url.is_empty() {
            return Err("api.base_url cannot be empty".to_string());
        }

        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err("api.base_url must start with http:// or https://".to_string());
        }

        if url::Url::parse(&self.base_url).is_err() {
            return Err(format!("api.base_url '{}' is not a valid URL", self.base_url));
        }

        if !(1..=300).contains(&self.timeout_seconds) {
            return Err(format!(
                "api.timeout_seconds must be between 1 and 300, got {}",
                self.timeout_seconds
            ));
        }

        if !(1..=1000).contains(&self.page_size) {
            return Err(format!(
                "api.page_size must be between 1 and 1000, got {}",
                self.page_size
            ));
        }

        Ok(())
    }
}

/// Export output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Directory export files are written to
    #[serde(default = "default_output_dir")]
    pub output_dir: String,

    /// Format used when none is given on the command line (csv, json, pdf)
    #[serde(default = "default_format")]
    pub default_format: String,

    /// Base file name for timeline exports
    #[serde(default = "default_file_name_prefix")]
    pub file_name_prefix: String,

    /// Base file name for appointment reports
    #[serde(default = "default_appointments_file_name_prefix")]
    pub appointments_file_name_prefix: String,

    /// CSV header strategy (union or first_row)
    #[serde(default = "default_csv_header")]
    pub csv_header: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            default_format: default_format(),
            file_name_prefix: default_file_name_prefix(),
            appointments_file_name_prefix: default_appointments_file_name_prefix(),
            csv_header: default_csv_header(),
        }
    }
}

impl ExportConfig {
    fn validate(&self) -> Result<(), String> {
        if self.output_dir.trim().is_empty() {
            return Err("export.output_dir cannot be empty".to_string());
        }

        ExportFormat::from_str(&self.default_format).map_err(|e| e.to_string())?;
        HeaderStrategy::from_str(&self.csv_header).map_err(|e| e.to_string())?;

        for (key, prefix) in [
            ("file_name_prefix", &self.file_name_prefix),
            ("appointments_file_name_prefix", &self.appointments_file_name_prefix),
        ] {
            if prefix.trim().is_empty() {
                return Err(format!("export.{key} cannot be empty"));
            }
            if prefix.contains(['/', '\\']) {
                return Err(format!("export.{key} must not contain path separators"));
            }
        }

        Ok(())
    }

    /// Parsed `default_format`
    pub fn format(&self) -> crate::domain::Result<ExportFormat> {
        ExportFormat::from_str(&self.default_format)
    }

    /// Parsed `csv_header`
    pub fn header_strategy(&self) -> crate::domain::Result<HeaderStrategy> {
        HeaderStrategy::from_str(&self.csv_header)
    }
}

/// PDF report configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Name printed in the report banner and footer
    #[serde(default = "default_hospital_name")]
    pub hospital_name: String,

    /// Progress notes printed per admission before the rest are summarized
    #[serde(default = "default_max_progress_notes")]
    pub max_progress_notes: usize,

    /// Free space (mm) a record section needs before it may start on a page
    #[serde(default = "default_page_break_threshold_mm")]
    pub page_break_threshold_mm: f32,

    /// Banner and heading color as `#rrggbb`
    #[serde(default)]
    pub accent_color: Option<String>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            hospital_name: default_hospital_name(),
            max_progress_notes: default_max_progress_notes(),
            page_break_threshold_mm: default_page_break_threshold_mm(),
            accent_color: None,
        }
    }
}

impl ReportConfig {
    fn validate(&self) -> Result<(), String> {
        if self.hospital_name.trim().is_empty() {
            return Err("report.hospital_name cannot be empty".to_string());
        }

        if self.max_progress_notes > 50 {
            return Err(format!(
                "report.max_progress_notes must be at most 50, got {}",
                self.max_progress_notes
            ));
        }

        if !(10.0..=200.0).contains(&self.page_break_threshold_mm) {
            return Err(format!(
                "report.page_break_threshold_mm must be between 10 and 200, got {}",
                self.page_break_threshold_mm
            ));
        }

        if let Some(color) = &self.accent_color {
            Color::from_hex(color).map_err(|_| {
                format!("report.accent_color '{color}' must be a #rrggbb hex color")
            })?;
        }

        Ok(())
    }

    /// Report options for the PDF builder
    pub fn to_options(&self) -> crate::domain::Result<ReportOptions> {
        let mut palette = Palette::default();
        if let Some(color) = &self.accent_color {
            palette = palette.with_accent(Color::from_hex(color)?);
        }

        Ok(ReportOptions::default()
            .with_hospital_name(self.hospital_name.clone())
            .with_max_progress_notes(self.max_progress_notes)
            .with_page_break_threshold(self.page_break_threshold_mm)
            .with_palette(palette))
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Write JSON log files in addition to console output
    #[serde(default)]
    pub local_enabled: bool,

    /// Directory for log files
    #[serde(default = "default_local_path")]
    pub local_path: String,

    /// File rotation (daily, hourly, never)
    #[serde(default = "default_local_rotation")]
    pub local_rotation: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            local_enabled: false,
            local_path: default_local_path(),
            local_rotation: default_local_rotation(),
        }
    }
}

impl LoggingConfig {
    pub fn validate(&self) -> Result<(), String> {
        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&self.local_rotation.as_str()) {
            return Err(format!(
                "Invalid logging.local_rotation '{}'. Must be one of: {}",
                self.local_rotation,
                valid_rotations.join(", ")
            ));
        }

        if self.local_enabled && self.local_path.trim().is_empty() {
            return Err("logging.local_path cannot be empty when local_enabled is true".to_string());
        }

        Ok(())
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_base_url() -> String {
    "http://localhost:3000/api".to_string()
}

fn default_timeout_seconds() -> u64 {
    30
}

fn default_page_size() -> usize {
    100
}

fn default_output_dir() -> String {
    "./exports".to_string()
}

fn default_format() -> String {
    "csv".to_string()
}

fn default_file_name_prefix() -> String {
    "medical-records".to_string()
}

fn default_appointments_file_name_prefix() -> String {
    "appointments".to_string()
}

fn default_csv_header() -> String {
    "union".to_string()
}

fn default_hospital_name() -> String {
    crate::core::export::pdf::DEFAULT_HOSPITAL_NAME.to_string()
}

fn default_max_progress_notes() -> usize {
    crate::core::export::pdf::DEFAULT_MAX_PROGRESS_NOTES
}

fn default_page_break_threshold_mm() -> f32 {
    crate::core::export::pdf::DEFAULT_PAGE_BREAK_THRESHOLD_MM
}

fn default_local_path() -> String {
    "./logs".to_string()
}

fn default_local_rotation() -> String {
    "daily".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::secret_string;

    #[test]
    fn test_default_config_is_valid() {
        let config = HmsExportConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.export.default_format, "csv");
        assert_eq!(config.report.max_progress_notes, 5);
        assert!(!config.logging.local_enabled);
    }

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config: HmsExportConfig = toml::from_str("").unwrap();
        assert_eq!(config.api.timeout_seconds, 30);
        assert_eq!(config.api.page_size, 100);
        assert_eq!(config.export.file_name_prefix, "medical-records");
        assert_eq!(config.export.csv_header, "union");
    }

    #[test]
    fn test_invalid_log_level() {
        let mut config = HmsExportConfig::default();
        config.application.log_level = "verbose".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.contains("Invalid log_level"));
    }

    #[test]
    fn test_api_base_url_validation() {
        let mut config = HmsExportConfig::default();
        config.api.base_url = "ftp://hms.example.org".to_string();
        assert!(config.validate().unwrap_err().contains("http://"));

        config.api.base_url = String::new();
        assert!(config.validate().unwrap_err().contains("cannot be empty"));

        config.api.base_url = "https://hms.example.org/api".to_string();
        config.api.token = Some(secret_string("token".to_string()));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_api_limits() {
        let mut config = HmsExportConfig::default();
        config.api.timeout_seconds = 0;
        assert!(config.validate().unwrap_err().contains("timeout_seconds"));

        config.api.timeout_seconds = 30;
        config.api.page_size = 5000;
        assert!(config.validate().unwrap_err().contains("page_size"));
    }

    #[test]
    fn test_export_format_and_header_validation() {
        let mut config = HmsExportConfig::default();
        config.export.default_format = "xlsx".to_string();
        assert!(config.validate().is_err());

        config.export.default_format = "PDF".to_string();
        assert!(config.validate().is_ok());
        assert_eq!(config.export.format().unwrap(), ExportFormat::Pdf);

        config.export.csv_header = "diagonal".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_file_name_prefix_rejects_paths() {
        let mut config = HmsExportConfig::default();
        config.export.file_name_prefix = "../records".to_string();
        assert!(config.validate().unwrap_err().contains("path separators"));
    }

    #[test]
    fn test_report_validation() {
        let mut config = HmsExportConfig::default();
        config.report.page_break_threshold_mm = 5.0;
        assert!(config.validate().is_err());

        config.report.page_break_threshold_mm = 60.0;
        config.report.accent_color = Some("teal".to_string());
        assert!(config.validate().unwrap_err().contains("accent_color"));

        config.report.accent_color = Some("#008080".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_report_to_options() {
        let report = ReportConfig {
            hospital_name: "St. Mary Hospital".to_string(),
            max_progress_notes: 3,
            page_break_threshold_mm: 45.0,
            accent_color: Some("#008080".to_string()),
        };
        let options = report.to_options().unwrap();

        assert_eq!(options.hospital_name, "St. Mary Hospital");
        assert_eq!(options.max_progress_notes, 3);
        assert_eq!(options.page_break_threshold_mm, 45.0);
        assert_eq!(options.palette.accent, Color::rgb8(0x00, 0x80, 0x80));
    }

    #[test]
    fn test_logging_rotation_validation() {
        let mut config = LoggingConfig::default();
        assert!(config.validate().is_ok());
        config.local_rotation = "weekly".to_string();
        assert!(config.validate().is_err());
    }
}
