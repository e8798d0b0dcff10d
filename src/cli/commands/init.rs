//! Init command implementation
//!
//! This module implements the `init` command for generating a sample
//! configuration file.

use super::{EXIT_CONFIG, EXIT_FATAL, EXIT_SUCCESS};
use crate::config::DEFAULT_CONFIG_PATH;
use clap::Args;
use std::fs;
use std::path::Path;

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Path where to create the configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    pub output: String,

    /// Include example values and comments
    #[arg(long)]
    pub with_examples: bool,

    /// Overwrite existing file
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    /// Execute the init command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!(output = %self.output, "Initializing configuration file");

        println!("📝 Initializing hms-export configuration");
        println!();

        if Path::new(&self.output).exists() && !self.force {
            println!("❌ Configuration file already exists: {}", self.output);
            println!("   Use --force to overwrite");
            return Ok(EXIT_CONFIG);
        }

        let config_content = if self.with_examples {
            Self::generate_config_with_examples()
        } else {
            Self::generate_minimal_config()
        };

        match fs::write(&self.output, config_content) {
            Ok(_) => {
                println!("✅ Configuration file created: {}", self.output);
                println!();
                println!("Next steps:");
                println!("  1. Edit {} with your settings", self.output);
                println!("  2. Point api.base_url at the hospital backend");
                println!("  3. Put HMS_EXPORT_API_TOKEN in a .env file if the API needs a token");
                println!("  4. Validate configuration: hms-export validate-config");
                println!("  5. Run an export: hms-export export --patient-id <ID> --format pdf");
                println!();
                Ok(EXIT_SUCCESS)
            }
            Err(e) => {
                println!("❌ Failed to write configuration file");
                println!("   Error: {e}");
                Ok(EXIT_FATAL)
            }
        }
    }

    /// Generate minimal configuration
    fn generate_minimal_config() -> String {
        r##"# hms-export configuration

[application]
log_level = "info"

[api]
base_url = "http://localhost:3000/api"
# token = "${HMS_EXPORT_API_TOKEN}"
timeout_seconds = 30
page_size = 100

[export]
output_dir = "./exports"
default_format = "csv"
file_name_prefix = "medical-records"
appointments_file_name_prefix = "appointments"
csv_header = "union"

[report]
hospital_name = "Hospital Management System"
max_progress_notes = 5
page_break_threshold_mm = 60.0

[logging]
local_enabled = false
local_path = "./logs"
local_rotation = "daily"
"##
        .to_string()
    }

    /// Generate configuration with examples and comments
    fn generate_config_with_examples() -> String {
        r##"# hms-export configuration
#
# Every value below is the default. Any setting can also be overridden with
# an environment variable named HMS_EXPORT_<SECTION>_<KEY>, for example
# HMS_EXPORT_API_BASE_URL or HMS_EXPORT_REPORT_HOSPITAL_NAME.
# ${VAR} references are replaced from the environment when the file loads.

# ============================================================================
# Application Settings
# ============================================================================
[application]
# Log level (trace, debug, info, warn, error)
log_level = "info"

# ============================================================================
# Records API
# ============================================================================
[api]
# Base URL of the hospital backend REST API
base_url = "http://localhost:3000/api"

# Bearer token (keep it in the environment, not in this file)
# token = "${HMS_EXPORT_API_TOKEN}"

# Request timeout in seconds (1-300). Failed requests are not retried.
timeout_seconds = 30

# Items requested per call (1-1000)
page_size = 100

# ============================================================================
# Export Settings
# ============================================================================
[export]
# Directory exports are written to (created if missing)
output_dir = "./exports"

# Format used when --format is not given: csv, json or pdf
default_format = "csv"

# File names: <prefix>-<patient>-YYYY-MM-DD.csv / .json, <prefix>-<patient>.pdf
file_name_prefix = "medical-records"
appointments_file_name_prefix = "appointments"

# CSV header when rows have different columns:
# - union: every column seen in any row
# - first_row: columns of the first row only
csv_header = "union"

# ============================================================================
# PDF Reports
# ============================================================================
[report]
# Printed in the banner and page footers
hospital_name = "Hospital Management System"

# Progress notes printed per admission; the rest are summarized (0-50)
max_progress_notes = 5

# Free space (mm) a record section needs before it may start on a page (10-200)
page_break_threshold_mm = 60.0

# Banner and heading color as #RRGGBB
# accent_color = "#1E40AF"

# ============================================================================
# Logging
# ============================================================================
[logging]
# Write JSON log files next to console output
local_enabled = false

# Directory for log files
local_path = "./logs"

# Rotation: daily, hourly or never
local_rotation = "daily"
"##
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::load_config;
    use tempfile::TempDir;

    #[test]
    fn test_generated_configs_load() {
        let dir = TempDir::new().unwrap();
        for (name, content) in [
            ("minimal.toml", InitArgs::generate_minimal_config()),
            ("examples.toml", InitArgs::generate_config_with_examples()),
        ] {
            let path = dir.path().join(name);
            fs::write(&path, content).unwrap();
            let config = load_config(&path).unwrap();
            assert_eq!(config.report.max_progress_notes, 5);
            assert_eq!(config.export.csv_header, "union");
        }
    }

    #[tokio::test]
    async fn test_init_refuses_to_overwrite() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("hms-export.toml");
        fs::write(&path, "# existing").unwrap();

        let args = InitArgs {
            output: path.to_string_lossy().to_string(),
            with_examples: false,
            force: false,
        };
        assert_eq!(args.execute().await.unwrap(), EXIT_CONFIG);
        assert_eq!(fs::read_to_string(&path).unwrap(), "# existing");

        let args = InitArgs { force: true, ..args };
        assert_eq!(args.execute().await.unwrap(), EXIT_SUCCESS);
        assert!(fs::read_to_string(&path).unwrap().contains("[report]"));
    }
}
