//! Validate config command implementation
//!
//! This module implements the `validate-config` command for validating
//! the hms-export configuration file.

use super::{EXIT_CONFIG, EXIT_SUCCESS};
use crate::config::{load_config_or_default, resolve_config_path};
use clap::Args;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    pub async fn execute(&self, config_path: Option<&str>) -> anyhow::Result<i32> {
        let (path, required) = resolve_config_path(config_path);
        tracing::info!(config_path = %path.display(), "Validating configuration");

        if !required && !path.exists() {
            println!(
                "🔍 No configuration file at {}, validating built-in defaults",
                path.display()
            );
        } else {
            println!("🔍 Validating configuration file: {}", path.display());
        }
        println!();

        // Loading validates every section
        let config = match load_config_or_default(config_path) {
            Ok(c) => c,
            Err(e) => {
                println!("❌ Configuration validation failed");
                println!("   Error: {e}");
                println!();
                return Ok(EXIT_CONFIG);
            }
        };

        println!("✅ Configuration is valid");
        println!();
        println!("Configuration Summary:");
        println!("  Log Level: {}", config.application.log_level);
        println!("  Records API: {}", config.api.base_url);
        println!(
            "  API Token: {}",
            if config.api.token.is_some() {
                "configured"
            } else {
                "not set"
            }
        );
        println!("  Request Timeout: {}s", config.api.timeout_seconds);
        println!("  Page Size: {}", config.api.page_size);
        println!("  Output Directory: {}", config.export.output_dir);
        println!("  Default Format: {}", config.export.default_format);
        println!("  CSV Header: {}", config.export.csv_header);
        println!("  Hospital Name: {}", config.report.hospital_name);
        println!(
            "  Progress Notes per Admission: {}",
            config.report.max_progress_notes
        );
        println!(
            "  File Logging: {}",
            if config.logging.local_enabled {
                config.logging.local_path.as_str()
            } else {
                "disabled"
            }
        );
        println!();

        Ok(EXIT_SUCCESS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_validate_valid_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("hms-export.toml");
        std::fs::write(&path, "[export]\ndefault_format = \"json\"\n").unwrap();

        let code = ValidateArgs {}
            .execute(Some(path.to_str().unwrap()))
            .await
            .unwrap();
        assert_eq!(code, EXIT_SUCCESS);
    }

    #[tokio::test]
    async fn test_validate_invalid_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("hms-export.toml");
        std::fs::write(&path, "[export]\ndefault_format = \"docx\"\n").unwrap();

        let code = ValidateArgs {}
            .execute(Some(path.to_str().unwrap()))
            .await
            .unwrap();
        assert_eq!(code, EXIT_CONFIG);
    }
}
