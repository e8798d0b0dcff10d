//! Integration tests for configuration loading and validation
//!
//! Note: Tests that modify environment variables should be run with --test-threads=1
//! to avoid interference between tests.

use hms_export::config::{load_config, load_config_or_default};
use hms_export::core::export::{ExportFormat, HeaderStrategy};
use secrecy::ExposeSecret;
use std::io::Write;
use std::sync::Mutex;
use tempfile::NamedTempFile;

// Mutex to serialize tests that modify environment variables
static ENV_MUTEX: Mutex<()> = Mutex::new(());

/// Helper function to clean up environment variables
fn cleanup_env_vars() {
    std::env::remove_var("HMS_EXPORT_APPLICATION_LOG_LEVEL");
    std::env::remove_var("HMS_EXPORT_API_BASE_URL");
    std::env::remove_var("HMS_EXPORT_API_PAGE_SIZE");
    std::env::remove_var("HMS_EXPORT_EXPORT_DEFAULT_FORMAT");
    std::env::remove_var("HMS_EXPORT_REPORT_HOSPITAL_NAME");
    std::env::remove_var("HMS_EXPORT_LOGGING_LOCAL_ENABLED");
    std::env::remove_var("TEST_HMS_API_TOKEN");
}

fn write_config(content: &str) -> NamedTempFile {
    let mut temp_file = NamedTempFile::new().unwrap();
    temp_file.write_all(content.as_bytes()).unwrap();
    temp_file.flush().unwrap();
    temp_file
}

#[test]
fn test_load_complete_config() {
    let _lock = ENV_MUTEX.lock().unwrap();
    cleanup_env_vars();

    let temp_file = write_config(
        r##"
[application]
log_level = "debug"

[api]
base_url = "https://hms.example.org/api"
token = "static-token"
timeout_seconds = 45
page_size = 250

[export]
output_dir = "/tmp/hms-exports"
default_format = "pdf"
file_name_prefix = "records"
appointments_file_name_prefix = "daily-appointments"
csv_header = "first_row"

[report]
hospital_name = "St. Example General"
max_progress_notes = 3
page_break_threshold_mm = 80.0
accent_color = "#0F766E"

[logging]
local_enabled = true
local_path = "/tmp/hms-logs"
local_rotation = "hourly"
"##,
    );

    let config = load_config(temp_file.path()).expect("Failed to load config");

    assert_eq!(config.application.log_level, "debug");

    assert_eq!(config.api.base_url, "https://hms.example.org/api");
    assert_eq!(
        config.api.token.as_ref().unwrap().expose_secret().as_ref(),
        "static-token"
    );
    assert_eq!(config.api.timeout_seconds, 45);
    assert_eq!(config.api.page_size, 250);

    assert_eq!(config.export.output_dir, "/tmp/hms-exports");
    assert_eq!(config.export.format().unwrap(), ExportFormat::Pdf);
    assert_eq!(config.export.header_strategy().unwrap(), HeaderStrategy::FirstRow);
    assert_eq!(config.export.appointments_file_name_prefix, "daily-appointments");

    assert_eq!(config.report.hospital_name, "St. Example General");
    let options = config.report.to_options().unwrap();
    assert_eq!(options.max_progress_notes, 3);

    assert!(config.logging.local_enabled);
    assert_eq!(config.logging.local_rotation, "hourly");
}

#[test]
fn test_empty_file_uses_defaults() {
    let _lock = ENV_MUTEX.lock().unwrap();
    cleanup_env_vars();

    let temp_file = write_config("");
    let config = load_config(temp_file.path()).expect("Failed to load config");

    assert_eq!(config.application.log_level, "info");
    assert_eq!(config.api.base_url, "http://localhost:3000/api");
    assert!(config.api.token.is_none());
    assert_eq!(config.api.page_size, 100);
    assert_eq!(config.export.default_format, "csv");
    assert_eq!(config.export.csv_header, "union");
    assert_eq!(config.report.max_progress_notes, 5);
    assert!(!config.logging.local_enabled);
}

#[test]
fn test_env_var_substitution() {
    let _lock = ENV_MUTEX.lock().unwrap();
    cleanup_env_vars();
    std::env::set_var("TEST_HMS_API_TOKEN", "secret-from-env");

    let temp_file = write_config(
        r#"
[api]
base_url = "https://hms.example.org/api"
token = "${TEST_HMS_API_TOKEN}"
"#,
    );

    let config = load_config(temp_file.path()).expect("Failed to load config");
    assert_eq!(
        config.api.token.as_ref().unwrap().expose_secret().as_ref(),
        "secret-from-env"
    );

    std::env::remove_var("TEST_HMS_API_TOKEN");
}

#[test]
fn test_env_var_overrides() {
    let _lock = ENV_MUTEX.lock().unwrap();
    cleanup_env_vars();
    std::env::set_var("HMS_EXPORT_APPLICATION_LOG_LEVEL", "trace");
    std::env::set_var("HMS_EXPORT_API_PAGE_SIZE", "500");
    std::env::set_var("HMS_EXPORT_EXPORT_DEFAULT_FORMAT", "json");
    std::env::set_var("HMS_EXPORT_REPORT_HOSPITAL_NAME", "Override Hospital");

    let temp_file = write_config(
        r#"
[application]
log_level = "info"

[api]
page_size = 50

[export]
default_format = "csv"
"#,
    );

    let config = load_config(temp_file.path()).expect("Failed to load config");

    assert_eq!(config.application.log_level, "trace");
    assert_eq!(config.api.page_size, 500);
    assert_eq!(config.export.default_format, "json");
    assert_eq!(config.report.hospital_name, "Override Hospital");

    cleanup_env_vars();
}

#[test]
fn test_invalid_override_is_rejected() {
    let _lock = ENV_MUTEX.lock().unwrap();
    cleanup_env_vars();
    std::env::set_var("HMS_EXPORT_API_PAGE_SIZE", "lots");

    let temp_file = write_config("");
    let result = load_config(temp_file.path());
    assert!(result.is_err());

    cleanup_env_vars();
}

#[test]
fn test_invalid_config_validation() {
    let _lock = ENV_MUTEX.lock().unwrap();
    cleanup_env_vars();

    for content in [
        "[application]\nlog_level = \"invalid_level\"\n",
        "[api]\nbase_url = \"ftp://hms.example.org\"\n",
        "[api]\npage_size = 0\n",
        "[export]\ncsv_header = \"sorted\"\n",
        "[export]\nfile_name_prefix = \"../escape/\"\n",
        "[report]\nmax_progress_notes = 500\n",
        "[report]\naccent_color = \"blue\"\n",
        "[logging]\nlocal_rotation = \"size\"\n",
    ] {
        let temp_file = write_config(content);
        assert!(
            load_config(temp_file.path()).is_err(),
            "expected validation failure for: {content}"
        );
    }
}

#[test]
fn test_missing_explicit_file_is_an_error() {
    let _lock = ENV_MUTEX.lock().unwrap();
    cleanup_env_vars();

    let result = load_config_or_default(Some("/definitely/not/here/hms-export.toml"));
    assert!(result.is_err());
}
