//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::HmsExportConfig;
use super::secret::secret_string;
use crate::domain::errors::HmsExportError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};

/// Configuration file used when none is given
pub const DEFAULT_CONFIG_PATH: &str = "hms-export.toml";

/// Environment variable naming the configuration file
pub const CONFIG_PATH_ENV: &str = "HMS_EXPORT_CONFIG";

/// Resolve which configuration file to read
///
/// An explicit path wins, then `HMS_EXPORT_CONFIG`, then
/// [`DEFAULT_CONFIG_PATH`]. The flag tells whether the path was asked for
/// explicitly, in which case a missing file is an error.
pub fn resolve_config_path(explicit: Option<&str>) -> (PathBuf, bool) {
    if let Some(path) = explicit {
        return (PathBuf::from(path), true);
    }
    match std::env::var(CONFIG_PATH_ENV) {
        Ok(path) if !path.trim().is_empty() => (PathBuf::from(path), true),
        _ => (PathBuf::from(DEFAULT_CONFIG_PATH), false),
    }
}

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into HmsExportConfig
/// 4. Applies environment variable overrides (HMS_EXPORT_* prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns an error if:
/// - File cannot be read
/// - TOML parsing fails
/// - A referenced environment variable is not set
/// - Configuration validation fails
///
/// # Examples
///
/// ```no_run
/// use hms_export::config::loader::load_config;
///
/// let config = load_config("hms-export.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<HmsExportConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(HmsExportError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        HmsExportError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    let contents = substitute_env_vars(&contents)?;

    let mut config: HmsExportConfig = toml::from_str(&contents)
        .map_err(|e| HmsExportError::Configuration(format!("Failed to parse TOML: {e}")))?;

    apply_env_overrides(&mut config)?;

    config.validate().map_err(|e| {
        HmsExportError::Configuration(format!("Configuration validation failed: {e}"))
    })?;

    Ok(config)
}

/// Built-in defaults with environment overrides, for runs without a file
pub fn load_default_config() -> Result<HmsExportConfig> {
    let mut config = HmsExportConfig::default();
    apply_env_overrides(&mut config)?;
    config.validate().map_err(|e| {
        HmsExportError::Configuration(format!("Configuration validation failed: {e}"))
    })?;
    Ok(config)
}

/// Load the resolved configuration file, falling back to defaults when the
/// implicit default file does not exist
pub fn load_config_or_default(explicit: Option<&str>) -> Result<HmsExportConfig> {
    let (path, required) = resolve_config_path(explicit);
    if !required && !path.exists() {
        tracing::debug!(path = %path.display(), "No configuration file, using defaults");
        return load_default_config();
    }
    load_config(path)
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// Comment lines are left untouched.
///
/// # Errors
///
/// Returns an error if a referenced environment variable is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
        .map_err(|e| HmsExportError::Other(format!("Invalid substitution pattern: {e}")))?;
    let mut lines = Vec::new();
    let mut missing_vars: Vec<String> = Vec::new();

    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            lines.push(line.to_string());
            continue;
        }

        let mut processed_line = line.to_string();
        for cap in re.captures_iter(line) {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => {
                    let placeholder = format!("${{{var_name}}}");
                    processed_line = processed_line.replace(&placeholder, &value);
                }
                Err(_) => {
                    if !missing_vars.iter().any(|v| v == var_name) {
                        missing_vars.push(var_name.to_string());
                    }
                }
            }
        }
        lines.push(processed_line);
    }

    if !missing_vars.is_empty() {
        return Err(HmsExportError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(lines.join("\n"))
}

fn parse_override<T: std::str::FromStr>(name: &str, value: &str) -> Result<T> {
    value.trim().parse().map_err(|_| {
        HmsExportError::Configuration(format!("Invalid value '{value}' for {name}"))
    })
}

/// Applies environment variable overrides using the HMS_EXPORT_* prefix
///
/// Variables follow the pattern `HMS_EXPORT_<SECTION>_<KEY>`, for example
/// `HMS_EXPORT_API_BASE_URL` or `HMS_EXPORT_REPORT_HOSPITAL_NAME`.
fn apply_env_overrides(config: &mut HmsExportConfig) -> Result<()> {
    let var = |name: &str| std::env::var(name).ok();

    // Application overrides
    if let Some(val) = var("HMS_EXPORT_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }

    // API overrides
    if let Some(val) = var("HMS_EXPORT_API_BASE_URL") {
        config.api.base_url = val;
    }
    if let Some(val) = var("HMS_EXPORT_API_TOKEN") {
        config.api.token = Some(secret_string(val));
    }
    if let Some(val) = var("HMS_EXPORT_API_TIMEOUT_SECONDS") {
        config.api.timeout_seconds = parse_override("HMS_EXPORT_API_TIMEOUT_SECONDS", &val)?;
    }
    if let Some(val) = var("HMS_EXPORT_API_PAGE_SIZE") {
        config.api.page_size = parse_override("HMS_EXPORT_API_PAGE_SIZE", &val)?;
    }

    // Export overrides
    if let Some(val) = var("HMS_EXPORT_EXPORT_OUTPUT_DIR") {
        config.export.output_dir = val;
    }
    if let Some(val) = var("HMS_EXPORT_EXPORT_DEFAULT_FORMAT") {
        config.export.default_format = val;
    }
    if let Some(val) = var("HMS_EXPORT_EXPORT_FILE_NAME_PREFIX") {
        config.export.file_name_prefix = val;
    }
    if let Some(val) = var("HMS_EXPORT_EXPORT_APPOINTMENTS_FILE_NAME_PREFIX") {
        config.export.appointments_file_name_prefix = val;
    }
    if let Some(val) = var("HMS_EXPORT_EXPORT_CSV_HEADER") {
        config.export.csv_header = val;
    }

    // Report overrides
    if let Some(val) = var("HMS_EXPORT_REPORT_HOSPITAL_NAME") {
        config.report.hospital_name = val;
    }
    if let Some(val) = var("HMS_EXPORT_REPORT_MAX_PROGRESS_NOTES") {
        config.report.max_progress_notes =
            parse_override("HMS_EXPORT_REPORT_MAX_PROGRESS_NOTES", &val)?;
    }
    if let Some(val) = var("HMS_EXPORT_REPORT_PAGE_BREAK_THRESHOLD_MM") {
        config.report.page_break_threshold_mm =
            parse_override("HMS_EXPORT_REPORT_PAGE_BREAK_THRESHOLD_MM", &val)?;
    }
    if let Some(val) = var("HMS_EXPORT_REPORT_ACCENT_COLOR") {
        config.report.accent_color = Some(val);
    }

    // Logging overrides
    if let Some(val) = var("HMS_EXPORT_LOGGING_LOCAL_ENABLED") {
        config.logging.local_enabled = val.parse().unwrap_or(false);
    }
    if let Some(val) = var("HMS_EXPORT_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }
    if let Some(val) = var("HMS_EXPORT_LOGGING_LOCAL_ROTATION") {
        config.logging.local_rotation = val;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_substitute_env_vars() {
        std::env::set_var("HMS_LOADER_TEST_VAR", "test_value");
        let input = "token = \"${HMS_LOADER_TEST_VAR}\"";
        let result = substitute_env_vars(input).unwrap();
        assert_eq!(result, "token = \"test_value\"");
        std::env::remove_var("HMS_LOADER_TEST_VAR");
    }

    #[test]
    fn test_substitute_env_vars_missing() {
        std::env::remove_var("HMS_LOADER_MISSING_VAR");
        let input = "token = \"${HMS_LOADER_MISSING_VAR}\"";
        let err = substitute_env_vars(input).unwrap_err();
        assert!(err.to_string().contains("HMS_LOADER_MISSING_VAR"));
    }

    #[test]
    fn test_substitute_env_vars_skips_comments() {
        std::env::remove_var("HMS_LOADER_COMMENTED_VAR");
        let input = "# token = \"${HMS_LOADER_COMMENTED_VAR}\"\nlog_level = \"info\"";
        let result = substitute_env_vars(input).unwrap();
        assert_eq!(result, input);
    }

    #[test]
    fn test_load_config_missing_file() {
        let err = load_config("nonexistent-hms-export.toml").unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn test_load_config_valid() {
        let toml_content = r#"
[application]
log_level = "debug"

[api]
base_url = "https://hms.example.org/api"
timeout_seconds = 10

[export]
output_dir = "/tmp/hms-exports"
default_format = "json"

[report]
hospital_name = "St. Mary Hospital"
max_progress_notes = 3
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(toml_content.as_bytes()).unwrap();
        temp_file.flush().unwrap();

        let config = load_config(temp_file.path()).unwrap();
        assert_eq!(config.application.log_level, "debug");
        assert_eq!(config.api.base_url, "https://hms.example.org/api");
        assert_eq!(config.api.timeout_seconds, 10);
        assert_eq!(config.export.default_format, "json");
        assert_eq!(config.report.hospital_name, "St. Mary Hospital");
        assert_eq!(config.report.max_progress_notes, 3);
        assert_eq!(config.export.csv_header, "union");
    }

    #[test]
    fn test_load_config_invalid_values() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[api]\nbase_url = \"hms.example.org\"\n")
            .unwrap();
        temp_file.flush().unwrap();

        let err = load_config(temp_file.path()).unwrap_err();
        assert!(matches!(err, HmsExportError::Configuration(_)));
        assert!(err.to_string().contains("validation failed"));
    }

    #[test]
    fn test_parse_override() {
        assert_eq!(parse_override::<u64>("X", " 15 ").unwrap(), 15);
        assert!(parse_override::<u64>("X", "fifteen").is_err());
    }
}
