//! Subscriber setup
//!
//! Console output goes to stderr so it never mixes with the command's own
//! stdout messages. With `logging.local_enabled`, every event is also written
//! as one JSON object per line under `logging.local_path`, rotated per
//! `logging.local_rotation`.
//!
//! ```no_run
//! use hms_export::config::LoggingConfig;
//! use hms_export::logging::init_logging;
//!
//! let _guard = init_logging("info", &LoggingConfig::default()).expect("logging");
//! ```

use crate::config::LoggingConfig;
use crate::domain::{HmsExportError, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer, Registry};

/// File name (prefix, when rotated) of the JSON log
pub const LOG_FILE_NAME: &str = "hms-export.log";

const LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Keeps the JSON writer's worker alive; dropping it flushes pending lines
pub struct LoggingGuard {
    _file: Option<WorkerGuard>,
}

/// Install the global subscriber
///
/// `level` applies to this crate's targets. A set `RUST_LOG` replaces it
/// entirely, but `level` must still be one of trace, debug, info, warn or
/// error.
///
/// # Errors
///
/// Returns a configuration error for an unknown level or rotation, when the
/// log directory cannot be created, or when a subscriber is already set.
pub fn init_logging(level: &str, config: &LoggingConfig) -> Result<LoggingGuard> {
    let filter = level_filter(level)?;

    let mut layers: Vec<BoxedLayer> = vec![console_layer()];
    let file = if config.local_enabled {
        let (layer, guard) = json_file_layer(config)?;
        layers.push(layer);
        Some(guard)
    } else {
        None
    };

    tracing_subscriber::registry()
        .with(layers)
        .with(filter)
        .try_init()
        .map_err(|e| HmsExportError::Configuration(format!("Cannot install logger: {e}")))?;

    tracing::debug!(
        level = %level,
        json_file = config.local_enabled,
        path = %config.local_path,
        "Logging initialized"
    );

    Ok(LoggingGuard { _file: file })
}

fn level_filter(level: &str) -> Result<EnvFilter> {
    let level = level.to_ascii_lowercase();
    if !LEVELS.contains(&level.as_str()) {
        return Err(HmsExportError::Configuration(format!(
            "Invalid log level '{level}'. Must be one of: {}",
            LEVELS.join(", ")
        )));
    }
    Ok(EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("hms_export={level}"))))
}

fn console_layer() -> BoxedLayer {
    fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .boxed()
}

fn rotation(config: &LoggingConfig) -> Result<Rotation> {
    match config.local_rotation.as_str() {
        "daily" => Ok(Rotation::DAILY),
        "hourly" => Ok(Rotation::HOURLY),
        "never" => Ok(Rotation::NEVER),
        other => Err(HmsExportError::Configuration(format!(
            "Invalid logging.local_rotation '{other}'"
        ))),
    }
}

/// JSON lines with the export span's fields; span close events carry timings
fn json_file_layer(config: &LoggingConfig) -> Result<(BoxedLayer, WorkerGuard)> {
    std::fs::create_dir_all(&config.local_path).map_err(|e| {
        HmsExportError::Configuration(format!(
            "Cannot create log directory {}: {e}",
            config.local_path
        ))
    })?;

    let appender = RollingFileAppender::builder()
        .rotation(rotation(config)?)
        .filename_prefix(LOG_FILE_NAME)
        .build(&config.local_path)
        .map_err(|e| {
            HmsExportError::Configuration(format!(
                "Cannot open log file in {}: {e}",
                config.local_path
            ))
        })?;
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(false)
        .with_span_events(FmtSpan::CLOSE)
        .with_writer(writer)
        .boxed();
    Ok((layer, guard))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;
    use tempfile::TempDir;

    fn file_config(dir: &TempDir, rotation: &str) -> LoggingConfig {
        LoggingConfig {
            local_enabled: true,
            local_path: dir.path().join("logs").to_string_lossy().to_string(),
            local_rotation: rotation.to_string(),
        }
    }

    #[test]
    fn test_level_filter_accepts_known_levels_only() {
        for level in ["trace", "DEBUG", "Info", "warn", "error"] {
            assert!(level_filter(level).is_ok(), "{level} should be accepted");
        }
        assert!(level_filter("verbose").is_err());
        assert!(level_filter("").is_err());
    }

    #[test]
    fn test_rotation_follows_config() {
        let dir = TempDir::new().unwrap();
        assert_eq!(rotation(&file_config(&dir, "hourly")).unwrap(), Rotation::HOURLY);
        assert_eq!(rotation(&file_config(&dir, "never")).unwrap(), Rotation::NEVER);
        assert!(rotation(&file_config(&dir, "weekly")).is_err());
    }

    #[test]
    fn test_json_file_layer_writes_export_span_fields() {
        let dir = TempDir::new().unwrap();
        let config = file_config(&dir, "never");

        let (layer, guard) = json_file_layer(&config).unwrap();
        let subscriber = Registry::default().with(layer);
        tracing::subscriber::with_default(subscriber, || {
            let span = tracing::info_span!("export", export_id = "abc-123");
            let _entered = span.enter();
            tracing::warn!(index = 4, "Skipping record");
        });
        drop(guard);

        let log = std::fs::read_to_string(dir.path().join("logs").join(LOG_FILE_NAME)).unwrap();
        let event: Value = log
            .lines()
            .map(|line| serde_json::from_str::<Value>(line).unwrap())
            .find(|v| v["fields"]["message"] == "Skipping record")
            .expect("event line");
        assert_eq!(event["level"], "WARN");
        assert_eq!(event["fields"]["index"], 4);
        assert_eq!(event["span"]["export_id"], "abc-123");
    }

    #[test]
    fn test_unwritable_log_directory_is_config_error() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("logs");
        std::fs::write(&blocker, "not a directory").unwrap();

        let err = json_file_layer(&file_config(&dir, "daily")).err().unwrap();
        assert!(matches!(err, HmsExportError::Configuration(_)));
    }
}
