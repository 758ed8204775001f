use std::path::PathBuf;
use std::str::FromStr;

use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_log::LogTracer;
use tracing_subscriber::fmt::time::ChronoUtc;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Configuration for the logging system
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Log level for the crate targets (default: WARN)
    pub level: Level,
    /// Whether to use json format for logs (default: false)
    pub json_format: bool,
    /// Path to store log files. If None, logs only go to stderr
    pub log_dir: Option<String>,
    /// Whether to colorize console logs (default: true)
    pub colorize: bool,
    /// Log file name to use if log_dir is specified (default: "pycall-extract")
    pub log_file_name: String,
    /// Targets the level applies to (default: "pycall_extract")
    pub log_targets: Option<Vec<String>>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Level::WARN,
            json_format: false,
            log_dir: None,
            colorize: true,
            log_file_name: "pycall-extract".to_string(),
            log_targets: Some(vec!["pycall_extract".to_string()]),
        }
    }
}

impl LoggingConfig {
    /// Config at `level`, accepting the usual names ("debug", "info", ...)
    pub fn with_level_name(level: &str) -> Self {
        Self {
            level: Level::from_str(level).unwrap_or(Level::WARN),
            ..Self::default()
        }
    }

    /// `EnvFilter` directive string for the configured targets
    fn filter_directives(&self) -> String {
        let level = level_name(self.level);
        match &self.log_targets {
            Some(targets) if !targets.is_empty() => targets
                .iter()
                .map(|target| format!("{}={}", target, level))
                .collect::<Vec<_>>()
                .join(","),
            _ => format!("pycall_extract={}", level),
        }
    }
}

fn level_name(level: Level) -> &'static str {
    match level {
        Level::TRACE => "trace",
        Level::DEBUG => "debug",
        Level::INFO => "info",
        Level::WARN => "warn",
        Level::ERROR => "error",
    }
}

/// Guard that keeps the file appender worker thread alive
///
/// This must be kept in scope for the duration of the program
/// to ensure logs are properly written to files
#[allow(dead_code)]
pub struct LogGuard {
    _file_guard: Option<WorkerGuard>,
}

/// Initialize the logging system with the given configuration
///
/// `RUST_LOG` overrides the configured level when set. Console output goes
/// to stderr so that stdout carries only command output.
///
/// Returns a LogGuard that must be kept alive for the duration of the program
pub fn init_logging(config: LoggingConfig) -> LogGuard {
    // Forward `log` records to tracing; ignore errors to allow repeated initialization
    let _ = LogTracer::init();

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.filter_directives()));

    let mut layers = Vec::new();

    // Standard timestamp format: YYYY-MM-DD HH:MM:SS
    let time_format = "%Y-%m-%d %H:%M:%S".to_string();

    let console_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(config.colorize)
        .with_file(true)
        .with_line_number(true)
        .with_timer(ChronoUtc::new(time_format.clone()));

    let console_layer = if config.json_format {
        console_layer.json().flatten_event(true).boxed()
    } else {
        console_layer.boxed()
    };

    layers.push(console_layer);

    let mut file_guard = None;

    if let Some(log_dir) = &config.log_dir {
        let log_dir = PathBuf::from(log_dir);

        if !log_dir.exists() {
            if let Err(e) = std::fs::create_dir_all(&log_dir) {
                eprintln!("Failed to create log directory: {}", e);
                return LogGuard { _file_guard: None };
            }
        }

        let file_appender =
            RollingFileAppender::new(Rotation::DAILY, log_dir, config.log_file_name.clone());

        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
        file_guard = Some(guard);

        let file_layer = tracing_subscriber::fmt::layer()
            .with_ansi(false)
            .with_file(true)
            .with_line_number(true)
            .with_timer(ChronoUtc::new(time_format))
            .with_writer(non_blocking);

        let file_layer = if config.json_format {
            file_layer.json().flatten_event(true).boxed()
        } else {
            file_layer.boxed()
        };

        layers.push(file_layer);
    }

    // try_init: another subscriber may already be installed
    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(layers)
        .try_init();

    LogGuard {
        _file_guard: file_guard,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_directives() {
        let config = LoggingConfig {
            level: Level::DEBUG,
            log_targets: Some(vec!["pycall_extract".to_string(), "minijinja".to_string()]),
            ..LoggingConfig::default()
        };
        assert_eq!(
            config.filter_directives(),
            "pycall_extract=debug,minijinja=debug"
        );

        let config = LoggingConfig {
            log_targets: None,
            ..LoggingConfig::default()
        };
        assert_eq!(config.filter_directives(), "pycall_extract=warn");
    }

    #[test]
    fn test_level_name_parsing() {
        assert_eq!(LoggingConfig::with_level_name("info").level, Level::INFO);
        assert_eq!(LoggingConfig::with_level_name("TRACE").level, Level::TRACE);
        assert_eq!(LoggingConfig::with_level_name("loud").level, Level::WARN);
    }
}
