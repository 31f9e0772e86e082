use crate::models::LogConfig;
use anyhow::{Context, Result, anyhow};
use camino::Utf8PathBuf;
use std::fs;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;
use tracing_subscriber::{
    EnvFilter, Registry, layer::SubscriberExt, reload, util::SubscriberInitExt,
};

/// Keeps logging alive and allows the level to be changed at runtime.
///
/// Dropping the handle flushes and stops the file writer.
pub struct LogHandle {
    _guard: WorkerGuard,
    filter: reload::Handle<EnvFilter, Registry>,
}

impl LogHandle {
    /// Re-initialize the level filter from a directive such as "debug".
    pub fn set_level(&self, level: &str) -> Result<()> {
        let filter = parse_filter(level)?;
        self.filter
            .reload(filter)
            .map_err(|e| anyhow!("Failed to reload log filter: {}", e))?;

        tracing::info!("Log level set to {}", level);
        Ok(())
    }
}

/// Setup logging with a daily rotating file appender and optional console output.
///
/// # Arguments
/// * `config` - Log directory, file prefix, level directive and console switch
///
/// # Returns
/// A handle that must be held for the duration of the program to keep logging active
pub fn setup_logging(config: &LogConfig) -> Result<LogHandle> {
    // Create log directory if it doesn't exist
    let log_path = Utf8PathBuf::from(&config.dir);
    if !log_path.exists() {
        fs::create_dir_all(&log_path)
            .with_context(|| format!("Failed to create log directory: {}", config.dir))?;
    }

    let file_appender = rolling::daily(&config.dir, &config.prefix);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let (filter_layer, filter) = reload::Layer::new(parse_filter(&config.level)?);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false) // No ANSI codes in log files
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true);

    // Also log to console with ANSI colors when asked to
    let console_layer = config
        .console
        .then(|| tracing_subscriber::fmt::layer().with_ansi(true).with_target(false));

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(file_layer)
        .with(console_layer)
        .try_init()
        .context("Failed to install global log subscriber")?;

    tracing::info!(
        "Logging initialized: dir={}, prefix={}, level={}, console={}",
        config.dir,
        config.prefix,
        config.level,
        config.console
    );

    Ok(LogHandle {
        _guard: guard,
        filter,
    })
}

fn parse_filter(level: &str) -> Result<EnvFilter> {
    EnvFilter::try_new(level).with_context(|| format!("Invalid log level: {}", level))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_filter() {
        assert!(parse_filter("debug").is_ok());
        assert!(parse_filter("starrdesk=trace,reqwest=warn").is_ok());
        assert!(parse_filter("starrdesk=loud").is_err());
    }

    #[test]
    #[allow(unused_variables)]
    fn test_setup_logging_creates_directory() {
        let temp_dir = TempDir::new().unwrap();
        let log_dir = temp_dir.path().join("logs");
        let config = LogConfig {
            dir: log_dir.to_str().unwrap().to_string(),
            ..LogConfig::default()
        };

        // Installing the global subscriber can only succeed once per process,
        // but the directory must exist either way
        let result = setup_logging(&config);

        assert!(log_dir.exists());
    }
}
