//! Global tracing subscriber for the binary
//!
//! Operator messages go to stdout, so every log output here is either
//! stderr or a file under the configured log directory.

use std::fs::File;
use std::path::PathBuf;

use anyhow::{Context, Result};
use lightshow_core::logging::LogConfig;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    filter::EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt, Layer, Registry,
};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Flushes the log file when dropped; hold it until the process exits
pub struct LogGuard {
    _file: Option<WorkerGuard>,
}

/// Install the global subscriber described by `config`
pub fn init(config: &LogConfig) -> Result<LogGuard> {
    let mut layers: Vec<BoxedLayer> = Vec::new();
    let mut file_guard = None;

    if config.console_output {
        layers.push(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_filter(env_filter(config))
                .boxed(),
        );
    }

    if config.file_output {
        let (file, path) = open_log_file(config)?;
        let (writer, guard) = tracing_appender::non_blocking(file);
        layers.push(
            fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_filter(env_filter(config))
                .boxed(),
        );
        file_guard = Some(guard);
        eprintln!("Logging to file: {}", path.display());
    }

    tracing_subscriber::registry()
        .with(layers)
        .try_init()
        .context("Global tracing subscriber already installed")?;

    tracing::info!("Logging initialized at level: {}", config.level);
    Ok(LogGuard { _file: file_guard })
}

/// Configured level, overridden by `RUST_LOG`
fn env_filter(config: &LogConfig) -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(config.parse_level().into())
        .from_env_lossy()
}

/// Prune old logs and create this process's log file
fn open_log_file(config: &LogConfig) -> Result<(File, PathBuf)> {
    config
        .ensure_log_directory()
        .with_context(|| format!("Failed to create log directory {}", config.log_dir.display()))?;

    match config.cleanup_old_logs() {
        Ok(0) => {}
        Ok(removed) => eprintln!("Removed {} old log file(s)", removed),
        Err(e) => eprintln!("Warning: Failed to cleanup old log files: {}", e),
    }

    let path = config.current_log_path();
    let file = File::create(&path)
        .with_context(|| format!("Failed to create log file {}", path.display()))?;
    Ok((file, path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_log_file_prunes_and_creates() {
        let dir = tempfile::tempdir().unwrap();
        let log_dir = dir.path().join("logs");
        let config = LogConfig {
            log_dir: log_dir.clone(),
            max_log_files: 1,
            file_output: true,
            ..Default::default()
        };

        std::fs::create_dir_all(&log_dir).unwrap();
        for stamp in ["2024-01-01", "2024-01-02"] {
            std::fs::write(log_dir.join(format!("lightshow_{}.log", stamp)), "").unwrap();
        }

        let (_file, path) = open_log_file(&config).unwrap();

        assert!(path.starts_with(&log_dir));
        assert!(path.exists());
        assert!(!log_dir.join("lightshow_2024-01-01.log").exists());
        assert!(log_dir.join("lightshow_2024-01-02.log").exists());
    }

    #[test]
    fn test_open_log_file_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let config = LogConfig {
            log_dir: dir.path().join("nested").join("logs"),
            ..Default::default()
        };

        let (_file, path) = open_log_file(&config).unwrap();
        assert!(path.exists());
    }
}
