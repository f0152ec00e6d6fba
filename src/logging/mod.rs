//! Structured logging for nexus-ifaddr
//!
//! Console output always goes to stderr, leaving stdout for query answers.
//! File logging is opt-in (`NEXUS_IFADDR_LOG_FILE=1`) and writes daily
//! rotated JSON logs under the platform config directory.

pub mod macros;

use std::path::PathBuf;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config;

/// Default filter when `RUST_LOG` is unset. Queries are quiet unless asked.
const DEFAULT_FILTER: &str = "warn";

/// Initialize the logging system
///
/// Returns the log directory when file logging is enabled.
///
/// Set `RUST_LOG` to control the level:
/// - `RUST_LOG=debug` shows pipeline stage cardinalities
/// - `RUST_LOG=trace` for everything
pub fn init_logging() -> Result<Option<PathBuf>, Box<dyn std::error::Error>> {
    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_line_number(true)
        .compact();

    let log_dir = if config::file_logging_enabled() {
        let dir = get_log_directory()?;
        std::fs::create_dir_all(&dir)?;
        Some(dir)
    } else {
        None
    };

    let file_layer = log_dir.as_ref().map(|dir| {
        let file_appender = RollingFileAppender::new(Rotation::DAILY, dir, config::LOG_FILE_NAME);
        fmt::layer()
            .with_writer(file_appender)
            .with_ansi(false)
            .with_target(true)
            .with_line_number(true)
            .with_file(true)
            .json()
    });

    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(DEFAULT_FILTER))?;

    let init_result = tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(file_layer)
        .try_init();

    if let Err(e) = init_result {
        // Tests and embedding applications may have installed a subscriber already.
        if e.to_string().contains("already been set") {
            return Ok(log_dir);
        }
        return Err(Box::new(e));
    }

    if let Some(dir) = &log_dir {
        tracing::debug!("File logging enabled. Log directory: {}", dir.display());
    }

    Ok(log_dir)
}

/// Get log directory path
///
/// Returns: `%LOCALAPPDATA%/nexus-ifaddr/logs` on Windows
///          `~/.config/nexus-ifaddr/logs` on Linux/macOS
fn get_log_directory() -> Result<PathBuf, Box<dyn std::error::Error>> {
    let base_dir = if cfg!(target_os = "windows") {
        dirs::data_local_dir()
            .ok_or("Could not find local data directory")?
            .join("nexus-ifaddr")
    } else {
        dirs::config_dir()
            .ok_or("Could not find config directory")?
            .join("nexus-ifaddr")
    };

    Ok(base_dir.join("logs"))
}

/// Path of today's log file
pub fn get_current_log_file() -> Result<PathBuf, Box<dyn std::error::Error>> {
    let log_dir = get_log_directory()?;
    let today = chrono::Local::now().format("%Y-%m-%d").to_string();
    Ok(log_dir.join(format!("{}.{}", config::LOG_FILE_NAME, today)))
}
