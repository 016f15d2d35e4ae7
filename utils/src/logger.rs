use slog::o;
use slog::Drain;
use slog::Level;
use slog::LevelFilter;

use std::fs::OpenOptions;
use std::path::PathBuf;

use super::error::Result;
use crate::app_config::{AppConfig, LogConfig};

const CHANNEL_SIZE: usize = 1024;

pub fn setup_logging() -> Result<slog_scope::GlobalLoggerGuard> {
    let guard = slog_scope::set_global_logger(default_root_logger()?);
    slog_stdlog::init()?;

    Ok(guard)
}

pub fn default_root_logger() -> Result<slog::Logger> {
    let log_config = AppConfig::get::<LogConfig>("log").ok();
    let level = log_config
        .as_ref()
        .map(|c| parse_level(&c.level))
        .unwrap_or(Level::Info);

    let file_drain = match log_config.as_ref() {
        Some(config) => default_file_drain(config).unwrap_or(default_discard()?),
        None => default_discard()?,
    };

    let console = log_config.as_ref().map(|c| c.console).unwrap_or(false);
    let term_drain = if console {
        default_term_drain()?
    } else {
        default_discard()?
    };

    let drain = slog::Duplicate(term_drain, file_drain).fuse();
    let drain = LevelFilter::new(drain, level).fuse();

    Ok(slog::Logger::root(drain, o!()))
}

/// Map a `log.level` value onto a slog level; unknown values fall back to info.
pub fn parse_level(level: &str) -> Level {
    match level.trim().to_ascii_lowercase().as_str() {
        "trace" => Level::Trace,
        "debug" => Level::Debug,
        "info" => Level::Info,
        "warn" | "warning" => Level::Warning,
        "error" => Level::Error,
        _ => Level::Info,
    }
}

/// Resolve where the log file lives. An empty `dir` means `logs/` next to
/// the executable, or under the working directory when that is unknown.
pub fn log_file_path(config: &LogConfig) -> Result<PathBuf> {
    let dir = if config.dir.is_empty() {
        let mut exe_dir = std::env::current_exe()?;
        exe_dir.pop();
        if !exe_dir.exists() {
            exe_dir = std::env::current_dir()?;
        }
        exe_dir.join("logs")
    } else {
        PathBuf::from(&config.dir)
    };

    Ok(dir.join(&config.file))
}

fn default_discard() -> Result<slog_async::Async> {
    let drain = slog_async::Async::new(slog::Discard)
        .chan_size(CHANNEL_SIZE)
        .build();

    Ok(drain)
}

// stdout belongs to the status lines printed for the operator
fn default_term_drain() -> Result<slog_async::Async> {
    let plain = slog_term::PlainSyncDecorator::new(std::io::stderr());
    let term = slog_term::FullFormat::new(plain)
        .use_file_location()
        .use_custom_timestamp(slog_term::timestamp_local);

    let drain = slog_async::Async::new(term.build().fuse())
        .chan_size(CHANNEL_SIZE)
        .build();

    Ok(drain)
}

fn default_file_drain(config: &LogConfig) -> Result<slog_async::Async> {
    let log_file = log_file_path(config)?;
    if let Some(parent) = log_file.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file)?;

    let decorator = slog_term::PlainSyncDecorator::new(file);
    let formatter = slog_term::FullFormat::new(decorator)
        .use_file_location()
        .use_custom_timestamp(slog_term::timestamp_local)
        .build()
        .fuse();

    let drain = slog_async::Async::new(formatter)
        .chan_size(CHANNEL_SIZE)
        .build();

    Ok(drain)
}
