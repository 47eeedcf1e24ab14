//! Tracing setup for the CLI: human-readable events on stderr and a copy in
//! one log file per run. Stdout carries only report output.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use thiserror::Error;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::{OffsetDateTime, UtcOffset};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{InitError, RollingFileAppender, Rotation};
use tracing_subscriber::fmt::time::OffsetTime;
use tracing_subscriber::{EnvFilter, Registry, fmt, prelude::*};

/// Log files kept in the directory, counting the one for this run.
const MAX_LOG_FILES: usize = 10;
const LOG_FILE_PREFIX: &str = "suggestor_";
const LOG_FILE_EXT: &str = "log";

const FILE_STAMP: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day]_[hour]-[minute]-[second]");
const EVENT_STAMP: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");

/// Flush guard and path of the active log file; set once per process.
static ACTIVE_LOG: OnceLock<(WorkerGuard, PathBuf)> = OnceLock::new();

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("failed to prepare log directory {path}: {source}")]
    LogDir {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to remove old log file {path}: {source}")]
    Prune {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to format log file timestamp: {0}")]
    Timestamp(#[from] time::error::Format),
    #[error("failed to open log file: {0}")]
    Appender(#[from] InitError),
    #[error("tracing subscriber already installed: {0}")]
    Install(#[from] tracing::subscriber::SetGlobalDefaultError),
}

/// Install the global subscriber, logging to stderr and to a new file in
/// `log_dir`. Returns the file path; later calls return the same path.
pub fn init(log_dir: &Path) -> Result<PathBuf, LoggingError> {
    if let Some((_, path)) = ACTIVE_LOG.get() {
        return Ok(path.clone());
    }

    let (appender, path) = open_log_file(log_dir, now_local_or_utc())?;
    let (file_writer, guard) = tracing_appender::non_blocking(appender);

    let timer = OffsetTime::new(local_offset(), BorrowedFormatItem::Compound(EVENT_STAMP));
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = Registry::default()
        .with(filter)
        .with(
            fmt::layer()
                .with_timer(timer.clone())
                .with_writer(std::io::stderr),
        )
        .with(
            fmt::layer()
                .with_ansi(false)
                .with_timer(timer)
                .with_writer(file_writer),
        );
    tracing::subscriber::set_global_default(subscriber)?;

    let _ = ACTIVE_LOG.set((guard, path.clone()));
    tracing::debug!("Writing log to {}", path.display());
    Ok(path)
}

/// Create `dir`, make room for one more file, and open this run's log.
fn open_log_file(
    dir: &Path,
    now: OffsetDateTime,
) -> Result<(RollingFileAppender, PathBuf), LoggingError> {
    fs::create_dir_all(dir).map_err(|source| LoggingError::LogDir {
        path: dir.to_path_buf(),
        source,
    })?;
    prune_old_logs(dir, MAX_LOG_FILES - 1)?;

    let stem = log_file_stem(now)?;
    let appender = RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(stem.clone())
        .filename_suffix(LOG_FILE_EXT)
        .build(dir)?;
    Ok((appender, dir.join(format!("{stem}.{LOG_FILE_EXT}"))))
}

fn log_file_stem(now: OffsetDateTime) -> Result<String, LoggingError> {
    Ok(format!("{LOG_FILE_PREFIX}{}", now.format(FILE_STAMP)?))
}

/// Remove the oldest of our log files until at most `keep` remain.
/// Timestamped names sort chronologically; other files are left alone.
fn prune_old_logs(dir: &Path, keep: usize) -> Result<usize, LoggingError> {
    let mut logs: Vec<PathBuf> = fs::read_dir(dir)
        .map_err(|source| LoggingError::LogDir {
            path: dir.to_path_buf(),
            source,
        })?
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| is_run_log(path))
        .collect();
    logs.sort();

    let excess = logs.len().saturating_sub(keep);
    for path in logs.drain(..excess) {
        fs::remove_file(&path).map_err(|source| LoggingError::Prune { path, source })?;
    }
    Ok(excess)
}

fn is_run_log(path: &Path) -> bool {
    let Some(name) = path.file_name().and_then(|name| name.to_str()) else {
        return false;
    };
    path.is_file()
        && name.starts_with(LOG_FILE_PREFIX)
        && path.extension().and_then(|ext| ext.to_str()) == Some(LOG_FILE_EXT)
}

fn local_offset() -> UtcOffset {
    UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC)
}

fn now_local_or_utc() -> OffsetDateTime {
    OffsetDateTime::now_utc().to_offset(local_offset())
}
