//! Tracing setup for a training run.
//!
//! Stdout carries the run report, so log lines always go to stderr. A
//! per-launch log file is only opened when the caller asks for one through
//! [`LogFile`]. Launch files are timestamped and the directory keeps the
//! newest [`MAX_LOG_FILES`].

use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::SystemTime;

use time::{OffsetDateTime, UtcOffset, format_description::FormatItem, macros::format_description};
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::{EnvFilter, Registry, fmt, prelude::*};

use crate::app_dirs::{self, AppDirError};

pub const MAX_LOG_FILES: usize = 10;
const LOG_FILE_PREFIX: &str = "nakchal";
const DEFAULT_FILTER: &str = "info";

/// Set once the global subscriber is installed; holds the file writer guard if any.
static INSTALLED: OnceLock<Option<WorkerGuard>> = OnceLock::new();

#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("Log directory unavailable: {0}")]
    AppDir(#[from] AppDirError),
    #[error("Failed to prepare log directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to create log file at {path}: {source}")]
    CreateFile {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to prune old logs in {path}: {source}")]
    Prune {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to format log file name: {0}")]
    FormatTime(#[from] time::error::Format),
    #[error("Failed to install global tracing subscriber: {0}")]
    SetGlobal(#[from] tracing::subscriber::SetGlobalDefaultError),
}

/// Where, if anywhere, this launch writes a log file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum LogFile {
    #[default]
    Disabled,
    /// `<app root>/logs`
    AppDir,
    Dir(PathBuf),
}

/// Install the global subscriber. Returns the log file path when one was opened.
///
/// File errors are returned before anything is installed, so a caller can
/// retry with [`LogFile::Disabled`]. Calls after a successful install are no-ops.
pub fn init(file: LogFile) -> Result<Option<PathBuf>, LoggingError> {
    if INSTALLED.get().is_some() {
        return Ok(None);
    }
    let launch = match file {
        LogFile::Disabled => None,
        LogFile::AppDir => Some(LaunchLog::open(&app_dirs::logs_dir()?)?),
        LogFile::Dir(dir) => Some(LaunchLog::open(&dir)?),
    };

    let timer = build_timer();
    let console_layer = fmt::layer()
        .with_timer(timer.clone())
        .with_writer(std::io::stderr);
    let (file_layer, guard, path) = match launch {
        Some(LaunchLog {
            path,
            writer,
            guard,
        }) => (
            Some(
                fmt::layer()
                    .with_ansi(false)
                    .with_timer(timer)
                    .with_writer(writer),
            ),
            Some(guard),
            Some(path),
        ),
        None => (None, None, None),
    };

    let subscriber = Registry::default()
        .with(env_filter())
        .with(console_layer)
        .with(file_layer);
    tracing::subscriber::set_global_default(subscriber)?;
    let _ = INSTALLED.set(guard);
    if let Some(path) = &path {
        tracing::debug!("Writing log file {}", path.display());
    }
    Ok(path)
}

struct LaunchLog {
    path: PathBuf,
    writer: NonBlocking,
    guard: WorkerGuard,
}

impl LaunchLog {
    fn open(dir: &Path) -> Result<Self, LoggingError> {
        fs::create_dir_all(dir).map_err(|source| LoggingError::CreateDir {
            path: dir.to_path_buf(),
            source,
        })?;
        let name = log_file_name(now_local_or_utc())?;
        let path = dir.join(&name);
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|source| LoggingError::CreateFile {
                path: path.clone(),
                source,
            })?;
        prune_launch_logs(dir, MAX_LOG_FILES)?;
        let (writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::never(dir, name));
        Ok(Self {
            path,
            writer,
            guard,
        })
    }
}

fn log_file_name(now: OffsetDateTime) -> Result<String, LoggingError> {
    const NAME_FORMAT: &[FormatItem<'_>] =
        format_description!("[year]-[month]-[day]_[hour]-[minute]-[second]");
    Ok(format!("{LOG_FILE_PREFIX}_{}.log", now.format(NAME_FORMAT)?))
}

/// Delete the oldest `nakchal_*.log` files beyond `keep`. Other files are left alone.
fn prune_launch_logs(dir: &Path, keep: usize) -> Result<(), LoggingError> {
    let prune_err = |source| LoggingError::Prune {
        path: dir.to_path_buf(),
        source,
    };
    let mut launches = Vec::new();
    for entry in fs::read_dir(dir).map_err(prune_err)? {
        let path = entry.map_err(prune_err)?.path();
        let is_launch = path
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| name.starts_with(LOG_FILE_PREFIX) && name.ends_with(".log"));
        if is_launch && path.is_file() {
            let modified = fs::metadata(&path)
                .and_then(|meta| meta.modified())
                .unwrap_or(SystemTime::UNIX_EPOCH);
            launches.push((modified, path));
        }
    }
    if launches.len() <= keep {
        return Ok(());
    }
    launches.sort();
    let excess = launches.len() - keep;
    for (_, path) in launches.into_iter().take(excess) {
        fs::remove_file(&path).map_err(prune_err)?;
    }
    Ok(())
}

fn build_timer() -> fmt::time::OffsetTime<time::format_description::BorrowedFormatItem<'static>> {
    const DISPLAY_FORMAT: &[FormatItem<'static>] =
        format_description!("[hour]:[minute]:[second]");
    let offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);
    fmt::time::OffsetTime::new(offset, DISPLAY_FORMAT.into())
}

fn now_local_or_utc() -> OffsetDateTime {
    OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc())
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}
