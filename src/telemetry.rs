//! Logging setup for binaries and demos.
//!
//! The library itself only emits `tracing` events. Applications call
//! [`init_tracing`] once near process start to install a subscriber; later
//! calls are no-ops. A full-screen terminal host owns stdout and stderr, so
//! such applications should log to a file instead.

use anyhow::Context as _;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, OnceLock, PoisonError};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::{self, writer::BoxMakeWriter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Held for the whole initialisation so concurrent first calls serialise.
static INSTALLED: Mutex<bool> = Mutex::new(false);
/// Keeps the background log writer alive until the process exits.
static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

/// Output encoding for log events.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object per event.
    Json,
}

/// Where log events are written.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum LogTarget {
    /// Standard error.
    #[default]
    Stderr,
    /// Appended to a single file, created if missing.
    File(PathBuf),
    /// One file per day in `directory`, named `<prefix>.<date>`.
    Daily {
        /// Directory holding the log files, created if missing.
        directory: PathBuf,
        /// File name prefix.
        prefix: String,
    },
}

/// Configuration passed to [`init_tracing`].
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Filter used when `RUST_LOG` is unset.
    pub default_filter: String,
    /// Output encoding.
    pub format: LogFormat,
    /// Output destination.
    pub target: LogTarget,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            default_filter: "info".to_string(),
            format: LogFormat::Text,
            target: LogTarget::Stderr,
        }
    }
}

/// Install the global `tracing` subscriber.
///
/// File targets are written by a background thread, so actors never block
/// on log I/O. Returns `true` if this call installed the subscriber, `false`
/// if an earlier call already had.
///
/// # Errors
///
/// Fails if the log file cannot be created or another subscriber was
/// installed by someone else.
pub fn init_tracing(config: &LogConfig) -> anyhow::Result<bool> {
    let mut installed = INSTALLED.lock().unwrap_or_else(PoisonError::into_inner);
    if *installed {
        return Ok(false);
    }

    let (writer, ansi) = match &config.target {
        LogTarget::Stderr => (BoxMakeWriter::new(io::stderr), true),
        LogTarget::File(path) => {
            let file_name = path
                .file_name()
                .and_then(|name| name.to_str())
                .with_context(|| format!("log path has no file name: {}", path.display()))?;
            let directory = match path.parent() {
                Some(parent) if !parent.as_os_str().is_empty() => parent,
                _ => Path::new("."),
            };
            (file_writer(Rotation::NEVER, directory, file_name)?, false)
        }
        LogTarget::Daily { directory, prefix } => {
            (file_writer(Rotation::DAILY, directory, prefix)?, false)
        }
    };

    let layer = match config.format {
        LogFormat::Text => fmt::layer().with_writer(writer).with_ansi(ansi).boxed(),
        LogFormat::Json => fmt::layer().json().with_writer(writer).boxed(),
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.default_filter));

    tracing_subscriber::registry()
        .with(layer)
        .with(filter)
        .try_init()
        .map_err(|e| anyhow::anyhow!("tracing setup failed: {e}"))?;

    *installed = true;
    Ok(true)
}

fn file_writer(rotation: Rotation, directory: &Path, prefix: &str) -> anyhow::Result<BoxMakeWriter> {
    std::fs::create_dir_all(directory)
        .with_context(|| format!("failed to create log directory: {}", directory.display()))?;
    let appender = RollingFileAppender::builder()
        .rotation(rotation)
        .filename_prefix(prefix)
        .build(directory)
        .with_context(|| format!("failed to open log file in {}", directory.display()))?;

    let (writer, guard) = tracing_appender::non_blocking(appender);
    let _ = LOG_GUARD.set(guard);
    Ok(BoxMakeWriter::new(writer))
}
