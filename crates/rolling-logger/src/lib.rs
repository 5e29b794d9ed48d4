//! Rolling Logger
//!
//! Installs a `tracing` subscriber that writes to stderr and, optionally, to a
//! size-capped rolling file. `log` records are bridged into the same pipeline.

mod file;

pub use file::RollingFile;

use std::fmt;
use std::io::{self, Write};
use std::path::Path;
use std::sync::{Arc, Mutex, OnceLock};

use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

static LOGGER: OnceLock<Logger> = OnceLock::new();

struct Logger {
    app_name: String,
    file: Option<Arc<Mutex<RollingFile>>>,
}

/// Tuning knobs for the file sink
#[derive(Debug, Clone)]
pub struct LoggerOptions {
    pub max_bytes: u64,
    pub max_backups: usize,
    pub buffer_lines: usize,
    /// Used when `RUST_LOG` is not set
    pub default_filter: String,
}

impl Default for LoggerOptions {
    fn default() -> Self {
        Self {
            max_bytes: 5 * 1024 * 1024,
            max_backups: 3,
            buffer_lines: 200,
            default_filter: "info".to_string(),
        }
    }
}

#[derive(Debug)]
pub enum LoggerError {
    Io(io::Error),
    AlreadyInitialized,
    NotInitialized,
}

impl fmt::Display for LoggerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoggerError::Io(e) => write!(f, "Log file error: {}", e),
            LoggerError::AlreadyInitialized => write!(f, "Logger already initialized"),
            LoggerError::NotInitialized => write!(f, "Logger not initialized"),
        }
    }
}

impl std::error::Error for LoggerError {}

impl From<io::Error> for LoggerError {
    fn from(e: io::Error) -> Self {
        LoggerError::Io(e)
    }
}

/// Local wall-clock timestamps, millisecond precision
struct LocalTime;

impl FormatTime for LocalTime {
    fn format_time(&self, w: &mut Writer<'_>) -> fmt::Result {
        write!(w, "{}", chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f"))
    }
}

#[derive(Clone)]
struct SharedFile(Arc<Mutex<RollingFile>>);

impl Write for SharedFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "log file lock poisoned"))?
            .write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.0
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "log file lock poisoned"))?
            .flush()
    }
}

impl<'a> MakeWriter<'a> for SharedFile {
    type Writer = SharedFile;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Install the global subscriber.
///
/// With `log_dir` set, records also go to `<log_dir>/<app_name>.log`.
pub fn init_logger(
    log_dir: Option<&Path>,
    app_name: &str,
    options: LoggerOptions,
) -> Result<(), LoggerError> {
    if LOGGER.get().is_some() {
        return Err(LoggerError::AlreadyInitialized);
    }

    let file = match log_dir {
        Some(dir) => Some(Arc::new(Mutex::new(RollingFile::open(
            dir.join(format!("{}.log", app_name)),
            options.max_bytes,
            options.max_backups,
            options.buffer_lines,
        )?))),
        None => None,
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&options.default_filter));

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_timer(LocalTime)
        .with_writer(io::stderr);

    let file_layer = file.as_ref().map(|f| {
        tracing_subscriber::fmt::layer()
            .with_ansi(false)
            .with_timer(LocalTime)
            .with_writer(SharedFile(f.clone()))
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .map_err(|_| LoggerError::AlreadyInitialized)?;

    LOGGER
        .set(Logger {
            app_name: app_name.to_string(),
            file,
        })
        .map_err(|_| LoggerError::AlreadyInitialized)
}

pub fn info(msg: &str) -> Result<(), LoggerError> {
    let logger = LOGGER.get().ok_or(LoggerError::NotInitialized)?;
    log::info!(target: logger.app_name.as_str(), "{}", msg);
    Ok(())
}

pub fn error(msg: &str) -> Result<(), LoggerError> {
    let logger = LOGGER.get().ok_or(LoggerError::NotInitialized)?;
    log::error!(target: logger.app_name.as_str(), "{}", msg);
    Ok(())
}

/// Recent lines written to the log file (empty without a file sink)
pub fn recent_lines() -> Vec<String> {
    LOGGER
        .get()
        .and_then(|logger| logger.file.as_ref())
        .and_then(|file| file.lock().ok().map(|f| f.recent()))
        .unwrap_or_default()
}
