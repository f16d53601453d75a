use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing_error::ErrorLayer;
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::reload;
use tracing_subscriber::util::SubscriberInitExt;

const MAX_LOG_BYTES: u64 = 10 * 1024 * 1024;

/// Possible errors initializing logging.
#[derive(thiserror::Error, Debug)]
pub enum LoggingError {
    #[error("cannot prepare log directory: {0}")]
    Directory(#[source] io::Error),

    #[error("cannot open log file: {0}")]
    OpenFile(#[source] io::Error),
}

/// A [`Write`] implementation that rotates the underlying file to a single `.1` backup once it
/// would exceed `max_bytes`, matching the 10 MiB x 1 backup policy in `spec.md` §6. Simpler than
/// `tracing_appender`'s time-based rotation, which has no size-bounded mode.
struct SizeRotatingFile {
    path: PathBuf,
    backup_path: PathBuf,
    max_bytes: u64,
    file: File,
    written: u64,
}

impl SizeRotatingFile {
    fn open(path: PathBuf, max_bytes: u64) -> io::Result<Self> {
        let backup_path = {
            let mut backup = path.clone();
            backup.set_extension(match path.extension() {
                Some(ext) => format!("{}.1", ext.to_string_lossy()),
                None => "1".to_owned(),
            });
            backup
        };

        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        let written = file.metadata().map(|metadata| metadata.len()).unwrap_or(0);

        Ok(Self {
            path,
            backup_path,
            max_bytes,
            file,
            written,
        })
    }

    fn rotate(&mut self) -> io::Result<()> {
        let _ = std::fs::remove_file(&self.backup_path);
        std::fs::rename(&self.path, &self.backup_path)?;
        self.file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        self.written = 0;
        Ok(())
    }
}

impl Write for SizeRotatingFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.written.saturating_add(buf.len() as u64) > self.max_bytes {
            self.rotate()?;
        }

        let n = self.file.write(buf)?;
        self.written += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}

/// Handle kept alive by the supervisor: drop order matters (the `WorkerGuard` must outlive every
/// `tracing` call), and the reload `Handle` lets the SIGHUP/file-poll watcher raise or lower
/// verbosity without restarting the process.
pub struct LoggingHandle {
    pub filter_handle: reload::Handle<EnvFilter, tracing_subscriber::Registry>,
    _guard: tracing_appender::non_blocking::WorkerGuard,
}

impl LoggingHandle {
    pub fn set_debug(&self, debug: bool) {
        let directive = level_directive(debug);
        if let Err(error) = self.filter_handle.reload(EnvFilter::new(directive)) {
            tracing::warn!(%error, "failed to reload log filter");
        }
    }
}

/// Initializes structured logging: a non-blocking, size-rotated file appender under
/// `$HOME/.cluster-agent/logs/agent.log`, an `EnvFilter` that starts at `info` (or `debug` when
/// `initial_debug` is set) and can be reloaded at runtime, and `tracing_error`'s span-trace
/// capture for rich error logging in the supervisor's unexpected-exception path.
pub fn initialize(initial_debug: bool) -> Result<LoggingHandle, LoggingError> {
    let log_dir = default_log_dir();
    std::fs::create_dir_all(&log_dir).map_err(LoggingError::Directory)?;

    let writer = SizeRotatingFile::open(log_dir.join("agent.log"), MAX_LOG_BYTES).map_err(LoggingError::OpenFile)?;
    let (non_blocking, guard) = tracing_appender::non_blocking(writer);

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level_directive(initial_debug)));
    let (filter_layer, filter_handle) = reload::Layer::new(env_filter);

    let timer = tracing_subscriber::fmt::time::UtcTime::rfc_3339();
    let fmt_layer = tracing_subscriber::fmt::layer()
        .compact()
        .with_target(true)
        .with_thread_ids(true)
        .with_timer(timer)
        .with_ansi(false)
        .with_writer(non_blocking);

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .with(ErrorLayer::default())
        .init();

    Ok(LoggingHandle {
        filter_handle,
        _guard: guard,
    })
}

fn level_directive(debug: bool) -> String {
    let level = if debug { "debug" } else { "info" };
    format!("none,cluster_agent={level},cagent_kube={level},cagent_forward={level},cagent_core={level}")
}

fn default_log_dir() -> PathBuf {
    match std::env::var_os("HOME") {
        Some(home) => Path::new(&home).join(".cluster-agent").join("logs"),
        None => PathBuf::from("logs"),
    }
}

#[cfg(test)]
#[path = "./logging.tests.rs"]
mod logging_tests;
