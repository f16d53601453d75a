use std::path::{Path, PathBuf};
use std::time::Duration;

use tokio::signal::unix::{SignalKind, signal};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::logging::LoggingHandle;

const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(120);
const DEFAULT_DEBUG_FLAG_PATH: &str = "/etc/epsagon/epsagon_debug";

/// Re-derives the effective debug flag on a SIGHUP-equivalent signal or a periodic poll, and
/// pushes it into the log filter via [`LoggingHandle`]. The runtime file always wins over the
/// value baked in at startup from `EPSAGON_DEBUG`, per `spec.md` §6.
pub struct ReloadWatcher {
    logging: LoggingHandle,
    debug_flag_path: PathBuf,
    poll_interval: Duration,
    env_debug: bool,
}

impl ReloadWatcher {
    pub fn new(logging: LoggingHandle, env_debug: bool) -> Self {
        Self {
            logging,
            debug_flag_path: PathBuf::from(DEFAULT_DEBUG_FLAG_PATH),
            poll_interval: DEFAULT_POLL_INTERVAL,
            env_debug,
        }
    }

    /// Applies the resolved debug level once, without spawning the background task. Called at
    /// startup so the file wins immediately, before the first 120s poll.
    pub fn apply_once(&self) {
        self.reload_from_file();
    }

    /// Spawns the background task that watches for SIGHUP and polls
    /// `debug_flag_path` every `poll_interval`.
    pub fn spawn(self, cancel: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(async move { self.run(cancel).await })
    }

    async fn run(self, cancel: CancellationToken) {
        let mut sighup = match signal(SignalKind::hangup()) {
            Ok(signal) => Some(signal),
            Err(error) => {
                warn!(%error, "cannot install SIGHUP handler, falling back to polling only");
                None
            },
        };

        loop {
            let should_reload = match sighup.as_mut() {
                Some(stream) => {
                    tokio::select! {
                        biased;
                        () = cancel.cancelled() => return,
                        _ = stream.recv() => true,
                        () = tokio::time::sleep(self.poll_interval) => true,
                    }
                },
                None => {
                    tokio::select! {
                        biased;
                        () = cancel.cancelled() => return,
                        () = tokio::time::sleep(self.poll_interval) => true,
                    }
                },
            };

            if should_reload {
                self.reload_from_file();
            }
        }
    }

    fn reload_from_file(&self) {
        let debug = read_debug_flag(&self.debug_flag_path).unwrap_or(self.env_debug);
        debug!(debug, "reloaded log verbosity");
        self.logging.set_debug(debug);
    }
}

/// Reads the well-known debug flag file. Returns `None` when the file is absent or unreadable,
/// in which case the caller falls back to the value resolved at startup.
fn read_debug_flag(path: &Path) -> Option<bool> {
    let contents = std::fs::read_to_string(path).ok()?;
    Some(contents.trim().eq_ignore_ascii_case("true"))
}

#[cfg(test)]
#[path = "./reload.tests.rs"]
mod reload_tests;
