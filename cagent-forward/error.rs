use std::time::Duration;

use crate::sender::SenderError;

/// Invalid [`Forwarder`](crate::Forwarder) configuration, rejected at construction time.
#[derive(thiserror::Error, Debug)]
pub enum ForwarderConfigError {
    /// `max_workers` must be at least 1.
    #[error("max_workers must be at least 1")]
    InvalidMaxWorkers,

    /// `max_events_to_read` must be at least 1.
    #[error("max_events_to_read must be at least 1")]
    InvalidMaxEventsToRead,
}

/// Validated configuration for [`Forwarder`](crate::Forwarder).
#[derive(Debug, Clone)]
pub struct ForwarderConfig {
    pub max_workers: usize,
    pub max_events_to_read: usize,
    pub get_events_timeout: Duration,
}

impl ForwarderConfig {
    pub fn new(max_workers: usize, max_events_to_read: usize, get_events_timeout: Duration) -> Result<Self, ForwarderConfigError> {
        if max_workers < 1 {
            return Err(ForwarderConfigError::InvalidMaxWorkers);
        }

        if max_events_to_read < 1 {
            return Err(ForwarderConfigError::InvalidMaxEventsToRead);
        }

        Ok(Self {
            max_workers,
            max_events_to_read,
            get_events_timeout,
        })
    }
}

impl Default for ForwarderConfig {
    fn default() -> Self {
        Self {
            max_workers: 5,
            max_events_to_read: 100,
            get_events_timeout: Duration::from_secs(1),
        }
    }
}

/// A failure the [`Forwarder`](crate::Forwarder) promotes to the supervisor.\
/// Only a worker's non-cancellation exception reaches this; cancelled workers are drained
/// silently (see `spec.md` §4.3).
#[derive(thiserror::Error, Debug)]
pub enum ForwarderError {
    /// A worker's [`EventSink::send_events`](crate::EventSink::send_events) call failed.
    #[error(transparent)]
    Send(#[from] SenderError),

    /// A worker task panicked rather than returning an error.
    #[error("forwarder worker panicked: {0}")]
    WorkerPanicked(String),
}
