use std::future::Future;
use std::sync::Arc;

use cagent_core::{Event, EventsManager};
use futures::FutureExt as _;
use futures::stream::FuturesUnordered;
use futures::stream::StreamExt as _;
use tokio::task::{JoinError, JoinHandle};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::error::{ForwarderConfig, ForwarderError};

/// Anything a [`Forwarder`] can hand a batch of events to.\
/// [`EventsSender`](crate::EventsSender) is the production implementation; tests substitute a
/// fake to observe batching/concurrency without a network round-trip.
pub trait EventSink: Send + Sync {
    /// Ships `events` as a single unit. Must be cancellation-safe: a cancelled send should
    /// simply stop, not report an error (the caller treats cancellation separately).
    fn send_events(&self, events: Vec<Event>) -> impl Future<Output = Result<(), crate::sender::SenderError>> + Send;
}

/// Reads batches from an [`EventsManager`] and ships them through a bounded pool of [`EventSink`]
/// workers, per `spec.md` §4.3.
pub struct Forwarder<S: EventSink + 'static> {
    events: Arc<EventsManager>,
    sink: Arc<S>,
    config: ForwarderConfig,
}

type Worker = JoinHandle<Result<(), ForwarderError>>;

impl<S: EventSink + 'static> Forwarder<S> {
    pub fn new(events: Arc<EventsManager>, sink: Arc<S>, config: ForwarderConfig) -> Self {
        Self { events, sink, config }
    }

    /// Runs the main loop until `cancel` fires. Returns `Err` the moment a worker's
    /// non-cancellation exception is observed, having already cancelled every other in-flight
    /// worker (failure promotion, per `spec.md` §4.3).
    pub async fn start(&self, cancel: CancellationToken) -> Result<(), ForwarderError> {
        let worker_cancel = cancel.child_token();
        let mut workers: FuturesUnordered<Worker> = FuturesUnordered::new();

        let result = self.run(&cancel, &worker_cancel, &mut workers).await;

        worker_cancel.cancel();
        drain_workers(&mut workers).await;

        result
    }

    async fn run(&self, cancel: &CancellationToken, worker_cancel: &CancellationToken, workers: &mut FuturesUnordered<Worker>) -> Result<(), ForwarderError> {
        loop {
            if cancel.is_cancelled() {
                return Ok(());
            }

            let batch = tokio::select! {
                biased;
                () = cancel.cancelled() => return Ok(()),
                batch = self.events.get_events(self.config.max_events_to_read, Some(self.config.get_events_timeout)) => batch,
            };

            if let Err(error) = reap_finished(workers) {
                return Err(error);
            }

            if batch.is_empty() {
                continue;
            }

            if workers.len() >= self.config.max_workers
                && let Some(finished) = workers.next().await
                && let Err(error) = check_worker(finished)
            {
                return Err(error);
            }

            workers.push(self.spawn_worker(batch, worker_cancel.clone()));
        }
    }

    fn spawn_worker(&self, batch: Vec<Event>, worker_cancel: CancellationToken) -> Worker {
        let sink = Arc::clone(&self.sink);
        tokio::spawn(async move {
            tokio::select! {
                biased;
                () = worker_cancel.cancelled() => Ok(()),
                result = sink.send_events(batch) => result.map_err(ForwarderError::from),
            }
        })
    }
}

/// Non-blockingly drains already-finished workers, promoting the first non-cancellation
/// exception found.
fn reap_finished(workers: &mut FuturesUnordered<Worker>) -> Result<(), ForwarderError> {
    while let Some(Some(finished)) = workers.next().now_or_never() {
        check_worker(finished)?;
    }
    Ok(())
}

fn check_worker(result: Result<Result<(), ForwarderError>, JoinError>) -> Result<(), ForwarderError> {
    match result {
        Ok(inner) => inner,
        Err(join_error) if join_error.is_cancelled() => Ok(()),
        Err(join_error) => Err(ForwarderError::WorkerPanicked(join_error.to_string())),
    }
}

/// Awaits every remaining worker on shutdown, logging (but not promoting) anything but a clean
/// cancellation — by this point `worker_cancel` has already fired, so workers are expected to
/// wind down quickly.
async fn drain_workers(workers: &mut FuturesUnordered<Worker>) {
    while let Some(finished) = workers.next().await {
        match finished {
            Ok(Ok(())) => (),
            Ok(Err(error)) => debug!(%error, "forwarder worker failed during shutdown drain"),
            Err(join_error) if join_error.is_cancelled() => (),
            Err(join_error) => warn!(%join_error, "forwarder worker panicked during shutdown drain"),
        }
    }
}

#[cfg(test)]
#[path = "./forwarder.tests.rs"]
mod forwarder_tests;
