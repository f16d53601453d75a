use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use tokio::sync::{Mutex, Notify, mpsc};

use crate::Event;

/// Possible errors from [`EventsManager`].
#[derive(thiserror::Error, Debug)]
pub enum QueueError {
    /// Queue has been closed and no longer accepts new events.
    #[error("events queue is closed")]
    Closed,
}

/// Thread-safe, bounded FIFO queue of [`Event`]s shared between [`ClusterDiscovery`] producers
/// and the [`Forwarder`] consumer.
///
/// [`ClusterDiscovery`]: https://docs.rs/cagent-kube
/// [`Forwarder`]: https://docs.rs/cagent-forward
pub struct EventsManager {
    sender: mpsc::Sender<Event>,
    receiver: Mutex<mpsc::Receiver<Event>>,
    len: Arc<AtomicUsize>,
    closed: Arc<AtomicBool>,
    closed_notify: Notify,
}

impl EventsManager {
    /// Creates a new [`EventsManager`] bounded to `capacity` pending events.
    pub fn new(capacity: usize) -> Self {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        Self {
            sender,
            receiver: Mutex::new(receiver),
            len: Arc::new(AtomicUsize::new(0)),
            closed: Arc::new(AtomicBool::new(false)),
            closed_notify: Notify::new(),
        }
    }

    /// Enqueues a single event, suspending the caller while the queue is full.\
    /// Returns [`QueueError::Closed`] once [`EventsManager::close`] has been called.
    pub async fn write_event(&self, event: Event) -> Result<(), QueueError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(QueueError::Closed);
        }

        self.sender.send(event).await.map_err(|_| QueueError::Closed)?;
        self.len.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    /// Suspends until a single event is available, or returns `None` once the queue is closed
    /// and drained.
    pub async fn get_event(&self) -> Option<Event> {
        let mut receiver = self.receiver.lock().await;
        loop {
            if self.closed.load(Ordering::Acquire) {
                return self.try_take(&mut receiver);
            }

            tokio::select! {
                biased;
                event = receiver.recv() => return self.account_for(event),
                () = self.closed_notify.notified() => continue,
            }
        }
    }

    /// Reads up to `max_size` events.\
    /// Suspends for the first event (bounded by `timeout`, when given), then drains any
    /// additional already-available events without suspending again. `max_size < 1` returns
    /// an empty batch immediately without waiting.
    pub async fn get_events(&self, max_size: usize, timeout: Option<Duration>) -> Vec<Event> {
        if max_size < 1 {
            return Vec::new();
        }

        let mut receiver = self.receiver.lock().await;
        let Some(first) = self.wait_for_first(&mut receiver, timeout).await else {
            return Vec::new();
        };

        let mut batch = Vec::with_capacity(max_size);
        batch.push(first);

        while batch.len() < max_size {
            match receiver.try_recv() {
                Ok(event) => {
                    self.len.fetch_sub(1, Ordering::Relaxed);
                    batch.push(event);
                },
                Err(_) => break,
            }
        }

        batch
    }

    /// Returns `true` if the queue currently holds no events. This is a relaxed snapshot,
    /// meaningful only as a probe between a blocking read and the following drain.
    pub fn is_empty(&self) -> bool {
        self.len.load(Ordering::Relaxed) == 0
    }

    /// Drops every currently queued event without processing it, used by the supervisor
    /// before restarting the pipeline.
    pub async fn clean(&self) {
        let mut receiver = self.receiver.lock().await;
        while receiver.try_recv().is_ok() {
            self.len.fetch_sub(1, Ordering::Relaxed);
        }
    }

    /// Marks the queue as closed. Pending `write_event` callers receive
    /// [`QueueError::Closed`]; blocked `get_event`/`get_events` callers unblock and drain
    /// whatever is left.
    pub fn close(&self) {
        self.closed.store(true, Ordering::Release);
        self.closed_notify.notify_waiters();
    }

    async fn wait_for_first(&self, receiver: &mut mpsc::Receiver<Event>, timeout: Option<Duration>) -> Option<Event> {
        loop {
            if self.closed.load(Ordering::Acquire) {
                return self.try_take(receiver);
            }

            match timeout {
                Some(duration) => {
                    tokio::select! {
                        biased;
                        event = receiver.recv() => return self.account_for(event),
                        () = self.closed_notify.notified() => continue,
                        () = tokio::time::sleep(duration) => return None,
                    }
                },
                None => {
                    tokio::select! {
                        biased;
                        event = receiver.recv() => return self.account_for(event),
                        () = self.closed_notify.notified() => continue,
                    }
                },
            }
        }
    }

    fn account_for(&self, event: Option<Event>) -> Option<Event> {
        if event.is_some() {
            self.len.fetch_sub(1, Ordering::Relaxed);
        }
        event
    }

    fn try_take(&self, receiver: &mut mpsc::Receiver<Event>) -> Option<Event> {
        let event = receiver.try_recv().ok();
        if event.is_some() {
            self.len.fetch_sub(1, Ordering::Relaxed);
        }
        event
    }
}

#[cfg(test)]
#[path = "./queue.tests.rs"]
mod queue_tests;
