use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use cagent_core::WatchKind;

use super::*;
use crate::sender::SenderError;

/// A fake [`EventSink`] that records every event it was handed and tracks the peak number of
/// concurrently in-flight sends, without any network I/O.
struct RecordingSink {
    received: tokio::sync::Mutex<Vec<Event>>,
    observed_batch_sizes: tokio::sync::Mutex<Vec<usize>>,
    active: Arc<AtomicUsize>,
    peak_active: Arc<AtomicUsize>,
    work_delay: Duration,
}

impl RecordingSink {
    fn new(work_delay: Duration) -> Self {
        Self {
            received: tokio::sync::Mutex::new(Vec::new()),
            observed_batch_sizes: tokio::sync::Mutex::new(Vec::new()),
            active: Arc::new(AtomicUsize::new(0)),
            peak_active: Arc::new(AtomicUsize::new(0)),
            work_delay,
        }
    }
}

impl EventSink for RecordingSink {
    async fn send_events(&self, events: Vec<Event>) -> Result<(), SenderError> {
        let active = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_active.fetch_max(active, Ordering::SeqCst);

        self.observed_batch_sizes.lock().await.push(events.len());
        tokio::time::sleep(self.work_delay).await;
        self.received.lock().await.extend(events);

        self.active.fetch_sub(1, Ordering::SeqCst);
        Ok(())
    }
}

/// A sink whose first send always fails, to exercise failure promotion.
struct FailingSink;

impl EventSink for FailingSink {
    async fn send_events(&self, _events: Vec<Event>) -> Result<(), SenderError> {
        Err(SenderError::Encode(serde_json::from_str::<()>("not json").unwrap_err()))
    }
}

fn sample_event(n: u32) -> Event {
    Event::watch(WatchKind::Added, serde_json::json!({ "n": n }))
}

#[tokio::test]
async fn forwarder_config_rejects_zero_max_workers() {
    assert!(matches!(
        ForwarderConfig::new(0, 10, Duration::from_secs(1)),
        Err(crate::error::ForwarderConfigError::InvalidMaxWorkers)
    ));
}

#[tokio::test]
async fn forwarder_config_rejects_zero_max_events_to_read() {
    assert!(matches!(
        ForwarderConfig::new(5, 0, Duration::from_secs(1)),
        Err(crate::error::ForwarderConfigError::InvalidMaxEventsToRead)
    ));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn forwarder_ships_every_event_within_the_worker_bound() {
    let events = Arc::new(EventsManager::new(2_000));
    for n in 0..1000u32 {
        events.write_event(sample_event(n)).await.unwrap();
    }

    let sink = Arc::new(RecordingSink::new(Duration::from_millis(5)));
    let config = ForwarderConfig::new(2, 10, Duration::from_millis(50)).unwrap();
    let forwarder = Forwarder::new(Arc::clone(&events), Arc::clone(&sink), config);

    let cancel = CancellationToken::new();
    let cancel_for_run = cancel.clone();
    let handle = tokio::spawn(async move { forwarder.start(cancel_for_run).await });

    for _ in 0..500 {
        if sink.received.lock().await.len() == 1000 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    cancel.cancel();
    handle.await.unwrap().unwrap();

    assert_eq!(sink.received.lock().await.len(), 1000);
    assert!(sink.peak_active.load(Ordering::SeqCst) <= 2);
    assert!(sink.observed_batch_sizes.lock().await.iter().all(|&n| n <= 10));
}

#[tokio::test]
async fn forwarder_promotes_a_worker_failure_to_the_caller() {
    let events = Arc::new(EventsManager::new(16));
    events.write_event(sample_event(1)).await.unwrap();

    let sink = Arc::new(FailingSink);
    let config = ForwarderConfig::new(1, 10, Duration::from_millis(20)).unwrap();
    let forwarder = Forwarder::new(events, sink, config);

    let result = forwarder.start(CancellationToken::new()).await;
    assert!(matches!(result, Err(ForwarderError::Send(_))));
}
