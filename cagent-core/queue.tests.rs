use std::time::Duration;

use super::*;
use crate::WatchKind;

fn sample_event(n: u32) -> Event {
    Event::watch(WatchKind::Added, serde_json::json!({ "n": n }))
}

#[tokio::test]
async fn get_events_with_max_size_zero_returns_immediately() {
    let manager = EventsManager::new(16);
    manager.write_event(sample_event(1)).await.unwrap();

    let batch = manager.get_events(0, Some(Duration::from_secs(5))).await;
    assert!(batch.is_empty());
}

#[tokio::test]
async fn get_events_drains_up_to_max_size_without_blocking_twice() {
    let manager = EventsManager::new(16);
    for n in 0..5 {
        manager.write_event(sample_event(n)).await.unwrap();
    }

    let batch = manager.get_events(3, None).await;
    assert_eq!(batch.len(), 3);
    assert!(manager.get_events(10, Some(Duration::from_millis(10))).await.len() == 2);
}

#[tokio::test]
async fn get_events_returns_empty_batch_on_timeout() {
    let manager = EventsManager::new(16);
    let batch = manager.get_events(10, Some(Duration::from_millis(20))).await;
    assert!(batch.is_empty());
}

#[tokio::test]
async fn clean_then_is_empty_is_true() {
    let manager = EventsManager::new(16);
    for n in 0..4 {
        manager.write_event(sample_event(n)).await.unwrap();
    }
    assert!(!manager.is_empty());

    manager.clean().await;
    assert!(manager.is_empty());
}

#[tokio::test]
async fn write_event_after_close_is_rejected() {
    let manager = EventsManager::new(16);
    manager.close();

    let result = manager.write_event(sample_event(0)).await;
    assert!(matches!(result, Err(QueueError::Closed)));
}

#[tokio::test]
async fn get_event_on_closed_empty_queue_returns_none() {
    let manager = EventsManager::new(16);
    manager.close();

    assert!(manager.get_event().await.is_none());
}

#[tokio::test]
async fn get_event_drains_remaining_items_after_close() {
    let manager = EventsManager::new(16);
    manager.write_event(sample_event(1)).await.unwrap();
    manager.close();

    assert!(manager.get_event().await.is_some());
    assert!(manager.get_event().await.is_none());
}
