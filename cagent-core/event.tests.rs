use std::collections::HashSet;

use super::*;

#[test]
fn cluster_event_has_no_timestamp_field() {
    let event = Event::cluster("v1.31.2");
    let value = event.to_wire_value();

    assert_eq!(value["metadata"]["kind"], "cluster");
    assert_eq!(value["payload"]["version"], "v1.31.2");
    assert!(value["metadata"].get("timestamp").is_none());
    assert!(value.get("timestamp").is_none());
}

#[test]
fn watch_event_uses_lowercase_type() {
    let object = json!({"kind": "Pod", "metadata": {"name": "nginx"}});
    let event = Event::watch(WatchKind::Modified, object.clone());
    let value = event.to_wire_value();

    assert_eq!(value["metadata"]["kind"], "watch");
    assert_eq!(value["payload"]["type"], "modified");
    assert_eq!(value["payload"]["object"], object);
}

#[test]
fn all_watch_kinds_are_lowercase() {
    for (kind, expected) in [
        (WatchKind::Added, "added"),
        (WatchKind::Modified, "modified"),
        (WatchKind::Deleted, "deleted"),
    ] {
        assert_eq!(kind.as_wire_str(), expected);
    }
}

#[test]
fn identical_payloads_are_equal_and_hash_alike() {
    let a = Event::watch(WatchKind::Added, json!({ "a": 1 }));
    let b = Event::watch(WatchKind::Added, json!({ "a": 1 }));
    assert_eq!(a, b);

    let mut set = HashSet::new();
    set.insert(a);
    assert!(set.contains(&b));
}

#[test]
fn same_payload_different_watch_kind_is_unequal() {
    let object = json!({ "a": 1 });
    let added = Event::watch(WatchKind::Added, object.clone());
    let modified = Event::watch(WatchKind::Modified, object);
    assert_ne!(added, modified);
}

/// `spec.md` §8.1 "Sanity": the set of delivered events must set-equal the expected set,
/// irrespective of delivery order.
#[test]
fn delivered_events_are_set_equal_to_the_expected_set() {
    let expected: HashSet<Event> = HashSet::from([
        Event::cluster("v1.18"),
        Event::watch(WatchKind::Added, json!({ "a": 1 })),
        Event::watch(WatchKind::Added, json!({ "b": 2 })),
        Event::watch(WatchKind::Added, json!({ "c": 3 })),
    ]);

    let delivered: HashSet<Event> = HashSet::from([
        Event::watch(WatchKind::Added, json!({ "c": 3 })),
        Event::cluster("v1.18"),
        Event::watch(WatchKind::Added, json!({ "a": 1 })),
        Event::watch(WatchKind::Added, json!({ "b": 2 })),
    ]);

    assert_eq!(expected, delivered);
}
