use serde_json::{Value, json};

/// Lifecycle kind of a single watched resource notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchKind {
    Added,
    Modified,
    Deleted,
}

impl WatchKind {
    /// Returns the lowercase wire representation, matching the canonical `to_dict`.
    fn as_wire_str(self) -> &'static str {
        match self {
            WatchKind::Added => "added",
            WatchKind::Modified => "modified",
            WatchKind::Deleted => "deleted",
        }
    }
}

/// Cluster-level fact emitted once a discovery target has been resolved.
#[derive(Debug, Clone)]
pub struct ClusterFact {
    pub version: String,
}

/// A single unit of work flowing through the [`EventsManager`](crate::EventsManager) queue.
#[derive(Debug, Clone)]
pub enum Event {
    /// Cluster-wide fact, currently just the discovered apiserver version.
    Cluster(ClusterFact),
    /// A single resource add/modify/delete notification from a watch target.
    Watch { kind: WatchKind, object: Value },
}

/// Equality/hashing are structural over the canonical wire form (`spec.md` §3): two events are
/// equal iff their kind, sub-kind, and payload are equal. Hash is derived from the same string,
/// so equal events always land in the same bucket.
impl PartialEq for Event {
    fn eq(&self, other: &Self) -> bool {
        self.to_wire_value() == other.to_wire_value()
    }
}

impl Eq for Event {}

impl std::hash::Hash for Event {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.to_wire_value().to_string().hash(state);
    }
}

impl Event {
    /// Builds a [`ClusterFact`] event.
    pub fn cluster(version: impl Into<String>) -> Self {
        Event::Cluster(ClusterFact { version: version.into() })
    }

    /// Builds a `Watch` event.
    pub fn watch(kind: WatchKind, object: Value) -> Self {
        Event::Watch { kind, object }
    }

    /// Converts the event into its canonical wire representation.\
    /// No `metadata.timestamp` field is added — see `SPEC_FULL.md` §3/§9.
    pub fn to_wire_value(&self) -> Value {
        match self {
            Event::Cluster(fact) => json!({
                "metadata": { "kind": "cluster" },
                "payload": { "version": fact.version },
            }),
            Event::Watch { kind, object } => json!({
                "metadata": { "kind": "watch" },
                "payload": { "type": kind.as_wire_str(), "object": object },
            }),
        }
    }
}

#[cfg(test)]
#[path = "./event.tests.rs"]
mod event_tests;
