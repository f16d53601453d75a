pub use self::event::{ClusterFact, Event, WatchKind};
pub use self::queue::{EventsManager, QueueError};

mod event;
mod queue;
