pub use self::client::{ClientError, apiserver_version, load_client};
pub use self::discovery::ClusterDiscovery;
pub use self::error::{DiscoveryConfig, DiscoveryError};
pub use self::target::WatchTarget;

mod backoff;
mod client;
mod discovery;
mod error;
mod target;
