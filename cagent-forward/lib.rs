pub use self::error::{ForwarderConfig, ForwarderConfigError, ForwarderError};
pub use self::forwarder::{EventSink, Forwarder};
pub use self::remote::{RemoteClient, RemoteClientError};
pub use self::sender::{EventsSender, SenderError};

mod error;
mod forwarder;
mod remote;
mod sender;
