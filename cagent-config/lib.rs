pub use self::args::Args;
pub use self::config::Config;
pub use self::error::ConfigError;
pub use self::logging::{LoggingError, LoggingHandle, initialize as initialize_logging};
pub use self::reload::ReloadWatcher;

mod args;
mod config;
mod error;
mod logging;
mod reload;
