use crate::args::Args;
use crate::error::ConfigError;

/// Validated, process-wide configuration. Built once from [`Args`] at startup and handed to
/// each component as an injected value — nothing downstream reads the environment or `Args`
/// directly, per the "no globals" design note in `spec.md` §9.
#[derive(Debug, Clone)]
pub struct Config {
    pub token: String,
    pub cluster_name: String,
    pub collector_url: String,
    pub debug: bool,
    pub collect_resources: bool,
    pub collect_events: bool,
}

impl Config {
    /// Validates `args`, failing with [`ConfigError`] if a required field is missing or empty.
    pub fn from_args(args: Args) -> Result<Self, ConfigError> {
        let token = non_empty(args.token).ok_or(ConfigError::MissingToken)?;
        let cluster_name = non_empty(args.cluster_name).ok_or(ConfigError::MissingClusterName)?;

        Ok(Self {
            token,
            cluster_name,
            collector_url: args.collector_url,
            debug: args.debug,
            collect_resources: args.collect_resources,
            collect_events: args.collect_events,
        })
    }

    /// Redacts the token for logging the resolved configuration at startup.
    pub fn redacted_token(&self) -> &'static str {
        if self.token.is_empty() { "<empty>" } else { "<redacted>" }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

#[cfg(test)]
#[path = "./config.tests.rs"]
mod config_tests;
