use clap::Parser;

/// cluster-agent watches a Kubernetes control plane and forwards a normalized event stream to
/// a remote collector.
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Bearer token used as the HTTP Basic auth username against the collector.
    #[arg(long, env = "EPSAGON_TOKEN")]
    pub token: Option<String>,

    /// Label attached to every envelope sent to the collector.
    #[arg(long, env = "EPSAGON_CLUSTER_NAME")]
    pub cluster_name: Option<String>,

    /// POST target for batched event envelopes.
    #[arg(long, env = "EPSAGON_COLLECTOR_URL", default_value = "https://collector.epsagon.com/resources/v1")]
    pub collector_url: String,

    /// Enable DEBUG-level logging. `/etc/epsagon/epsagon_debug` overrides this at runtime.
    #[arg(long, env = "EPSAGON_DEBUG", default_value_t = false)]
    pub debug: bool,

    /// Enable list+watch of the fixed Pod/Node/Namespace/Deployment resource kinds.
    #[arg(long, env = "EPSAGON_COLLECT_RESOURCES", default_value_t = true)]
    pub collect_resources: bool,

    /// Additionally watch Kubernetes `Event` objects.
    #[arg(long, env = "EPSAGON_COLLECT_EVENTS", default_value_t = false)]
    pub collect_events: bool,
}

#[cfg(test)]
#[path = "./args.tests.rs"]
mod args_tests;
