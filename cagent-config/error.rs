/// Possible configuration errors, raised before any Kubernetes client or collector connection
/// is attempted (`spec.md` §7 category 7).
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// `EPSAGON_TOKEN`/`--token` was not provided or was empty.
    #[error("EPSAGON_TOKEN is required")]
    MissingToken,

    /// `EPSAGON_CLUSTER_NAME`/`--cluster-name` was not provided or was empty.
    #[error("EPSAGON_CLUSTER_NAME is required")]
    MissingClusterName,
}
