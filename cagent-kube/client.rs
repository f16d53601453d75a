use kube::{Client, api::ApiResource, discovery::Scope};

/// Possible errors from building the Kubernetes client this agent talks through.
#[derive(thiserror::Error, Debug)]
pub enum ClientError {
    /// Failed to build an in-cluster or kubeconfig-derived client.
    #[error("cannot create kubernetes client: {0}")]
    KubeError(#[from] kube::Error),
}

/// Loads the Kubernetes client this agent uses to talk to its own cluster.\
/// Prefers the in-cluster service-account configuration
/// (`KUBERNETES_SERVICE_HOST`/`KUBERNETES_SERVICE_PORT` + the service-account token and CA
/// mounted at `/var/run/secrets/kubernetes.io/serviceaccount`), falling back to the local
/// kubeconfig so the agent can also run against a cluster from a developer machine.
pub async fn load_client() -> Result<Client, ClientError> {
    Ok(Client::try_default().await?)
}

/// Returns the cluster's apiserver version string, used for the periodic `Cluster` fact event.
pub async fn apiserver_version(client: &Client) -> Result<String, ClientError> {
    Ok(client.apiserver_version().await?.git_version.clone())
}

/// Describes the well-known API coordinates of a fixed watch target, since
/// [`cagent_kube::target::WatchTarget`](crate::target::WatchTarget) never goes through dynamic
/// CRD discovery.
pub fn api_resource_for(group: &str, version: &str, kind: &str, plural: &str) -> ApiResource {
    ApiResource {
        group: group.to_owned(),
        version: version.to_owned(),
        api_version: if group.is_empty() {
            version.to_owned()
        } else {
            format!("{group}/{version}")
        },
        kind: kind.to_owned(),
        plural: plural.to_owned(),
    }
}

/// Scope a given built-in resource is known to live at. The four fixed resources plus the
/// optional `Event` target never need dynamic `ApiCapabilities` discovery since their scope is
/// part of the Kubernetes API contract.
pub fn builtin_scope(cluster_scoped: bool) -> Scope {
    if cluster_scoped { Scope::Cluster } else { Scope::Namespaced }
}
