use kube::api::{Api, ApiResource, DynamicObject, TypeMeta};
use kube::discovery::Scope;
use kube::Client;

use crate::client::{api_resource_for, builtin_scope};

/// One of the fixed resource kinds this agent discovers and watches.\
/// This set is deliberately closed: the agent never discovers CRDs dynamically.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchTarget {
    Pod,
    Node,
    Namespace,
    Deployment,
    /// Only watched when `EPSAGON_COLLECT_EVENTS=true`.
    Event,
}

impl WatchTarget {
    /// Returns the four always-on targets, in a stable discovery order.
    pub fn fixed() -> [WatchTarget; 4] {
        [WatchTarget::Pod, WatchTarget::Node, WatchTarget::Namespace, WatchTarget::Deployment]
    }

    /// Short, lowercase name used in log messages.
    pub fn name(self) -> &'static str {
        match self {
            WatchTarget::Pod => "pod",
            WatchTarget::Node => "node",
            WatchTarget::Namespace => "namespace",
            WatchTarget::Deployment => "deployment",
            WatchTarget::Event => "event",
        }
    }

    /// Returns whether this resource kind is cluster-scoped or namespaced.
    pub fn scope(self) -> Scope {
        match self {
            WatchTarget::Pod | WatchTarget::Event => builtin_scope(false),
            WatchTarget::Node | WatchTarget::Namespace => builtin_scope(true),
            WatchTarget::Deployment => builtin_scope(false),
        }
    }

    fn api_resource(self) -> ApiResource {
        match self {
            WatchTarget::Pod => api_resource_for("", "v1", "Pod", "pods"),
            WatchTarget::Node => api_resource_for("", "v1", "Node", "nodes"),
            WatchTarget::Namespace => api_resource_for("", "v1", "Namespace", "namespaces"),
            WatchTarget::Deployment => api_resource_for("apps", "v1", "Deployment", "deployments"),
            WatchTarget::Event => api_resource_for("", "v1", "Event", "events"),
        }
    }

    /// `kind`/`apiVersion` to stamp onto an item returned from the initial `list` call, whose
    /// per-item `TypeMeta` the API server leaves empty — a well-known quirk list responses have
    /// and watch stream items don't. Mirrors the original source's `_set_kind_to_resources`.
    pub fn type_meta(self) -> TypeMeta {
        let resource = self.api_resource();
        TypeMeta {
            api_version: resource.api_version,
            kind: resource.kind,
        }
    }

    /// Builds the dynamic [`Api`] this target is observed through.\
    /// Pod/Deployment/Event are all-namespaces (`Api::all_with`); Node/Namespace are
    /// cluster-scoped already, so `all_with` and `namespaced_with` are equivalent there, but
    /// `all_with` is used uniformly to avoid a namespace-scope branch for a resource that has
    /// none.
    pub fn api(self, client: Client) -> Api<DynamicObject> {
        let resource = self.api_resource();
        match self.scope() {
            Scope::Cluster => Api::all_with(client, &resource),
            Scope::Namespaced => Api::all_with(client, &resource),
        }
    }
}

#[cfg(test)]
#[path = "./target.tests.rs"]
mod target_tests;
