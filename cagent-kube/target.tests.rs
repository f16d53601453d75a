use kube::discovery::Scope;

use super::*;

#[test]
fn fixed_targets_are_the_four_spec_kinds() {
    let names: Vec<&str> = WatchTarget::fixed().iter().map(|t| t.name()).collect();
    assert_eq!(names, vec!["pod", "node", "namespace", "deployment"]);
}

#[test]
fn event_target_is_not_part_of_the_fixed_set() {
    assert!(!WatchTarget::fixed().contains(&WatchTarget::Event));
}

#[test]
fn namespace_and_node_are_cluster_scoped() {
    assert_eq!(WatchTarget::Node.scope(), Scope::Cluster);
    assert_eq!(WatchTarget::Namespace.scope(), Scope::Cluster);
    assert_eq!(WatchTarget::Pod.scope(), Scope::Namespaced);
    assert_eq!(WatchTarget::Deployment.scope(), Scope::Namespaced);
}

#[test]
fn type_meta_matches_the_kind_and_group_version() {
    let pod = WatchTarget::Pod.type_meta();
    assert_eq!(pod.kind, "Pod");
    assert_eq!(pod.api_version, "v1");

    let deployment = WatchTarget::Deployment.type_meta();
    assert_eq!(deployment.kind, "Deployment");
    assert_eq!(deployment.api_version, "apps/v1");
}
