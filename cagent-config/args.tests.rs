use clap::Parser;

use super::*;

#[test]
fn defaults_match_spec_when_only_required_fields_are_given() {
    let args = Args::parse_from(["cluster-agent", "--token", "tok", "--cluster-name", "demo"]);

    assert_eq!(args.collector_url, "https://collector.epsagon.com/resources/v1");
    assert!(!args.debug);
    assert!(args.collect_resources);
    assert!(!args.collect_events);
}

#[test]
fn token_and_cluster_name_are_optional_at_the_clap_layer() {
    let args = Args::parse_from(["cluster-agent"]);

    assert!(args.token.is_none());
    assert!(args.cluster_name.is_none());
}
