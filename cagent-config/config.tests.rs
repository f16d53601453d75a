use super::*;

fn base_args() -> Args {
    Args {
        token: Some("tok".into()),
        cluster_name: Some("demo".into()),
        collector_url: "https://collector.epsagon.com/resources/v1".into(),
        debug: false,
        collect_resources: true,
        collect_events: false,
    }
}

#[test]
fn valid_args_produce_a_config() {
    let config = Config::from_args(base_args()).unwrap();
    assert_eq!(config.token, "tok");
    assert_eq!(config.cluster_name, "demo");
}

#[test]
fn missing_token_is_a_config_error() {
    let mut args = base_args();
    args.token = None;
    assert!(matches!(Config::from_args(args), Err(ConfigError::MissingToken)));
}

#[test]
fn empty_cluster_name_is_treated_as_missing() {
    let mut args = base_args();
    args.cluster_name = Some(String::new());
    assert!(matches!(Config::from_args(args), Err(ConfigError::MissingClusterName)));
}
