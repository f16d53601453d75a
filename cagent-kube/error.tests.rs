use super::*;

#[test]
fn negative_retry_interval_is_rejected() {
    let result = DiscoveryConfig::new(-1, true, false);
    assert!(matches!(result, Err(DiscoveryError::InvalidRetryInterval)));
}

#[test]
fn zero_retry_interval_is_allowed() {
    let config = DiscoveryConfig::new(0, true, false).unwrap();
    assert_eq!(config.retry_interval, Duration::from_secs(0));
}

#[test]
fn default_matches_spec_defaults() {
    let config = DiscoveryConfig::default();
    assert_eq!(config.retry_interval, Duration::from_secs(30));
    assert!(config.collect_resources);
    assert!(!config.collect_events);
}
