use cagent_core::EventsManager;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use kube::api::DynamicObject;

use super::*;

fn transport_error() -> kube::Error {
    kube::Error::Connection(std::io::Error::other("connection reset"))
}

fn expired_error() -> kube::Error {
    kube::Error::Api(kube::error::ErrorResponse {
        status: "Failure".into(),
        message: "too old resource version".into(),
        reason: "Expired".into(),
        code: 410,
    })
}

fn forbidden_error() -> kube::Error {
    kube::Error::Api(kube::error::ErrorResponse {
        status: "Failure".into(),
        message: "forbidden".into(),
        reason: "Forbidden".into(),
        code: 403,
    })
}

fn malformed_error() -> kube::Error {
    kube::Error::SerdeError(serde_json::from_str::<()>("not json").unwrap_err())
}

#[test]
fn transport_errors_are_classified_as_resumable() {
    assert!(is_transport_error(&transport_error()));
    assert!(!is_expired_resource_version(&transport_error()));
    assert!(!is_malformed(&transport_error()));
}

#[test]
fn gone_status_is_classified_as_expired() {
    assert!(is_expired_resource_version(&expired_error()));
    assert!(!is_transport_error(&expired_error()));
    assert!(!is_malformed(&expired_error()));
}

#[test]
fn forbidden_is_neither_transport_nor_expired_nor_malformed() {
    assert!(!is_transport_error(&forbidden_error()));
    assert!(!is_expired_resource_version(&forbidden_error()));
    assert!(!is_malformed(&forbidden_error()));
}

#[test]
fn decode_failures_are_classified_as_malformed() {
    assert!(is_malformed(&malformed_error()));
    assert!(!is_transport_error(&malformed_error()));
    assert!(!is_expired_resource_version(&malformed_error()));
}

#[tokio::test]
async fn emit_writes_a_watch_event_for_a_well_formed_object() {
    let events = EventsManager::new(8);
    let object = DynamicObject {
        types: None,
        metadata: ObjectMeta {
            name: Some("nginx".into()),
            ..Default::default()
        },
        data: serde_json::Value::Null,
    };

    let result = emit(WatchTarget::Pod, WatchKind::Added, object, &events).await;
    assert!(result.is_ok());
    assert!(!events.is_empty());
}

/// `spec.md` §4.2 step 1: initial-list items must carry the resource kind, since the API server
/// leaves per-item `TypeMeta` empty in list responses.
#[tokio::test]
async fn list_items_are_tagged_with_the_target_kind_before_emit() {
    let events = EventsManager::new(8);
    let mut object = DynamicObject {
        types: None,
        metadata: ObjectMeta {
            name: Some("nginx".into()),
            ..Default::default()
        },
        data: serde_json::Value::Null,
    };
    object.types = Some(WatchTarget::Pod.type_meta());

    emit_added(WatchTarget::Pod, object, &events).await.unwrap();

    let event = events.get_event().await.expect("event was written");
    let wire = event.to_wire_value();
    assert_eq!(wire["payload"]["object"]["kind"], "Pod");
    assert_eq!(wire["payload"]["object"]["apiVersion"], "v1");
}
