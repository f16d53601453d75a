use std::io::Read as _;

use cagent_core::WatchKind;
use flate2::read::ZlibDecoder;

use super::*;

#[test]
fn envelope_round_trips_in_enqueue_order() {
    let events = vec![
        Event::watch(WatchKind::Added, serde_json::json!({ "n": 1 })),
        Event::watch(WatchKind::Modified, serde_json::json!({ "n": 2 })),
        Event::watch(WatchKind::Deleted, serde_json::json!({ "n": 3 })),
    ];

    let body = build_envelope(&events, "tok", "my-cluster").unwrap();
    let envelope: serde_json::Value = serde_json::from_str(&body).unwrap();

    assert_eq!(envelope["epsagon_token"], "tok");
    assert_eq!(envelope["cluster_name"], "my-cluster");

    let compressed = BASE64.decode(envelope["data"].as_str().unwrap()).unwrap();
    let mut decoder = ZlibDecoder::new(compressed.as_slice());
    let mut json_bytes = Vec::new();
    decoder.read_to_end(&mut json_bytes).unwrap();

    let decoded: Vec<serde_json::Value> = serde_json::from_slice(&json_bytes).unwrap();
    let expected: Vec<serde_json::Value> = events.iter().map(Event::to_wire_value).collect();
    assert_eq!(decoded, expected);
}

#[tokio::test]
async fn send_events_is_a_no_op_on_an_empty_batch() {
    let remote = Arc::new(RemoteClient::new("tok").unwrap());
    let sender = EventsSender::new(remote, "http://127.0.0.1:9/unreachable", "tok", "my-cluster");

    let result = sender.send_events(Vec::new()).await;
    assert!(result.is_ok());
}
