use std::io::Write as _;
use std::sync::Arc;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use cagent_core::Event;
use flate2::Compression;
use flate2::write::ZlibEncoder;
use serde_json::json;

use crate::forwarder::EventSink;
use crate::remote::{RemoteClient, RemoteClientError};

/// Possible errors from [`EventsSender::send_events`].
#[derive(thiserror::Error, Debug)]
pub enum SenderError {
    /// Encoding the batch (or the envelope around it) to JSON failed.
    #[error("failed to encode batch to JSON: {0}")]
    Encode(#[from] serde_json::Error),

    /// zlib-compressing the encoded batch failed.
    #[error("failed to compress batch: {0}")]
    Compress(#[from] std::io::Error),

    /// Delivering the envelope to the collector failed.
    #[error(transparent)]
    Remote(#[from] RemoteClientError),
}

/// Serializes, compresses and ships a batch of [`Event`]s through a [`RemoteClient`].
pub struct EventsSender {
    remote: Arc<RemoteClient>,
    url: String,
    token: String,
    cluster_name: String,
}

impl EventsSender {
    pub fn new(remote: Arc<RemoteClient>, url: impl Into<String>, token: impl Into<String>, cluster_name: impl Into<String>) -> Self {
        Self {
            remote,
            url: url.into(),
            token: token.into(),
            cluster_name: cluster_name.into(),
        }
    }
}

impl EventSink for EventsSender {
    /// No-op on an empty batch. Otherwise: encode each event via [`Event::to_wire_value`],
    /// zlib-compress the resulting JSON array, base64-encode it, wrap it in the
    /// `{epsagon_token, cluster_name, data}` envelope, and POST it — matching `spec.md` §4.4
    /// step by step.
    async fn send_events(&self, events: Vec<Event>) -> Result<(), SenderError> {
        if events.is_empty() {
            return Ok(());
        }

        let body = build_envelope(&events, &self.token, &self.cluster_name)?;
        self.remote.post(&self.url, body).await?;
        Ok(())
    }
}

/// Builds the wire envelope for a non-empty batch: JSON-encode, zlib-compress, base64-encode,
/// then wrap in `{epsagon_token, cluster_name, data}` and JSON-encode the envelope itself.
/// Split out from [`EventsSender::send_events`] so the codec can be exercised without an HTTP
/// round-trip.
fn build_envelope(events: &[Event], token: &str, cluster_name: &str) -> Result<String, SenderError> {
    let payload: Vec<_> = events.iter().map(Event::to_wire_value).collect();
    let json_bytes = serde_json::to_vec(&payload)?;
    let compressed = compress(&json_bytes)?;
    let data = BASE64.encode(compressed);

    let envelope = json!({
        "epsagon_token": token,
        "cluster_name": cluster_name,
        "data": data,
    });
    Ok(serde_json::to_string(&envelope)?)
}

fn compress(bytes: &[u8]) -> std::io::Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(bytes)?;
    encoder.finish()
}

#[cfg(test)]
#[path = "./sender.tests.rs"]
mod sender_tests;
