use std::sync::Arc;
use std::time::Duration;

use cagent_core::{Event, EventsManager, WatchKind};
use futures::StreamExt;
use kube::Client;
use kube::api::{Api, DynamicObject, ListParams, WatchEvent, WatchParams};
use kube::ResourceExt;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::backoff::ResettableBackoff;
use crate::error::{DiscoveryConfig, DiscoveryError};
use crate::target::WatchTarget;

/// Outcome of the initial `list` step for a single watch target.
enum ListOutcome {
    Seeded(String),
    Cancelled,
    Transport,
    Fatal(kube::Error),
}

/// Outcome of consuming the watch stream for a single watch target until it ends.
enum WatchOutcome {
    /// Stream ended or errored in a way that just needs a reconnect from the last known
    /// resource version (category: transport error mid-stream).
    Resume,
    /// The stream surfaced an explicit `WatchEvent::Error`, requiring a full resync
    /// (category: explicit error event).
    FullResync,
    Cancelled,
    Fatal(kube::Error),
}

/// Discovers and watches the fixed Kubernetes resource kinds this agent reports on.
pub struct ClusterDiscovery {
    client: Client,
    events: Arc<EventsManager>,
    config: DiscoveryConfig,
}

impl ClusterDiscovery {
    pub fn new(client: Client, events: Arc<EventsManager>, config: DiscoveryConfig) -> Self {
        Self { client, events, config }
    }

    /// Spawns one task per active watch target plus the one-shot `Cluster` fact, returning
    /// their join handles so the supervisor can await the first failure.
    pub fn start(&self, cancel: CancellationToken) -> Vec<JoinHandle<Result<(), DiscoveryError>>> {
        let mut handles = Vec::new();

        handles.push(tokio::spawn(emit_cluster_fact(self.client.clone(), Arc::clone(&self.events), cancel.clone())));

        if self.config.collect_resources {
            for target in WatchTarget::fixed() {
                handles.push(tokio::spawn(run_target(
                    target,
                    self.client.clone(),
                    Arc::clone(&self.events),
                    cancel.clone(),
                    self.config.retry_interval,
                )));
            }
        }

        if self.config.collect_events {
            handles.push(tokio::spawn(run_target(
                WatchTarget::Event,
                self.client.clone(),
                Arc::clone(&self.events),
                cancel.clone(),
                self.config.retry_interval,
            )));
        }

        handles
    }
}

/// Best-effort per `spec.md` §4.2 step 1 / §7 category 5: any failure to resolve the apiserver
/// version is logged and swallowed, never aborting startup or the rest of discovery.
async fn emit_cluster_fact(client: Client, events: Arc<EventsManager>, cancel: CancellationToken) -> Result<(), DiscoveryError> {
    if cancel.is_cancelled() {
        return Ok(());
    }

    match client.apiserver_version().await {
        Ok(version) => {
            let _ = events.write_event(Event::cluster(version.git_version)).await;
        },
        Err(error) => {
            debug!(%error, "failed to fetch cluster version, continuing without a Cluster event");
        },
    }

    Ok(())
}

/// Runs the list-then-watch state machine for a single target until cancelled or a fatal
/// (non-transport, non-access) exception occurs.
async fn run_target(
    target: WatchTarget,
    client: Client,
    events: Arc<EventsManager>,
    cancel: CancellationToken,
    retry_interval: Duration,
) -> Result<(), DiscoveryError> {
    let api = target.api(client);
    let mut last_resource_version: Option<String> = None;
    let mut backoff = ResettableBackoff::new(retry_interval);

    loop {
        if cancel.is_cancelled() {
            return Ok(());
        }

        if last_resource_version.is_none() {
            match list_and_seed(target, &api, &events, &cancel).await {
                ListOutcome::Seeded(rv) => {
                    last_resource_version = Some(rv);
                    backoff.reset();
                },
                ListOutcome::Cancelled => return Ok(()),
                ListOutcome::Transport => {
                    wait_backoff(&mut backoff, &cancel).await;
                    continue;
                },
                ListOutcome::Fatal(source) => return Err(DiscoveryError::TargetFailed { target: target.name(), source }),
            }
        }

        let resource_version = last_resource_version.clone().expect("seeded above");
        match watch_from(target, &api, &events, &cancel, &resource_version, &mut last_resource_version).await {
            WatchOutcome::Cancelled => return Ok(()),
            WatchOutcome::Resume => {
                debug!(target = target.name(), "watch stream ended, resuming from last resource version");
            },
            WatchOutcome::FullResync => {
                info!(target = target.name(), "watch reported an error event, forcing a full resync");
                last_resource_version = None;
            },
            WatchOutcome::Fatal(source) => return Err(DiscoveryError::TargetFailed { target: target.name(), source }),
        }
    }
}

async fn list_and_seed(
    target: WatchTarget,
    api: &Api<DynamicObject>,
    events: &EventsManager,
    cancel: &CancellationToken,
) -> ListOutcome {
    let listing = tokio::select! {
        biased;
        () = cancel.cancelled() => return ListOutcome::Cancelled,
        result = api.list(&ListParams::default()) => result,
    };

    match listing {
        Ok(list) => {
            let resource_version = list.metadata.resource_version.clone().unwrap_or_default();
            for mut object in list.items {
                object.types = Some(target.type_meta());
                match emit_added(target, object, events).await {
                    Ok(()) => (),
                    Err(()) => debug!(target = target.name(), "skipped malformed resource from initial list"),
                }
            }
            ListOutcome::Seeded(resource_version)
        },
        Err(error) if is_transport_error(&error) => ListOutcome::Transport,
        Err(error) => ListOutcome::Fatal(error),
    }
}

/// `410 Gone` means the server expired our `resourceVersion`; it surfaces the same way a
/// `WatchEvent::Error` does and demands a full resync rather than a bare resume.
fn is_expired_resource_version(error: &kube::Error) -> bool {
    matches!(error, kube::Error::Api(response) if response.code == 410)
}

/// A stream item that failed to decode into `WatchEvent<DynamicObject>` — the Rust equivalent
/// of the original source's `KubernetesEventException`. Per `spec.md` §4.2 step 4 / §7 category
/// 4, these are skipped with a debug log rather than propagated.
fn is_malformed(error: &kube::Error) -> bool {
    matches!(error, kube::Error::SerdeError(_))
}

async fn watch_from(
    target: WatchTarget,
    api: &Api<DynamicObject>,
    events: &EventsManager,
    cancel: &CancellationToken,
    resource_version: &str,
    last_resource_version: &mut Option<String>,
) -> WatchOutcome {
    let params = WatchParams::default();
    let stream = tokio::select! {
        biased;
        () = cancel.cancelled() => return WatchOutcome::Cancelled,
        result = api.watch(&params, resource_version) => result,
    };

    let mut stream = match stream {
        Ok(stream) => Box::pin(stream),
        Err(error) if is_expired_resource_version(&error) => return WatchOutcome::FullResync,
        Err(error) if is_transport_error(&error) => return WatchOutcome::Resume,
        Err(error) if is_malformed(&error) => return WatchOutcome::Resume,
        Err(error) => return WatchOutcome::Fatal(error),
    };

    loop {
        let next = tokio::select! {
            biased;
            () = cancel.cancelled() => return WatchOutcome::Cancelled,
            item = stream.next() => item,
        };

        let Some(item) = next else {
            return WatchOutcome::Resume;
        };

        match item {
            Ok(WatchEvent::Added(object)) => {
                if let Some(rv) = object.resource_version() {
                    *last_resource_version = Some(rv);
                }
                let _ = emit_added(target, object, events).await;
            },
            Ok(WatchEvent::Modified(object)) => {
                if let Some(rv) = object.resource_version() {
                    *last_resource_version = Some(rv);
                }
                let _ = emit(target, WatchKind::Modified, object, events).await;
            },
            Ok(WatchEvent::Deleted(object)) => {
                if let Some(rv) = object.resource_version() {
                    *last_resource_version = Some(rv);
                }
                let _ = emit(target, WatchKind::Deleted, object, events).await;
            },
            Ok(WatchEvent::Bookmark(bookmark)) => {
                *last_resource_version = Some(bookmark.metadata.resource_version);
            },
            Ok(WatchEvent::Error(status)) => {
                warn!(target = target.name(), "watch stream reported an error event: {status:?}");
                return WatchOutcome::FullResync;
            },
            Err(error) if is_expired_resource_version(&error) => return WatchOutcome::FullResync,
            Err(error) if is_transport_error(&error) => return WatchOutcome::Resume,
            Err(error) if is_malformed(&error) => {
                debug!(target = target.name(), %error, "skipping malformed watch stream item");
                continue;
            },
            Err(error) => return WatchOutcome::Fatal(error),
        }
    }
}

async fn emit_added(target: WatchTarget, object: DynamicObject, events: &EventsManager) -> Result<(), ()> {
    emit(target, WatchKind::Added, object, events).await
}

async fn emit(target: WatchTarget, kind: WatchKind, object: DynamicObject, events: &EventsManager) -> Result<(), ()> {
    let Ok(value) = serde_json::to_value(&object) else {
        debug!(target = target.name(), "skipped resource that could not be serialized");
        return Err(());
    };

    let _ = events.write_event(Event::watch(kind, value)).await;
    Ok(())
}

async fn wait_backoff(backoff: &mut ResettableBackoff, cancel: &CancellationToken) {
    let Some(delay) = backoff.next_backoff() else {
        return;
    };

    tokio::select! {
        biased;
        () = cancel.cancelled() => (),
        () = tokio::time::sleep(delay) => (),
    }
}

fn is_transport_error(error: &kube::Error) -> bool {
    matches!(
        error,
        kube::Error::Service(_) | kube::Error::HyperError(_) | kube::Error::Connection(_)
    )
}

#[cfg(test)]
#[path = "./discovery.tests.rs"]
mod discovery_tests;
