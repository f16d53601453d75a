use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use cagent_config::Config;
use cagent_core::EventsManager;
use cagent_forward::{EventsSender, Forwarder, ForwarderConfig, ForwarderError, RemoteClient};
use cagent_kube::{ClusterDiscovery, DiscoveryConfig, DiscoveryError};
use futures::stream::{FuturesUnordered, StreamExt as _};
use tokio::task::JoinError;
use tokio_util::sync::CancellationToken;
use tracing::error;

/// Events dropped on the floor once `EVENTS_QUEUE_CAPACITY` pending events are unread, per
/// `spec.md` §4.1's default `EventsManager` capacity.
const EVENTS_QUEUE_CAPACITY: usize = 10_000;

/// Delay before the whole pipeline is rebuilt and restarted after a recoverable failure,
/// per `spec.md` §4.5.
const RESTART_WAIT_TIME_SECONDS: u64 = 60;

/// `ClusterDiscovery`'s own internal retry interval, used only for its config-error path; the
/// collective restart-all loop it guards against never triggers here since `run_target` already
/// resolves every connection-class error locally (see `cagent_kube::discovery`).
const DISCOVERY_RETRY_INTERVAL_SECONDS: i64 = 30;

/// Failures that escape (2) `ClusterDiscovery` and (3) `Forwarder`, classified the way
/// `spec.md` §7 groups its eight exception categories: everything that looks like a transient
/// connection problem collapses to [`SupervisorError::Recoverable`] and drives a restart of the
/// whole pipeline; anything else is [`SupervisorError::Fatal`] and brings the process down.
#[derive(thiserror::Error, Debug)]
pub enum SupervisorError {
    #[error("recoverable failure, pipeline will restart: {0}")]
    Recoverable(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("unrecoverable failure: {0}")]
    Fatal(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl SupervisorError {
    fn recoverable<E: std::error::Error + Send + Sync + 'static>(error: E) -> Self {
        SupervisorError::Recoverable(Box::new(error))
    }

    fn fatal<E: std::error::Error + Send + Sync + 'static>(error: E) -> Self {
        SupervisorError::Fatal(Box::new(error))
    }
}

/// Owns the restart-on-failure loop described in `spec.md` §4.5: build the pipeline, run it
/// until something fails or `shutdown` fires, classify the failure, and either restart after a
/// backoff or propagate a fatal error up to `main`.
pub async fn run(config: Config, shutdown: CancellationToken) -> Result<(), SupervisorError> {
    loop {
        if shutdown.is_cancelled() {
            return Ok(());
        }

        match run_once(&config, &shutdown).await {
            Ok(()) => return Ok(()),
            Err(SupervisorError::Recoverable(reason)) => {
                error!(error = %reason, "recoverable pipeline failure, restarting in {RESTART_WAIT_TIME_SECONDS}s");

                tokio::select! {
                    biased;
                    () = shutdown.cancelled() => return Ok(()),
                    () = tokio::time::sleep(Duration::from_secs(RESTART_WAIT_TIME_SECONDS)) => {},
                }
            },
            Err(fatal @ SupervisorError::Fatal(_)) => return Err(fatal),
        }
    }
}

/// Builds a fresh `EventsManager`/`RemoteClient`/`EventsSender`/`ClusterDiscovery`/`Forwarder`
/// set, starts discovery and forwarding concurrently, and waits for whichever finishes first
/// (clean shutdown, a recoverable failure, or a fatal one), always tearing the pipeline down
/// before returning.
async fn run_once(config: &Config, shutdown: &CancellationToken) -> Result<(), SupervisorError> {
    let client = cagent_kube::load_client().await.map_err(SupervisorError::recoverable)?;

    let remote = Arc::new(RemoteClient::new(config.token.clone()).map_err(SupervisorError::recoverable)?);

    let events = Arc::new(EventsManager::new(EVENTS_QUEUE_CAPACITY));
    let sender = Arc::new(EventsSender::new(
        Arc::clone(&remote),
        config.collector_url.clone(),
        config.token.clone(),
        config.cluster_name.clone(),
    ));

    let discovery_config = DiscoveryConfig::new(DISCOVERY_RETRY_INTERVAL_SECONDS, config.collect_resources, config.collect_events)
        .map_err(SupervisorError::fatal)?;
    let discovery = ClusterDiscovery::new(client, Arc::clone(&events), discovery_config);

    let forwarder = Forwarder::new(Arc::clone(&events), sender, ForwarderConfig::default());

    let pipeline_cancel = shutdown.child_token();

    let discovery_handles = discovery.start(pipeline_cancel.clone());

    let forwarder_cancel = pipeline_cancel.clone();
    let forwarder_handle = tokio::spawn(async move { forwarder.start(forwarder_cancel).await });

    let result = wait_for_pipeline(discovery_handles, forwarder_handle, shutdown).await;

    pipeline_cancel.cancel();
    events.clean().await;
    remote.close();

    result
}

type Outcome = Result<(), SupervisorError>;
type OutcomeFuture = Pin<Box<dyn Future<Output = Outcome> + Send>>;

/// Awaits discovery's and the forwarder's join handles together, returning as soon as the first
/// one reports a failure (or `shutdown` fires), rather than waiting for every task to finish.
async fn wait_for_pipeline(
    discovery_handles: Vec<tokio::task::JoinHandle<Result<(), DiscoveryError>>>,
    forwarder_handle: tokio::task::JoinHandle<Result<(), ForwarderError>>,
    shutdown: &CancellationToken,
) -> Outcome {
    let mut tasks: FuturesUnordered<OutcomeFuture> = FuturesUnordered::new();

    for handle in discovery_handles {
        tasks.push(Box::pin(async move { classify_discovery(handle.await) }));
    }
    tasks.push(Box::pin(async move { classify_forwarder(forwarder_handle.await) }));

    loop {
        tokio::select! {
            biased;
            () = shutdown.cancelled() => return Ok(()),
            next = tasks.next() => {
                match next {
                    None => return Ok(()),
                    Some(Ok(())) => continue,
                    Some(result @ Err(_)) => return result,
                }
            },
        }
    }
}

/// Anything escaping `ClusterDiscovery` (a target's non-transport failure, or a panic) is
/// category 8 — unexpected and fatal. A clean task cancellation is not an error.
fn classify_discovery(result: Result<Result<(), DiscoveryError>, JoinError>) -> Outcome {
    match result {
        Ok(Ok(())) => Ok(()),
        Ok(Err(error)) => Err(SupervisorError::fatal(error)),
        Err(join_error) if join_error.is_cancelled() => Ok(()),
        Err(join_error) => Err(SupervisorError::fatal(join_error)),
    }
}

/// A promoted worker failure (category 6) is treated the same as a recoverable transport
/// failure: the collector being briefly unreachable shouldn't bring the process down.
fn classify_forwarder(result: Result<Result<(), ForwarderError>, JoinError>) -> Outcome {
    match result {
        Ok(Ok(())) => Ok(()),
        Ok(Err(error)) => Err(SupervisorError::recoverable(error)),
        Err(join_error) if join_error.is_cancelled() => Ok(()),
        Err(join_error) => Err(SupervisorError::fatal(join_error)),
    }
}
