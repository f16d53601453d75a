use std::process::ExitCode;

use cagent_config::{Args, Config};
use clap::Parser;
use tokio::runtime::Builder;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

mod supervisor;

fn main() -> ExitCode {
    let args = Args::parse();

    let config = match Config::from_args(args) {
        Ok(config) => config,
        Err(error) => {
            eprintln!("configuration error: {error}");
            return ExitCode::SUCCESS;
        },
    };

    let logging = match cagent_config::initialize_logging(config.debug) {
        Ok(logging) => logging,
        Err(error) => {
            eprintln!("failed to initialize logging: {error}");
            return ExitCode::FAILURE;
        },
    };

    let runtime = match Builder::new_multi_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(error) => {
            eprintln!("failed to build async runtime: {error}");
            return ExitCode::FAILURE;
        },
    };

    runtime.block_on(run(config, logging))
}

/// Wires the SIGHUP/file-poll reload watcher and the OS shutdown signal handler around
/// [`supervisor::run`], and maps its result to a process exit code per `spec.md` §6.
async fn run(config: Config, logging: cagent_config::LoggingHandle) -> ExitCode {
    info!(cluster_name = %config.cluster_name, token = config.redacted_token(), collector_url = %config.collector_url, "cluster-agent starting");

    let reload_watcher = cagent_config::ReloadWatcher::new(logging, config.debug);
    reload_watcher.apply_once();

    let shutdown = CancellationToken::new();
    let reload_handle = reload_watcher.spawn(shutdown.clone());

    let signal_shutdown = shutdown.clone();
    tokio::spawn(async move {
        wait_for_shutdown_signal().await;
        signal_shutdown.cancel();
    });

    let result = supervisor::run(config, shutdown.clone()).await;

    shutdown.cancel();
    let _ = reload_handle.await;

    match result {
        Ok(()) => {
            info!("cluster-agent stopped");
            ExitCode::SUCCESS
        },
        Err(error) => {
            error!(error = %error, "cluster-agent terminated with an unrecoverable error");
            ExitCode::FAILURE
        },
    }
}

/// Resolves once either `SIGTERM` or `Ctrl-C` is received, so the container runtime's normal
/// stop signal triggers the same graceful shutdown path as a local interactive run.
async fn wait_for_shutdown_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    let ctrl_c = tokio::signal::ctrl_c();

    match signal(SignalKind::terminate()) {
        Ok(mut terminate) => {
            tokio::select! {
                _ = ctrl_c => {},
                _ = terminate.recv() => {},
            }
        },
        Err(error) => {
            tracing::warn!(%error, "cannot install SIGTERM handler, Ctrl-C only");
            let _ = ctrl_c.await;
        },
    }
}
