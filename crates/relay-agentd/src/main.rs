mod cli;

use std::{fs, path::Path, sync::Arc};

use anyhow::Context;
use clap::Parser;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use relay_core::{RelaySession, SessionReport};
use relay_exec::WorkerProcess;
use relay_model::TaskPayload;
use relay_observe::{Journal, logger_init};
use relay_prometheus::PrometheusMetrics;
use relay_report::HttpReporter;

use crate::cli::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // 1) Logger
    logger_init(&cli.logger_config())?;
    info!("logger initialized");

    // 2) Payload for the worker
    let payload = load_payload(&cli.task_details, &cli.dependencies)?;
    info!(
        dependencies = payload.dependencies().len(),
        "task payload assembled"
    );

    // 3) Reporter + session
    let reporter = Arc::new(HttpReporter::new(&cli.reporter_config())?);
    let metrics = Arc::new(PrometheusMetrics::new()?);
    let session_cfg = cli.session_config();
    let session = RelaySession::new(session_cfg.clone(), reporter)?
        .with_subscriber(Arc::new(Journal::new()))
        .with_subscriber(metrics.clone());
    info!(
        session = session.session_id(),
        controller = %cli.controller_url,
        "relay session ready"
    );

    // 4) Ctrl+C
    let shutdown = CancellationToken::new();
    let on_signal = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("shutdown requested");
            on_signal.cancel();
        }
    });

    // 5) Worker, then relay until an outcome is reported
    let (tx, rx) = mpsc::channel(session_cfg.channel_capacity);
    let worker = WorkerProcess::spawn(&cli.worker_config(), &payload, tx).await?;
    info!(pid = ?worker.id(), "worker started");
    let report = session.run(rx, shutdown).await;

    // 6) Stop the worker; the task is over either way
    if let Err(e) = worker.shutdown().await {
        warn!(error = %e, "failed to stop worker");
    }
    finish(&report, &metrics)
}

/// Exit status of the relay: only an undelivered outcome is a failure.
fn finish(report: &SessionReport, metrics: &PrometheusMetrics) -> anyhow::Result<()> {
    match metrics.render() {
        Ok(text) => debug!(metrics = %text, "final metrics"),
        Err(e) => warn!(error = %e, "failed to render metrics"),
    }
    info!(
        outcome = ?report.outcome,
        submitted = report.submitted,
        "relay finished"
    );

    if !report.submitted {
        anyhow::bail!(
            "outcome {:?} was not delivered to the controller",
            report.outcome
        );
    }
    Ok(())
}

fn load_payload(details: &Path, dependencies: &[impl AsRef<Path>]) -> anyhow::Result<TaskPayload> {
    let details = fs::read_to_string(details)
        .with_context(|| format!("reading task details from {}", details.display()))?;
    let dependencies = dependencies
        .iter()
        .map(|path| {
            let path = path.as_ref();
            fs::read_to_string(path)
                .with_context(|| format!("reading dependency from {}", path.display()))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    Ok(TaskPayload::merge(&details, &dependencies)?)
}
