mod dispatch;

use std::sync::Arc;

use relay_model::{CancelReason, OutcomeKind};
use serde_json::Value;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

use crate::{
    config::SessionConfig,
    error::{CoreError, ReportError},
    event::{EventKind, RelayEvent, Subscribe},
    reporter::Reporter,
    system::{Diagnostics, new_session_id},
    watchdog::Watchdog,
};

const WORKER_LOST_REASON: &str = "worker channel closed";
const INTERRUPTED_REASON: &str = "relay interrupted";

/// How a session ended.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionOutcome {
    /// Worker reported success.
    Done,
    /// Worker cancelled the task itself.
    Cancelled,
    /// Watchdog expired; carries the reason sent to the controller.
    TimedOut { reason: String },
    /// Worker channel closed before any outcome.
    WorkerLost,
    /// Relay was asked to stop before any outcome.
    Interrupted,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionReport {
    pub outcome: SessionOutcome,
    /// Whether the controller accepted the outcome report.
    pub submitted: bool,
}

/// Event loop relaying one task's worker messages to the controller.
///
/// The session owns its watchdog and reporter. `run` consumes it and returns after the
/// first (and only) outcome report, so a second report is impossible by construction.
pub struct RelaySession {
    cfg: SessionConfig,
    watchdog: Watchdog,
    reporter: Arc<dyn Reporter>,
    subscribers: Vec<Arc<dyn Subscribe>>,
    diagnostics: Diagnostics,
}

impl RelaySession {
    pub fn new(cfg: SessionConfig, reporter: Arc<dyn Reporter>) -> Result<Self, CoreError> {
        cfg.validate()?;
        Ok(Self {
            watchdog: Watchdog::new(cfg.watchdog_interval()),
            diagnostics: Diagnostics::new(new_session_id()),
            subscribers: Vec::new(),
            reporter,
            cfg,
        })
    }

    pub fn with_subscriber(mut self, subscriber: Arc<dyn Subscribe>) -> Self {
        self.subscribers.push(subscriber);
        self
    }

    #[inline]
    pub fn session_id(&self) -> &str {
        self.diagnostics.session_id()
    }

    /// Drains worker messages until an outcome is reported.
    ///
    /// Messages are handled one at a time, to completion. Watchdog expiry and
    /// `shutdown` are polled on the same loop, ahead of the channel: a line queued
    /// after the deadline cannot re-arm an expired watchdog.
    #[instrument(level = "debug", skip_all, fields(session = %self.session_id()))]
    pub async fn run(
        mut self,
        mut rx: mpsc::Receiver<String>,
        shutdown: CancellationToken,
    ) -> SessionReport {
        info!(reporter = self.reporter.name(), "relay session started");
        loop {
            tokio::select! {
                biased;

                _ = shutdown.cancelled() => {
                    self.publish(RelayEvent::new(EventKind::Interrupted, self.session_id())).await;
                    let submitted = self.fail(INTERRUPTED_REASON).await;
                    return SessionReport { outcome: SessionOutcome::Interrupted, submitted };
                }
                reason = self.watchdog.expired() => {
                    let reason = self.resolve_reason(&reason);
                    self.publish(
                        RelayEvent::new(EventKind::WatchdogExpired, self.session_id()).with_reason(&reason),
                    )
                    .await;
                    let submitted = self.fail(&reason).await;
                    return SessionReport { outcome: SessionOutcome::TimedOut { reason }, submitted };
                }
                msg = rx.recv() => match msg {
                    Some(raw) => {
                        if let Some(report) = self.dispatch(&raw).await {
                            return report;
                        }
                    }
                    None => {
                        warn!("worker channel closed without an outcome");
                        self.publish(RelayEvent::new(EventKind::WorkerLost, self.session_id())).await;
                        let submitted = self.fail(WORKER_LOST_REASON).await;
                        return SessionReport { outcome: SessionOutcome::WorkerLost, submitted };
                    }
                },
            }
        }
    }

    /// Forced failure: cancel report with empty metadata and diagnostics as info.
    async fn fail(&mut self, reason: &str) -> bool {
        self.watchdog.cancel();
        let reason = self.resolve_reason(reason);
        warn!(%reason, "cancelling task");

        let cancel = CancelReason::new(reason).with_info(self.diagnostics.to_info());
        let result = self
            .reporter
            .report_cancel(Value::Array(Vec::new()), cancel)
            .await;
        self.delivered(OutcomeKind::Cancel, result).await
    }

    fn resolve_reason(&self, reason: &str) -> String {
        if reason.is_empty() {
            self.cfg.fallback_reason.clone()
        } else {
            reason.to_string()
        }
    }

    async fn delivered(&self, kind: OutcomeKind, result: Result<(), ReportError>) -> bool {
        match result {
            Ok(()) => {
                info!(outcome = kind.endpoint(), "outcome reported");
                self.publish(
                    RelayEvent::new(EventKind::ReportSubmitted, self.session_id()).with_outcome(kind),
                )
                .await;
                true
            }
            Err(e) => {
                error!(outcome = kind.endpoint(), error = %e, "failed to report outcome");
                self.publish(
                    RelayEvent::new(EventKind::ReportFailed, self.session_id())
                        .with_outcome(kind)
                        .with_reason(e.to_string()),
                )
                .await;
                false
            }
        }
    }

    async fn publish(&self, event: RelayEvent) {
        for subscriber in &self.subscribers {
            debug!(subscriber = subscriber.name(), kind = ?event.kind, "publishing event");
            subscriber.on_event(&event).await;
        }
    }
}
