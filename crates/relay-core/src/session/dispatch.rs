use relay_model::{CancelReason, OutcomeKind, TaskMessage};
use tracing::{debug, info, warn};

use super::{RelaySession, SessionOutcome, SessionReport};
use crate::event::{EventKind, RelayEvent};

impl RelaySession {
    /// Classifies one worker line and acts on it.
    ///
    /// Returns a report once the line produced the task outcome.
    pub(super) async fn dispatch(&mut self, raw: &str) -> Option<SessionReport> {
        self.diagnostics.record_message();

        let message = match raw.parse::<TaskMessage>() {
            Ok(message) => message,
            Err(e) => {
                warn!(error = %e, "dropping malformed worker message");
                self.publish(
                    RelayEvent::new(EventKind::MessageRejected, self.session_id())
                        .with_reason(e.to_string()),
                )
                .await;
                return None;
            }
        };
        debug!(kind = message.kind(), "worker message");

        match message {
            TaskMessage::Log(line) => {
                info!(target: "relay.worker", "{line}");
                self.diagnostics.record_log(line);
                self.publish(RelayEvent::new(EventKind::MessageLogged, self.session_id()))
                    .await;
                None
            }
            TaskMessage::TimeoutReset(reason) => {
                info!(%reason, "watchdog reset");
                self.watchdog.reset(reason.clone());
                self.diagnostics.record_reset();
                self.publish(
                    RelayEvent::new(EventKind::WatchdogArmed, self.session_id()).with_reason(reason),
                )
                .await;
                None
            }
            TaskMessage::TimeoutCancel => {
                info!("watchdog cancelled");
                self.watchdog.cancel();
                self.publish(RelayEvent::new(EventKind::WatchdogCancelled, self.session_id()))
                    .await;
                None
            }
            TaskMessage::Done {
                metadata,
                file_names,
            } => {
                self.disarm_for_outcome().await;
                info!(files = file_names.len(), "task done");
                let result = self.reporter.report_done(metadata, file_names).await;
                let submitted = self.delivered(OutcomeKind::Done, result).await;
                Some(SessionReport {
                    outcome: SessionOutcome::Done,
                    submitted,
                })
            }
            TaskMessage::Cancel { metadata, message } => {
                self.disarm_for_outcome().await;
                info!(%message, "task cancelled by worker");
                let result = self
                    .reporter
                    .report_cancel(metadata, CancelReason::new(message))
                    .await;
                let submitted = self.delivered(OutcomeKind::Cancel, result).await;
                Some(SessionReport {
                    outcome: SessionOutcome::Cancelled,
                    submitted,
                })
            }
            TaskMessage::Unhandled { kind, extra, .. } => {
                warn!(%kind, %extra, "unhandled structured message");
                self.publish(
                    RelayEvent::new(EventKind::MessageUnhandled, self.session_id()).with_reason(kind),
                )
                .await;
                None
            }
        }
    }

    /// The watchdog must not outlive a legitimate outcome.
    async fn disarm_for_outcome(&mut self) {
        if self.watchdog.cancel() {
            debug!("watchdog disarmed by outcome");
            self.publish(RelayEvent::new(EventKind::WatchdogCancelled, self.session_id()))
                .await;
        }
    }
}
