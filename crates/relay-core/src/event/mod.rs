use async_trait::async_trait;
use relay_model::OutcomeKind;

/// What happened inside a relay session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventKind {
    // worker
    MessageLogged,
    MessageRejected,
    MessageUnhandled,
    WorkerLost,

    // watchdog
    WatchdogArmed,
    WatchdogCancelled,
    WatchdogExpired,

    // report
    ReportSubmitted,
    ReportFailed,

    // shutdown
    Interrupted,
}

impl EventKind {
    /// Stable label, suitable for metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            EventKind::MessageLogged => "message_logged",
            EventKind::MessageRejected => "message_rejected",
            EventKind::MessageUnhandled => "message_unhandled",
            EventKind::WorkerLost => "worker_lost",
            EventKind::WatchdogArmed => "watchdog_armed",
            EventKind::WatchdogCancelled => "watchdog_cancelled",
            EventKind::WatchdogExpired => "watchdog_expired",
            EventKind::ReportSubmitted => "report_submitted",
            EventKind::ReportFailed => "report_failed",
            EventKind::Interrupted => "interrupted",
        }
    }
}

#[derive(Clone, Debug)]
pub struct RelayEvent {
    pub kind: EventKind,
    pub session: String,
    pub reason: Option<String>,
    pub outcome: Option<OutcomeKind>,
}

impl RelayEvent {
    pub fn new(kind: EventKind, session: impl Into<String>) -> Self {
        Self {
            kind,
            session: session.into(),
            reason: None,
            outcome: None,
        }
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    pub fn with_outcome(mut self, outcome: OutcomeKind) -> Self {
        self.outcome = Some(outcome);
        self
    }
}

/// Receives every event a session publishes, in order.
///
/// Handlers run inline on the session loop and should return quickly.
#[async_trait]
pub trait Subscribe: Send + Sync + 'static {
    async fn on_event(&self, event: &RelayEvent);

    fn name(&self) -> &'static str;
}
