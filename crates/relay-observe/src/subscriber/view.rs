use std::borrow::Borrow;

use relay_core::{EventKind, RelayEvent};
use tracing::{debug, error, info, trace, warn};

pub trait View {
    fn as_session(&self) -> &str;
    fn as_reason(&self) -> &str;
    fn as_outcome(&self) -> &str;
    fn kind(&self) -> EventKind;
    fn has_reason(&self) -> bool;
}

impl<T> View for T
where
    T: Borrow<RelayEvent>,
{
    #[inline]
    fn as_session(&self) -> &str {
        &self.borrow().session
    }
    #[inline]
    fn as_reason(&self) -> &str {
        self.borrow().reason.as_deref().unwrap_or("unknown")
    }
    #[inline]
    fn as_outcome(&self) -> &str {
        self.borrow()
            .outcome
            .map(|kind| kind.endpoint())
            .unwrap_or("unknown")
    }
    #[inline]
    fn kind(&self) -> EventKind {
        self.borrow().kind
    }
    #[inline]
    fn has_reason(&self) -> bool {
        self.borrow().reason.is_some()
    }
}

#[inline]
pub fn message_for(kind: EventKind) -> &'static str {
    match kind {
        // worker
        EventKind::MessageLogged => "worker log line",
        EventKind::MessageRejected => "malformed worker message dropped",
        EventKind::MessageUnhandled => "structured message with unknown type dropped",
        EventKind::WorkerLost => "worker channel closed before an outcome",

        // watchdog
        EventKind::WatchdogArmed => "watchdog armed",
        EventKind::WatchdogCancelled => "watchdog disarmed",
        EventKind::WatchdogExpired => "watchdog expired; forcing cancel",

        // report
        EventKind::ReportSubmitted => "outcome report accepted by controller",
        EventKind::ReportFailed => "outcome report was not delivered",

        // shutdown
        EventKind::Interrupted => "relay interrupted before an outcome",
    }
}

#[inline]
pub fn log_event<E: View>(e: E) {
    let msg = message_for(e.kind());

    match e.kind() {
        // worker
        EventKind::MessageLogged => trace!(session = e.as_session(), "{msg}"),
        EventKind::MessageRejected => {
            warn!(session = e.as_session(), reason = e.as_reason(), "{msg}")
        }
        EventKind::MessageUnhandled => {
            debug!(session = e.as_session(), kind = e.as_reason(), "{msg}")
        }
        EventKind::WorkerLost => error!(session = e.as_session(), "{msg}"),

        // watchdog
        EventKind::WatchdogArmed => {
            if e.has_reason() {
                debug!(session = e.as_session(), reason = e.as_reason(), "{msg}")
            } else {
                debug!(session = e.as_session(), "{msg}")
            }
        }
        EventKind::WatchdogCancelled => debug!(session = e.as_session(), "{msg}"),
        EventKind::WatchdogExpired => {
            warn!(session = e.as_session(), reason = e.as_reason(), "{msg}")
        }

        // report
        EventKind::ReportSubmitted => {
            info!(session = e.as_session(), outcome = e.as_outcome(), "{msg}")
        }
        EventKind::ReportFailed => error!(
            session = e.as_session(),
            outcome = e.as_outcome(),
            reason = e.as_reason(),
            "{msg}"
        ),

        // shutdown
        EventKind::Interrupted => info!(session = e.as_session(), "{msg}"),
    }
}
