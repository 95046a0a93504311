use serde_json::{Value, json};
use tokio::time::Instant;

/// Host name, best effort.
pub fn host_name() -> String {
    hostname::get()
        .ok()
        .and_then(|h| h.into_string().ok())
        .unwrap_or_else(|| "unknown-host".to_string())
}

/// Fresh random session identifier.
pub fn new_session_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Auxiliary information attached to a forced cancel.
#[derive(Debug, Clone)]
pub struct Diagnostics {
    session_id: String,
    host: String,
    started: Instant,
    messages: u64,
    resets: u64,
    last_log: Option<String>,
}

impl Diagnostics {
    pub fn new(session_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            host: host_name(),
            started: Instant::now(),
            messages: 0,
            resets: 0,
            last_log: None,
        }
    }

    #[inline]
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    #[inline]
    pub fn messages(&self) -> u64 {
        self.messages
    }

    #[inline]
    pub fn resets(&self) -> u64 {
        self.resets
    }

    #[inline]
    pub fn last_log(&self) -> Option<&str> {
        self.last_log.as_deref()
    }

    pub fn record_message(&mut self) {
        self.messages += 1;
    }

    pub fn record_reset(&mut self) {
        self.resets += 1;
    }

    pub fn record_log(&mut self, line: impl Into<String>) {
        self.last_log = Some(line.into());
    }

    /// Snapshot as the `info` object of a cancel reason.
    pub fn to_info(&self) -> Value {
        json!({
            "sessionId": self.session_id,
            "host": self.host,
            "elapsedMs": self.started.elapsed().as_millis() as u64,
            "messages": self.messages,
            "resets": self.resets,
            "lastLog": self.last_log,
        })
    }
}
