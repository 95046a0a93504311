use async_trait::async_trait;
use relay_core::{RelayEvent, Subscribe};

use crate::subscriber::view::log_event;

/// Writes every relay event to the log.
pub struct Journal;

impl Journal {
    pub fn new() -> Self {
        Self
    }
}

impl Default for Journal {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Subscribe for Journal {
    async fn on_event(&self, event: &RelayEvent) {
        log_event(event);
    }
    fn name(&self) -> &'static str {
        "journal"
    }
}
