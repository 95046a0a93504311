use async_trait::async_trait;
use prometheus::{
    Encoder, IntCounter, IntCounterVec, Opts, Registry, TextEncoder, proto::MetricFamily,
};
use relay_core::{EventKind, RelayEvent, Subscribe};

#[derive(Clone)]
pub struct PrometheusMetrics {
    registry: Registry,
    events: IntCounterVec,
    reports: IntCounterVec,
    watchdog_expired: IntCounter,
}

impl PrometheusMetrics {
    /// Creates the counters in a fresh registry.
    pub fn new() -> Result<Self, prometheus::Error> {
        Self::with_registry(Registry::new())
    }

    /// Registers the counters in `registry`.
    pub fn with_registry(registry: Registry) -> Result<Self, prometheus::Error> {
        let events = IntCounterVec::new(
            Opts::new("relay_events_total", "Events published by relay sessions"),
            &["kind"],
        )?;
        let reports = IntCounterVec::new(
            Opts::new("relay_reports_total", "Outcome reports by outcome and result"),
            &["outcome", "result"],
        )?;
        let watchdog_expired = IntCounter::new(
            "relay_watchdog_expired_total",
            "Tasks cancelled because the watchdog expired",
        )?;

        registry.register(Box::new(events.clone()))?;
        registry.register(Box::new(reports.clone()))?;
        registry.register(Box::new(watchdog_expired.clone()))?;

        Ok(Self {
            registry,
            events,
            reports,
            watchdog_expired,
        })
    }

    pub fn gather(&self) -> Vec<MetricFamily> {
        self.registry.gather()
    }

    /// Text exposition format.
    pub fn render(&self) -> Result<String, prometheus::Error> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }

    pub fn record(&self, event: &RelayEvent) {
        self.events.with_label_values(&[event.kind.as_label()]).inc();

        let outcome = event.outcome.map(|o| o.endpoint()).unwrap_or("unknown");
        match event.kind {
            EventKind::ReportSubmitted => {
                self.reports.with_label_values(&[outcome, "submitted"]).inc()
            }
            EventKind::ReportFailed => self.reports.with_label_values(&[outcome, "failed"]).inc(),
            EventKind::WatchdogExpired => self.watchdog_expired.inc(),
            _ => {}
        }
    }
}

#[async_trait]
impl Subscribe for PrometheusMetrics {
    async fn on_event(&self, event: &RelayEvent) {
        self.record(event);
    }

    fn name(&self) -> &'static str {
        "prometheus"
    }
}
