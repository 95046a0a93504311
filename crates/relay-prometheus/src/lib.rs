//! Prometheus metrics for relay sessions.
//!
//! [`PrometheusMetrics`] is a [`relay_core::Subscribe`] implementation: attach it to a
//! session and it counts what the session publishes.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use relay_prometheus::PrometheusMetrics;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let metrics = Arc::new(PrometheusMetrics::new()?);
//! // session.with_subscriber(metrics.clone());
//! let text = metrics.render()?;
//! assert!(text.is_empty() || text.contains("relay_"));
//! # Ok(())
//! # }
//! ```
//!
//! ## Metrics
//! - `relay_events_total{kind}` - Counter
//! - `relay_reports_total{outcome, result}` - Counter
//! - `relay_watchdog_expired_total` - Counter
//!
//! ## HTTP Server
//! This crate does NOT provide an HTTP server for a `/metrics` endpoint.
//! Use [`PrometheusMetrics::gather`] with your own HTTP framework.

mod backend;
pub use backend::PrometheusMetrics;

pub use prometheus::{Encoder, Registry, TextEncoder};
