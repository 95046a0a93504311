mod config;
mod error;

pub use config::{EXEC_TARGET, LoggerConfig, LoggerFormat, WORKER_TARGET};
pub use error::LoggerError;
pub use tracing_subscriber::filter::LevelFilter;

use time::{UtcOffset, format_description::well_known::Rfc3339};
use tracing_subscriber::{
    EnvFilter, Registry, fmt,
    fmt::time::OffsetTime,
    layer::{Layered, SubscriberExt},
    util::SubscriberInitExt,
};

type Filtered = Layered<EnvFilter, Registry>;

/// Installs the relay logger as the global subscriber.
///
/// The filter is checked before anything is installed, so a bad level leaves the
/// process without a logger rather than with a half-configured one.
pub fn logger_init(cfg: &LoggerConfig) -> Result<(), LoggerError> {
    let filter = relay_filter(cfg)?;
    let registry = tracing_subscriber::registry().with(filter);

    match cfg.format {
        LoggerFormat::Text => registry
            .with(
                fmt::layer()
                    .with_ansi(cfg.use_color)
                    .with_target(cfg.with_targets)
                    .with_timer(local_rfc3339()),
            )
            .try_init()?,
        LoggerFormat::Json => registry
            .with(
                fmt::layer()
                    .json()
                    .with_target(cfg.with_targets)
                    .with_timer(local_rfc3339()),
            )
            .try_init()?,
        LoggerFormat::Journald => journald(registry)?,
    }
    Ok(())
}

fn relay_filter(cfg: &LoggerConfig) -> Result<EnvFilter, LoggerError> {
    let directives = cfg.directives();
    EnvFilter::try_new(&directives).map_err(|source| LoggerError::Filter { directives, source })
}

fn local_rfc3339() -> OffsetTime<Rfc3339> {
    let offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);
    OffsetTime::new(offset, Rfc3339)
}

#[cfg(all(target_os = "linux", feature = "journald"))]
fn journald(registry: Filtered) -> Result<(), LoggerError> {
    let layer = tracing_journald::layer()?.with_syslog_identifier("relay-agentd".to_string());
    registry.with(layer).try_init()?;
    Ok(())
}

#[cfg(not(all(target_os = "linux", feature = "journald")))]
fn journald(_registry: Filtered) -> Result<(), LoggerError> {
    Err(LoggerError::JournaldUnavailable)
}
