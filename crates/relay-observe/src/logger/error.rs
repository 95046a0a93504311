use thiserror::Error;
use tracing_subscriber::{filter::ParseError, util::TryInitError};

#[derive(Debug, Error)]
pub enum LoggerError {
    #[error("unknown log format `{0}` (expected text, json or journald)")]
    UnknownFormat(String),
    #[error("journald output needs linux and the `journald` feature")]
    JournaldUnavailable,
    #[error("invalid log filter `{directives}`: {source}")]
    Filter {
        directives: String,
        #[source]
        source: ParseError,
    },
    #[error("cannot connect to journald: {0}")]
    Journald(#[from] std::io::Error),
    /// Another global subscriber is already installed.
    #[error("cannot install the relay logger: {0}")]
    Install(#[from] TryInitError),
}
