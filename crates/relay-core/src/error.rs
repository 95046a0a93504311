use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid session config: {0}")]
    InvalidConfig(String),
    #[error("report error: {0}")]
    Report(#[from] ReportError),
}

/// Failure to deliver an outcome report.
///
/// Transport crates convert their own errors into this one at the [`crate::Reporter`] boundary.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("failed to encode report: {0}")]
    Encode(String),
    #[error("invalid controller endpoint: {0}")]
    InvalidEndpoint(String),
    /// The reporter itself is set up wrong; retrying cannot help.
    #[error("reporter misconfigured: {0}")]
    Misconfigured(String),
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("controller rejected report with status {status}: {body}")]
    Rejected { status: u16, body: String },
}
