use relay_core::ReportError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum HttpReportError {
    #[error("http request failed: {0}")]
    HttpRequest(#[from] reqwest::Error),

    #[error("failed to encode report: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("invalid controller endpoint: {0}")]
    InvalidEndpoint(String),

    #[error("invalid report encoding: {0} (expected: form|json)")]
    InvalidEncoding(String),

    #[error("invalid reporter config: {0}")]
    InvalidConfig(String),

    #[error("controller rejected report with status {status}: {body}")]
    Rejected { status: u16, body: String },
}

impl From<HttpReportError> for ReportError {
    fn from(err: HttpReportError) -> Self {
        match err {
            HttpReportError::HttpRequest(e) => ReportError::Transport(e.to_string()),
            HttpReportError::Encode(e) => ReportError::Encode(e.to_string()),
            HttpReportError::InvalidEndpoint(msg) => ReportError::InvalidEndpoint(msg),
            e @ (HttpReportError::InvalidEncoding(_) | HttpReportError::InvalidConfig(_)) => {
                ReportError::Misconfigured(e.to_string())
            }
            HttpReportError::Rejected { status, body } => ReportError::Rejected { status, body },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_errors_are_not_transport_failures() {
        let err = ReportError::from(HttpReportError::InvalidConfig("timeout is zero".into()));
        assert!(matches!(&err, ReportError::Misconfigured(msg) if msg.contains("timeout is zero")));

        let err = ReportError::from(HttpReportError::InvalidEncoding("xml".into()));
        assert!(matches!(err, ReportError::Misconfigured(_)));
    }

    #[test]
    fn rejection_keeps_status_and_body() {
        let err = ReportError::from(HttpReportError::Rejected {
            status: 503,
            body: "busy".into(),
        });
        assert!(matches!(err, ReportError::Rejected { status: 503, ref body } if body == "busy"));
    }
}
