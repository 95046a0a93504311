use std::str::FromStr;

use crate::errors::HttpReportError;

/// Body encoding of outcome submissions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReportEncoding {
    /// `application/x-www-form-urlencoded`, what a plain html form would post.
    Form,
    /// JSON object with the same string fields.
    Json,
}

impl FromStr for ReportEncoding {
    type Err = HttpReportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "form" => Ok(ReportEncoding::Form),
            "json" => Ok(ReportEncoding::Json),
            _ => Err(HttpReportError::InvalidEncoding(s.to_string())),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ReporterConfig {
    /// Base url the `done` and `cancel` endpoints are resolved against.
    ///
    /// Resolution follows relative-url rules: `http://ctl/tasks/7/` yields
    /// `http://ctl/tasks/7/done`, while `http://ctl/tasks/7` yields `http://ctl/tasks/done`.
    pub base_url: String,
    pub encoding: ReportEncoding,
    /// Upper bound for one submission (default: 10 seconds).
    pub request_timeout_ms: u64,
}

impl Default for ReporterConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080/".to_string(),
            encoding: ReportEncoding::Form,
            request_timeout_ms: 10_000,
        }
    }
}

impl ReporterConfig {
    pub fn validate(&self) -> Result<(), HttpReportError> {
        if self.request_timeout_ms == 0 {
            return Err(HttpReportError::InvalidConfig(
                "request timeout must be greater than zero".into(),
            ));
        }
        reqwest::Url::parse(&self.base_url)
            .map_err(|e| HttpReportError::InvalidEndpoint(format!("{}: {e}", self.base_url)))?;
        Ok(())
    }
}
