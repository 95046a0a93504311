use std::time::Duration;

use async_trait::async_trait;
use reqwest::Url;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use relay_core::{ReportError, Reporter};
use relay_model::{OutcomeKind, OutcomeReport, ReportFields};

use crate::{
    config::{ReportEncoding, ReporterConfig},
    errors::HttpReportError,
};

/// Posts outcome reports to the controller's `done` and `cancel` endpoints.
///
/// One request per report; no retry.
pub struct HttpReporter {
    client: reqwest::Client,
    base: Url,
    encoding: ReportEncoding,
}

impl HttpReporter {
    pub fn new(cfg: &ReporterConfig) -> Result<Self, HttpReportError> {
        cfg.validate()?;
        let base = Url::parse(&cfg.base_url)
            .map_err(|e| HttpReportError::InvalidEndpoint(format!("{}: {e}", cfg.base_url)))?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(cfg.request_timeout_ms))
            .build()?;

        Ok(Self {
            client,
            base,
            encoding: cfg.encoding,
        })
    }

    /// Absolute url of the endpoint for `kind`.
    pub fn endpoint(&self, kind: OutcomeKind) -> Result<Url, HttpReportError> {
        self.base
            .join(kind.endpoint())
            .map_err(|e| HttpReportError::InvalidEndpoint(format!("{}: {e}", kind.endpoint())))
    }

    async fn post(&self, fields: &ReportFields) -> Result<(), HttpReportError> {
        let url = self.endpoint(fields.kind)?;
        debug!(%url, encoding = ?self.encoding, "submitting outcome");

        let request = self.client.post(url);
        let request = match self.encoding {
            ReportEncoding::Form => request.form(&fields.pairs()),
            ReportEncoding::Json => request.json(&json_body(fields)),
        };

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "controller rejected outcome");
            return Err(HttpReportError::Rejected {
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }
}

fn json_body(fields: &ReportFields) -> Value {
    let object = fields
        .pairs()
        .into_iter()
        .map(|(name, value)| (name.to_string(), Value::String(value.to_string())))
        .collect::<Map<_, _>>();
    Value::Object(object)
}

#[async_trait]
impl Reporter for HttpReporter {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn submit(&self, report: &OutcomeReport) -> Result<(), ReportError> {
        let fields = report.fields().map_err(HttpReportError::from)?;
        self.post(&fields).await.map_err(ReportError::from)
    }
}
