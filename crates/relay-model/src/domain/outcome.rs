use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::Metadata;

/// Which controller endpoint an outcome goes to.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OutcomeKind {
    Done,
    Cancel,
}

impl OutcomeKind {
    /// Endpoint path, relative to the controller base url.
    pub fn endpoint(&self) -> &'static str {
        match self {
            OutcomeKind::Done => "done",
            OutcomeKind::Cancel => "cancel",
        }
    }

    /// Name of the field carrying the payload.
    pub fn payload_field(&self) -> &'static str {
        match self {
            OutcomeKind::Done => "result",
            OutcomeKind::Cancel => "reason",
        }
    }
}

/// Explanation attached to a cancel report.
///
/// `info` is an empty object when the worker cancels on its own and carries
/// relay diagnostics when the watchdog forces the cancel.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CancelReason {
    pub message: Value,
    pub info: Value,
}

impl CancelReason {
    pub fn new(message: impl Into<Value>) -> Self {
        Self {
            message: message.into(),
            info: Value::Object(Map::new()),
        }
    }

    pub fn with_info(mut self, info: Value) -> Self {
        self.info = info;
        self
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum OutcomePayload {
    FileNames(Vec<String>),
    Reason(CancelReason),
}

/// Final notification sent to the controller, exactly once per task.
#[derive(Clone, Debug, PartialEq)]
pub struct OutcomeReport {
    pub metadata: Metadata,
    pub payload: OutcomePayload,
}

/// String-encoded fields of a report, ready to be put on the wire.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReportFields {
    pub kind: OutcomeKind,
    pub metadata: String,
    pub payload: String,
}

impl OutcomeReport {
    pub fn done(metadata: Metadata, file_names: Vec<String>) -> Self {
        Self {
            metadata,
            payload: OutcomePayload::FileNames(file_names),
        }
    }

    pub fn cancel(metadata: Metadata, reason: CancelReason) -> Self {
        Self {
            metadata,
            payload: OutcomePayload::Reason(reason),
        }
    }

    pub fn kind(&self) -> OutcomeKind {
        match self.payload {
            OutcomePayload::FileNames(_) => OutcomeKind::Done,
            OutcomePayload::Reason(_) => OutcomeKind::Cancel,
        }
    }

    /// Encodes metadata and payload as JSON text.
    pub fn fields(&self) -> Result<ReportFields, serde_json::Error> {
        let payload = match &self.payload {
            OutcomePayload::FileNames(names) => serde_json::to_string(names)?,
            OutcomePayload::Reason(reason) => serde_json::to_string(reason)?,
        };
        Ok(ReportFields {
            kind: self.kind(),
            metadata: serde_json::to_string(&self.metadata)?,
            payload,
        })
    }
}

impl ReportFields {
    /// Field name/value pairs in submission order.
    pub fn pairs(&self) -> [(&'static str, &str); 2] {
        [
            ("metadata", self.metadata.as_str()),
            (self.kind.payload_field(), self.payload.as_str()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn done_fields_encode_file_list() {
        let report = OutcomeReport::done(json!({"id": 3}), vec!["part-0".into()]);
        let fields = report.fields().unwrap();

        assert_eq!(fields.kind, OutcomeKind::Done);
        assert_eq!(fields.metadata, r#"{"id":3}"#);
        assert_eq!(fields.payload, r#"["part-0"]"#);
        assert_eq!(fields.pairs()[1].0, "result");
    }

    #[test]
    fn cancel_fields_encode_message_and_empty_info() {
        let report = OutcomeReport::cancel(json!([]), CancelReason::new("disk full"));
        let fields = report.fields().unwrap();

        assert_eq!(fields.kind, OutcomeKind::Cancel);
        assert_eq!(fields.metadata, "[]");
        assert_eq!(fields.payload, r#"{"message":"disk full","info":{}}"#);
        assert_eq!(fields.pairs()[1].0, "reason");
    }

    #[test]
    fn endpoints_match_kind() {
        assert_eq!(OutcomeKind::Done.endpoint(), "done");
        assert_eq!(OutcomeKind::Cancel.endpoint(), "cancel");
    }
}
