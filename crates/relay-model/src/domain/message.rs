use std::str::FromStr;

use serde_json::Value;

use crate::{Metadata, ParseError};

/// Prefix of a free-form log line.
pub const LOG_PREFIX: &str = "LOG";
/// Prefix of a watchdog reset; the remainder is the reason reported on expiry.
pub const TIMEOUT_RESET_PREFIX: &str = "TIMEOUT-RESET";
/// Prefix of a watchdog cancel.
pub const TIMEOUT_CANCEL_PREFIX: &str = "TIMEOUT-CANCEL";

const DONE: &str = "done";
const CANCEL: &str = "cancel";

/// A single message emitted by the worker.
///
/// Lines starting with one of the literal prefixes are control messages.
/// Anything else is a structured value `[type, metadata, extra]` encoded as JSON.
#[derive(Clone, Debug, PartialEq)]
pub enum TaskMessage {
    /// Free-form text to be logged.
    Log(String),
    /// Re-arm the watchdog; carries the reason used if it fires.
    TimeoutReset(String),
    /// Disarm the watchdog.
    TimeoutCancel,
    /// Task finished and produced the listed output files.
    Done {
        metadata: Metadata,
        file_names: Vec<String>,
    },
    /// Task gave up; `message` is whatever the worker supplied as explanation.
    Cancel { metadata: Metadata, message: Value },
    /// Structured value with a type the relay does not act on.
    Unhandled {
        kind: String,
        metadata: Metadata,
        extra: Value,
    },
}

impl TaskMessage {
    /// Short symbolic name, used for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            TaskMessage::Log(_) => "log",
            TaskMessage::TimeoutReset(_) => "timeout-reset",
            TaskMessage::TimeoutCancel => "timeout-cancel",
            TaskMessage::Done { .. } => "done",
            TaskMessage::Cancel { .. } => "cancel",
            TaskMessage::Unhandled { .. } => "unhandled",
        }
    }
}

impl FromStr for TaskMessage {
    type Err = ParseError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        if let Some(rest) = raw.strip_prefix(LOG_PREFIX) {
            return Ok(TaskMessage::Log(body(rest)));
        }
        if let Some(rest) = raw.strip_prefix(TIMEOUT_RESET_PREFIX) {
            return Ok(TaskMessage::TimeoutReset(body(rest)));
        }
        if raw.starts_with(TIMEOUT_CANCEL_PREFIX) {
            return Ok(TaskMessage::TimeoutCancel);
        }
        parse_structured(raw)
    }
}

/// Text after a prefix: one optional `:` separator, surrounding whitespace trimmed.
fn body(rest: &str) -> String {
    rest.strip_prefix(':').unwrap_or(rest).trim().to_string()
}

fn parse_structured(raw: &str) -> Result<TaskMessage, ParseError> {
    let value: Value = serde_json::from_str(raw).map_err(ParseError::Json)?;
    let Value::Array(items) = value else {
        return Err(ParseError::NotAnArray);
    };
    let mut items = items.into_iter();

    let kind = match items.next() {
        Some(Value::String(kind)) => kind,
        Some(other) => return Err(ParseError::InvalidType(other.to_string())),
        None => return Err(ParseError::MissingField("type")),
    };
    let metadata = items.next().ok_or(ParseError::MissingField("metadata"))?;
    let extra = items.next().unwrap_or(Value::Null);

    match kind.as_str() {
        DONE => {
            let file_names = serde_json::from_value(extra).map_err(ParseError::FileNames)?;
            Ok(TaskMessage::Done {
                metadata,
                file_names,
            })
        }
        CANCEL => Ok(TaskMessage::Cancel {
            metadata,
            message: extra,
        }),
        _ => Ok(TaskMessage::Unhandled {
            kind,
            metadata,
            extra,
        }),
    }
}
