mod error;
pub use error::{ParseError, PayloadError};

mod message;
pub use message::{LOG_PREFIX, TIMEOUT_CANCEL_PREFIX, TIMEOUT_RESET_PREFIX, TaskMessage};

mod outcome;
pub use outcome::{CancelReason, OutcomeKind, OutcomePayload, OutcomeReport, ReportFields};

mod payload;
pub use payload::TaskPayload;

/// Opaque metadata attached by the worker to its outcome.
///
/// The relay never inspects it; it is forwarded to the controller as JSON text.
pub type Metadata = serde_json::Value;
