pub mod config;
pub use config::SessionConfig;
pub mod error;
pub use error::{CoreError, ReportError};
pub mod event;
pub use event::{EventKind, RelayEvent, Subscribe};
pub mod reporter;
pub use reporter::Reporter;
pub mod session;
pub use session::{RelaySession, SessionOutcome, SessionReport};
pub mod system;
pub use system::Diagnostics;
pub mod watchdog;
pub use watchdog::Watchdog;
