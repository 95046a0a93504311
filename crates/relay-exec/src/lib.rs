mod error;
pub use error::ExecError;

mod util;

#[cfg(feature = "proc")]
pub mod proc;
#[cfg(feature = "proc")]
pub use proc::{WorkerConfig, WorkerProcess};
