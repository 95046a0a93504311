mod config;
pub use config::{ReportEncoding, ReporterConfig};

mod errors;
pub use errors::HttpReportError;

mod http;
pub use http::HttpReporter;
