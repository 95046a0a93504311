use std::path::PathBuf;

use clap::Parser;

use relay_core::SessionConfig;
use relay_exec::WorkerConfig;
use relay_observe::{LevelFilter, LoggerConfig, LoggerFormat};
use relay_report::{ReportEncoding, ReporterConfig};

/// Relays a worker's messages to the task controller and reports its outcome.
#[derive(Debug, Parser)]
#[command(name = "relay-agentd", version)]
pub struct Cli {
    /// Controller base url; `done` and `cancel` are resolved against it.
    #[arg(long, env = "RELAY_CONTROLLER_URL")]
    pub controller_url: String,

    /// Body encoding of outcome reports (form|json).
    #[arg(long, env = "RELAY_REPORT_ENCODING", default_value = "form")]
    pub encoding: ReportEncoding,

    #[arg(long, env = "RELAY_REQUEST_TIMEOUT_MS", default_value_t = 10_000)]
    pub request_timeout_ms: u64,

    /// Watchdog interval; the worker must reset it at least this often.
    #[arg(long, env = "RELAY_WATCHDOG_MS", default_value_t = 60_000)]
    pub watchdog_ms: u64,

    /// Reason reported when the watchdog fires without a recorded reason.
    #[arg(long, env = "RELAY_FALLBACK_REASON", default_value = "notLoading")]
    pub fallback_reason: String,

    #[arg(long, env = "RELAY_CHANNEL_CAPACITY", default_value_t = 256)]
    pub channel_capacity: usize,

    /// File holding the task details JSON object.
    #[arg(long, env = "RELAY_TASK_DETAILS", value_name = "FILE")]
    pub task_details: PathBuf,

    /// File holding one dependency's output (a JSON array). Repeatable, order is kept.
    #[arg(long = "dependency", value_name = "FILE")]
    pub dependencies: Vec<PathBuf>,

    #[arg(long, env = "RELAY_LOG_FORMAT", default_value = "text")]
    pub log_format: LoggerFormat,

    #[arg(long, env = "RELAY_LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Ceiling for lines the worker sends with `LOG`; `off` hides them.
    #[arg(long, env = "RELAY_WORKER_LOG_LEVEL", default_value = "info")]
    pub worker_log_level: LevelFilter,

    /// Time between SIGTERM and SIGKILL when stopping the worker.
    #[arg(long, env = "RELAY_SHUTDOWN_GRACE_MS", default_value_t = 5_000)]
    pub shutdown_grace_ms: u64,

    /// Worker program followed by its arguments.
    #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
    pub worker: Vec<String>,
}

impl Cli {
    pub fn logger_config(&self) -> LoggerConfig {
        LoggerConfig {
            format: self.log_format,
            level: self.log_level.clone(),
            worker_level: self.worker_log_level,
            ..Default::default()
        }
    }

    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            watchdog_interval_ms: self.watchdog_ms,
            fallback_reason: self.fallback_reason.clone(),
            channel_capacity: self.channel_capacity,
        }
    }

    pub fn reporter_config(&self) -> ReporterConfig {
        ReporterConfig {
            base_url: self.controller_url.clone(),
            encoding: self.encoding,
            request_timeout_ms: self.request_timeout_ms,
        }
    }

    pub fn worker_config(&self) -> WorkerConfig {
        let (program, args) = match self.worker.split_first() {
            Some((program, args)) => (program.clone(), args.to_vec()),
            None => (String::new(), Vec::new()),
        };
        WorkerConfig {
            program,
            args,
            shutdown_grace_ms: self.shutdown_grace_ms,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_worker_command_and_defaults() {
        let cli = Cli::try_parse_from([
            "relay-agentd",
            "--controller-url",
            "http://ctl/tasks/1/",
            "--task-details",
            "details.json",
            "--dependency",
            "map-0.json",
            "--dependency",
            "map-1.json",
            "python3",
            "reduce.py",
            "--fast",
        ])
        .unwrap();

        assert_eq!(cli.encoding, ReportEncoding::Form);
        assert_eq!(cli.dependencies.len(), 2);

        let worker = cli.worker_config();
        assert_eq!(worker.program, "python3");
        assert_eq!(worker.args, vec!["reduce.py", "--fast"]);

        let session = cli.session_config();
        assert_eq!(session.watchdog_interval_ms, 60_000);
        assert_eq!(session.fallback_reason, "notLoading");
        assert!(session.validate().is_ok());
    }

    #[test]
    fn parses_overrides() {
        let cli = Cli::try_parse_from([
            "relay-agentd",
            "--controller-url",
            "http://ctl/",
            "--task-details",
            "d.json",
            "--encoding",
            "json",
            "--watchdog-ms",
            "1500",
            "--log-format",
            "json",
            "--worker-log-level",
            "off",
            "worker",
        ])
        .unwrap();

        assert_eq!(cli.reporter_config().encoding, ReportEncoding::Json);
        assert_eq!(cli.session_config().watchdog_interval_ms, 1500);
        let logger = cli.logger_config();
        assert_eq!(logger.format, LoggerFormat::Json);
        assert_eq!(logger.worker_level, LevelFilter::OFF);
        assert!(cli.worker_config().args.is_empty());
    }

    #[test]
    fn worker_command_is_required() {
        let err = Cli::try_parse_from([
            "relay-agentd",
            "--controller-url",
            "http://ctl/",
            "--task-details",
            "d.json",
        ]);
        assert!(err.is_err());
    }

    #[test]
    fn unknown_encoding_is_rejected() {
        let err = Cli::try_parse_from([
            "relay-agentd",
            "--controller-url",
            "http://ctl/",
            "--task-details",
            "d.json",
            "--encoding",
            "xml",
            "worker",
        ]);
        assert!(err.is_err());
    }
}
