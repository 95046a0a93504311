use std::{fmt, io::IsTerminal, str::FromStr};

use tracing_subscriber::filter::LevelFilter;

use crate::logger::error::LoggerError;

/// Target of the lines a worker sends with the `LOG` prefix.
pub const WORKER_TARGET: &str = "relay.worker";
/// Target of the worker process bridge (spawn, stdout, shutdown).
pub const EXEC_TARGET: &str = "relay.exec.proc";

/// Output of the relay log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoggerFormat {
    /// Human readable lines.
    Text,
    /// One JSON object per line, for log shippers.
    Json,
    /// Native journald fields (linux, `journald` feature).
    Journald,
}

impl LoggerFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoggerFormat::Text => "text",
            LoggerFormat::Json => "json",
            LoggerFormat::Journald => "journald",
        }
    }
}

impl fmt::Display for LoggerFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LoggerFormat {
    type Err = LoggerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("text") {
            Ok(LoggerFormat::Text)
        } else if s.eq_ignore_ascii_case("json") {
            Ok(LoggerFormat::Json)
        } else if s.eq_ignore_ascii_case("journald") {
            if cfg!(all(target_os = "linux", feature = "journald")) {
                Ok(LoggerFormat::Journald)
            } else {
                Err(LoggerError::JournaldUnavailable)
            }
        } else {
            Err(LoggerError::UnknownFormat(s.to_string()))
        }
    }
}

#[derive(Debug, Clone)]
pub struct LoggerConfig {
    pub format: LoggerFormat,
    /// Base `EnvFilter` directives, e.g. `info` or `relay_core=debug,info`.
    pub level: String,
    /// Ceiling for worker `LOG` lines; `off` silences a chatty worker.
    pub worker_level: LevelFilter,
    /// Ceiling for the process bridge. At `trace` every stdout line is echoed.
    pub exec_level: LevelFilter,
    pub with_targets: bool,
    pub use_color: bool,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            format: LoggerFormat::Text,
            level: "info".to_string(),
            worker_level: LevelFilter::INFO,
            exec_level: LevelFilter::INFO,
            with_targets: true,
            use_color: std::io::stdout().is_terminal(),
        }
    }
}

impl LoggerConfig {
    /// Full filter: the base directives plus the worker and bridge ceilings.
    ///
    /// Target directives are more specific than a bare level, so they win over
    /// `level` for their own targets only.
    pub fn directives(&self) -> String {
        let mut out = self.level.trim().trim_end_matches(',').to_string();
        if !out.is_empty() {
            out.push(',');
        }
        out.push_str(&format!(
            "{WORKER_TARGET}={},{EXEC_TARGET}={}",
            self.worker_level, self.exec_level
        ));
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_parse_case_insensitively() {
        assert_eq!(" JSON ".parse::<LoggerFormat>().unwrap(), LoggerFormat::Json);
        assert_eq!("Text".parse::<LoggerFormat>().unwrap(), LoggerFormat::Text);
        assert_eq!(LoggerFormat::Json.to_string(), "json");
    }

    #[test]
    fn unknown_format_is_rejected() {
        assert!(matches!(
            "yaml".parse::<LoggerFormat>(),
            Err(LoggerError::UnknownFormat(f)) if f == "yaml"
        ));
    }

    #[cfg(not(all(target_os = "linux", feature = "journald")))]
    #[test]
    fn journald_needs_the_feature() {
        assert!(matches!(
            "journald".parse::<LoggerFormat>(),
            Err(LoggerError::JournaldUnavailable)
        ));
    }

    #[test]
    fn directives_append_worker_and_exec_ceilings() {
        let cfg = LoggerConfig {
            level: "relay_core=debug,info".into(),
            worker_level: LevelFilter::OFF,
            exec_level: LevelFilter::WARN,
            ..Default::default()
        };
        assert_eq!(
            cfg.directives(),
            "relay_core=debug,info,relay.worker=off,relay.exec.proc=warn"
        );
    }

    #[test]
    fn empty_level_keeps_only_target_ceilings() {
        let cfg = LoggerConfig {
            level: " ".into(),
            ..Default::default()
        };
        assert_eq!(cfg.directives(), "relay.worker=info,relay.exec.proc=info");
    }
}
