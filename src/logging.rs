// src/logging.rs

//! Logging setup for `hotdlv` using `tracing` + `tracing-subscriber`.
//!
//! Filter resolution:
//! 1. `--log-level` CLI flag (if provided) sets a global level.
//! 2. Otherwise `HOTDLV_LOG` is read as a full `EnvFilter` directive string
//!    (e.g. `"debug"` or `"hotdlv::attach=trace,info"`).
//! 3. Otherwise `info`.
//!
//! The `notify` crate is capped at `warn` unless a directive names it, since
//! the poll watcher is chatty at debug level.
//!
//! Logs are sent to STDERR. The user-facing output channel (see
//! [`crate::output`]) emits through the same subscriber.

use anyhow::Result;
use tracing_subscriber::{EnvFilter, fmt};

use crate::cli::LogLevel;

/// Environment variable consulted when no `--log-level` is given.
pub const LOG_ENV_VAR: &str = "HOTDLV_LOG";

/// Initialise global logging subscriber.
///
/// Safe to call once at startup.
pub fn init_logging(cli_level: Option<LogLevel>) -> Result<()> {
    let env = std::env::var(LOG_ENV_VAR).ok();
    let directives = filter_directives(cli_level, env.as_deref());
    let filter = EnvFilter::try_new(&directives)
        .unwrap_or_else(|_| EnvFilter::new("info,notify=warn"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_writer(std::io::stderr)
        .init();

    Ok(())
}

fn filter_directives(cli_level: Option<LogLevel>, env: Option<&str>) -> String {
    let directives = match (cli_level, env.map(str::trim)) {
        (Some(lvl), _) => level_directive(lvl).to_string(),
        (None, Some(s)) if !s.is_empty() => s.to_string(),
        _ => "info".to_string(),
    };

    if directives.contains("notify") {
        directives
    } else {
        format!("{directives},notify=warn")
    }
}

fn level_directive(lvl: LogLevel) -> &'static str {
    match lvl {
        LogLevel::Error => "error",
        LogLevel::Warn => "warn",
        LogLevel::Info => "info",
        LogLevel::Debug => "debug",
        LogLevel::Trace => "trace",
    }
}
