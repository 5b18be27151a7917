// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::config::LaunchOverrides;

/// Command-line arguments for `hotdlv`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "hotdlv",
    version,
    about = "Rebuild, relaunch under a headless debug server and reattach the debugger on every change.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    ///
    /// Relative paths are resolved against the workspace. A missing default
    /// file is not an error.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Workspace root. Default: the current directory.
    #[arg(long, value_name = "DIR")]
    pub workspace: Option<PathBuf>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `HOTDLV_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Package to build, relative to the workspace.
    #[arg(long, value_name = "PKG")]
    pub program: Option<String>,

    /// Output path template of the built binary.
    #[arg(long, value_name = "PATH")]
    pub output: Option<String>,

    /// Debug server port.
    #[arg(long, value_parser = clap::value_parser!(u16).range(1..))]
    pub port: Option<u16>,

    /// Watch poll interval, e.g. `500ms` or `2s`.
    #[arg(long, value_name = "INTERVAL")]
    pub poll: Option<String>,

    /// Directory to watch; repeat for several. Replaces the configured list.
    #[arg(long = "watch-dir", value_name = "DIR")]
    pub watch_dir: Vec<String>,

    /// Restart once and keep the session until Ctrl-C, without watching.
    #[arg(long)]
    pub once: bool,

    /// Print the resolved debug launch configuration and exit.
    #[arg(long)]
    pub print_config: bool,
}

impl CliArgs {
    /// Per-session overrides carried by the flags.
    pub fn overrides(&self) -> LaunchOverrides {
        LaunchOverrides {
            program: self.program.clone(),
            output: self.output.clone(),
            port: self.port,
            poll: self.poll.clone(),
            watch_dirs: (!self.watch_dir.is_empty()).then(|| self.watch_dir.clone()),
        }
    }

    /// Explicitly requested config path, resolved against `workspace`.
    pub fn config_path(&self, workspace: &std::path::Path) -> Option<PathBuf> {
        self.config.as_ref().map(|p| {
            if p.is_absolute() {
                p.clone()
            } else {
                workspace.join(p)
            }
        })
    }
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
