// src/config/launch.rs

//! Debug launch configuration resolution.
//!
//! A session is described by a `launch`-kind configuration resolved from the
//! global settings plus explicit per-session overrides (the CLI flags).
//! Overrides always win.

use serde::Serialize;

use crate::config::model::Settings;

/// Debug-session type name.
pub const SESSION_TYPE: &str = "hotdlv";

/// Explicit per-session values. `None` means "use the setting".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LaunchOverrides {
    pub program: Option<String>,
    pub output: Option<String>,
    pub port: Option<u16>,
    pub poll: Option<String>,
    pub watch_dirs: Option<Vec<String>>,
}

/// Resolved debug launch configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DebugLaunchConfig {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub request: String,
    pub program: String,
    pub output: String,
    pub port: u16,
    pub poll: String,
    pub watch_dirs: Vec<String>,
}

/// Merge settings and overrides into a launch configuration.
///
/// The request kind is always `launch`.
pub fn resolve_debug_configuration(
    settings: &Settings,
    overrides: &LaunchOverrides,
) -> DebugLaunchConfig {
    DebugLaunchConfig {
        name: SESSION_TYPE.to_string(),
        kind: SESSION_TYPE.to_string(),
        request: "launch".to_string(),
        program: overrides
            .program
            .clone()
            .unwrap_or_else(|| settings.program().to_string()),
        output: overrides
            .output
            .clone()
            .unwrap_or_else(|| settings.output().to_string()),
        port: overrides.port.unwrap_or(settings.port()),
        poll: overrides
            .poll
            .clone()
            .unwrap_or_else(|| settings.poll().to_string()),
        watch_dirs: overrides
            .watch_dirs
            .clone()
            .filter(|dirs| !dirs.is_empty())
            .unwrap_or_else(|| settings.watch_dirs().to_vec()),
    }
}
