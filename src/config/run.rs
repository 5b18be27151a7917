// src/config/run.rs

use std::path::{Component, Path, PathBuf};
use std::time::Duration;

use crate::config::launch::DebugLaunchConfig;
use crate::config::model::Settings;
use crate::config::poll::parse_poll;
use crate::types::OverlapPolicy;

/// Immutable configuration of one hot-reload session.
///
/// Built once from the resolved [`DebugLaunchConfig`] plus the remaining
/// settings, then shared read-only (usually as `Arc<RunConfiguration>`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfiguration {
    pub program: String,
    pub output: String,
    pub port: u16,
    pub poll_raw: String,
    pub poll_ms: u64,
    pub watch_dirs: Vec<String>,
    pub toolchain: String,
    pub debug_server: String,
    pub bin_dir: String,
    pub binary_prefix: String,
    pub ignore: Vec<String>,
    pub use_polling: bool,
    pub overlap: OverlapPolicy,
    pub attach_command: Option<Vec<String>>,
}

impl RunConfiguration {
    pub fn new(launch: &DebugLaunchConfig, settings: &Settings) -> Self {
        Self {
            program: launch.program.clone(),
            output: launch.output.clone(),
            port: launch.port,
            poll_raw: launch.poll.clone(),
            poll_ms: parse_poll(&launch.poll),
            watch_dirs: launch.watch_dirs.clone(),
            toolchain: settings.toolchain().to_string(),
            debug_server: settings.debug_server().to_string(),
            bin_dir: settings.bin_dir().to_string(),
            binary_prefix: settings.binary_prefix().to_string(),
            ignore: settings.ignore().to_vec(),
            use_polling: settings.use_polling(),
            overlap: settings.overlap(),
            attach_command: settings.attach_command().map(<[String]>::to_vec),
        }
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_ms)
    }

    /// Absolute path of the built binary for `workspace`.
    pub fn output_path(&self, workspace: &Path) -> PathBuf {
        resolve_output(workspace, &self.output)
    }

    /// Directory scanned by retention cleanup.
    pub fn bin_dir_path(&self, workspace: &Path) -> PathBuf {
        join_normalized(workspace, &self.bin_dir)
    }

    /// Absolute watch roots.
    pub fn watch_paths(&self, workspace: &Path) -> Vec<PathBuf> {
        self.watch_dirs
            .iter()
            .map(|d| join_normalized(workspace, d))
            .collect()
    }
}

/// `workspace/<template><EXE_SUFFIX>`, with `.` components dropped.
pub fn resolve_output(workspace: &Path, template: &str) -> PathBuf {
    let with_ext = format!("{template}{}", std::env::consts::EXE_SUFFIX);
    join_normalized(workspace, &with_ext)
}

fn join_normalized(base: &Path, rel: &str) -> PathBuf {
    let mut out = base.to_path_buf();
    for component in Path::new(rel).components() {
        match component {
            Component::CurDir => {}
            other => out.push(other.as_os_str()),
        }
    }
    out
}
