// src/process/control.rs

//! Platform process control.
//!
//! Orchestration code never branches on the platform itself: it talks to a
//! [`ProcessControl`] selected once at startup by [`platform_control`].

use std::io;
use std::path::Path;
use std::process::Stdio;
use std::sync::Arc;

use tokio::process::Command;
use tracing::debug;

use crate::process::finder::{ProcessIdentity, parse_pid_list, posix_pattern, powershell_query};
use crate::types::BoxFuture;

/// Capability to find and forcibly stop OS processes.
pub trait ProcessControl: Send + Sync {
    /// Processes currently running `binary`.
    ///
    /// Best effort: any failure of the underlying query yields an empty list.
    fn find_by_binary<'a>(&'a self, binary: &'a Path) -> BoxFuture<'a, Vec<ProcessIdentity>>;

    /// Forcibly kill `pid`. An error usually means the process is already
    /// gone.
    fn kill(&self, pid: u32) -> BoxFuture<'_, io::Result<()>>;
}

/// Pick the implementation for the platform we were compiled for.
pub fn platform_control() -> Arc<dyn ProcessControl> {
    if cfg!(windows) {
        Arc::new(WindowsProcessControl)
    } else {
        Arc::new(PosixProcessControl)
    }
}

/// `pgrep -f` / `kill -9`.
#[derive(Debug, Default, Clone, Copy)]
pub struct PosixProcessControl;

impl ProcessControl for PosixProcessControl {
    fn find_by_binary<'a>(&'a self, binary: &'a Path) -> BoxFuture<'a, Vec<ProcessIdentity>> {
        Box::pin(async move {
            let mut cmd = Command::new("pgrep");
            cmd.arg("-f").arg(posix_pattern(binary));
            query_pids(cmd, binary).await
        })
    }

    fn kill(&self, pid: u32) -> BoxFuture<'_, io::Result<()>> {
        Box::pin(async move {
            let mut cmd = Command::new("kill");
            cmd.arg("-9").arg(pid.to_string());
            run_helper(cmd, "kill").await
        })
    }
}

/// PowerShell `Get-Process` / `taskkill /T /F`.
#[derive(Debug, Default, Clone, Copy)]
pub struct WindowsProcessControl;

impl ProcessControl for WindowsProcessControl {
    fn find_by_binary<'a>(&'a self, binary: &'a Path) -> BoxFuture<'a, Vec<ProcessIdentity>> {
        Box::pin(async move {
            let mut cmd = Command::new("powershell");
            cmd.arg("-NoProfile")
                .arg("-Command")
                .arg(powershell_query(binary));
            query_pids(cmd, binary).await
        })
    }

    fn kill(&self, pid: u32) -> BoxFuture<'_, io::Result<()>> {
        Box::pin(async move {
            let mut cmd = Command::new("taskkill");
            cmd.arg("/PID").arg(pid.to_string()).arg("/T").arg("/F");
            run_helper(cmd, "taskkill").await
        })
    }
}

async fn query_pids(mut cmd: Command, binary: &Path) -> Vec<ProcessIdentity> {
    hide_window(&mut cmd);
    cmd.stdin(Stdio::null()).stderr(Stdio::null());

    let output = match cmd.output().await {
        Ok(output) => output,
        Err(e) => {
            debug!(binary = %binary.display(), error = %e, "process lookup helper failed to run");
            return Vec::new();
        }
    };

    // pgrep exits 1 when nothing matches.
    if !output.status.success() {
        debug!(
            binary = %binary.display(),
            status = %output.status,
            "no processes found for binary"
        );
        return Vec::new();
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    parse_pid_list(&stdout)
        .into_iter()
        .map(|pid| ProcessIdentity::new(pid, Some(binary.to_path_buf())))
        .collect()
}

async fn run_helper(mut cmd: Command, name: &str) -> io::Result<()> {
    hide_window(&mut cmd);
    let status = cmd
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await?;

    if status.success() {
        Ok(())
    } else {
        Err(io::Error::other(format!("{name} exited with {status}")))
    }
}

#[cfg(windows)]
fn hide_window(cmd: &mut Command) {
    const CREATE_NO_WINDOW: u32 = 0x0800_0000;
    cmd.creation_flags(CREATE_NO_WINDOW);
}

#[cfg(not(windows))]
fn hide_window(_cmd: &mut Command) {}
