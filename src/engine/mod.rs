// src/engine/mod.rs

//! Restart engine for hotdlv.
//!
//! This module ties together:
//! - the shared session state (debug server, watcher, attach tracker)
//! - retry and backoff helpers
//! - the restart orchestrator that reacts to:
//!   - the start command
//!   - file-watch triggers
//!   - shutdown
//!
//! The orchestrator is written against the [`crate::exec::BuildStep`],
//! [`crate::exec::LaunchStep`] and [`crate::process::ProcessControl`] seams,
//! so it can run without touching real processes.

use std::path::{Path, PathBuf};

use crate::errors::{HotdlvError, Result};

/// What a call to [`Orchestrator::restart`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RestartOutcome {
    /// A fresh binary was built and handed to the launcher.
    Restarted { binary: PathBuf, attempts: u32 },
    /// Folded into a restart that was already waiting to run.
    Coalesced,
}

/// Bookkeeping of a single restart call. Never shared between calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestartAttempt {
    pub workspace: PathBuf,
    /// Resolved output binary path.
    pub output: PathBuf,
    /// 1-based number of the build + launch try in progress.
    pub attempt: u32,
    pub last_error: Option<String>,
}

impl RestartAttempt {
    pub fn new(workspace: &Path, output: PathBuf) -> Self {
        Self {
            workspace: workspace.to_path_buf(),
            output,
            attempt: 0,
            last_error: None,
        }
    }
}

/// Resolve `workspace` to an existing directory.
pub fn validate_workspace(workspace: &Path) -> Result<PathBuf> {
    if !workspace.is_dir() {
        return Err(HotdlvError::NoWorkspace(workspace.to_path_buf()));
    }
    Ok(workspace
        .canonicalize()
        .unwrap_or_else(|_| workspace.to_path_buf()))
}

pub mod orchestrator;
pub mod retry;
pub mod session;

pub use orchestrator::Orchestrator;
pub use retry::{RetryPolicy, attempt_logged, backoff_delay, retry};
pub use session::{SessionState, SharedSession};
