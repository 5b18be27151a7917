// src/exec/backend.rs

//! Pluggable build / launch abstraction.
//!
//! The orchestrator talks to a [`BuildStep`] and a [`LaunchStep`] instead of
//! spawning processes itself. Production uses [`super::Builder`] and
//! [`super::DebugLauncher`]; tests swap in fakes that record calls and never
//! touch the OS.

use std::path::{Path, PathBuf};

use crate::errors::Result;
use crate::types::BoxFuture;

/// Produces a fresh binary for a workspace.
pub trait BuildStep: Send + Sync {
    /// Build and return the realized output path.
    ///
    /// A failure must leave the session untouched.
    fn build<'a>(&'a self, workspace: &'a Path) -> BoxFuture<'a, Result<PathBuf>>;
}

/// Starts a freshly built binary under the debug server.
pub trait LaunchStep: Send + Sync {
    /// Launch `binary`. Spawn failures are logged by the implementation, not
    /// returned: launching is never retried on its own.
    fn launch<'a>(&'a self, workspace: &'a Path, binary: &'a Path) -> BoxFuture<'a, ()>;
}
