// src/exec/mod.rs

//! Process execution layer.
//!
//! This module runs the two external programs a session depends on, using
//! `tokio::process::Command`:
//!
//! - [`builder`] runs the build toolchain and retires superseded binaries
//!   via [`retention`].
//! - [`launcher`] runs the headless debug server and owns its process
//!   through a [`launcher::DebugServerHandle`].
//! - [`streams`] forwards child stdout/stderr lines to the output channel.
//! - [`backend`] provides the [`BuildStep`] / [`LaunchStep`] traits the
//!   orchestrator is written against, so tests can replace real processes.

pub mod backend;
pub mod builder;
pub mod launcher;
pub mod retention;
pub mod streams;

pub use backend::{BuildStep, LaunchStep};
pub use builder::Builder;
pub use launcher::{DebugLauncher, DebugServerHandle, debug_server_args};
pub use retention::cleanup_old_binaries;
