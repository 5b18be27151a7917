// src/process/mod.rs

//! Process discovery and termination.
//!
//! - [`finder`] builds OS queries and parses their output.
//! - [`control`] defines the [`ProcessControl`] capability with POSIX and
//!   Windows implementations.
//! - [`terminator`] stops the session's debug server plus stray processes
//!   still running the session binary.

pub mod control;
pub mod finder;
pub mod terminator;

pub use control::{PosixProcessControl, ProcessControl, WindowsProcessControl, platform_control};
pub use finder::ProcessIdentity;
pub use terminator::{SETTLE_DELAY, Termination, Terminator};
