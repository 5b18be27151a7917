// src/attach/mod.rs

//! Debugger attachment.
//!
//! - [`probe`] checks whether the debug server port is connectable.
//! - [`host`] abstracts the debugger front end that performs the remote
//!   attach.
//! - [`poller`] runs the deadline-bounded attach loop as a tracked,
//!   detached task.

pub mod host;
pub mod poller;
pub mod probe;

pub use host::{AnnounceDebuggerHost, AttachRequest, CommandDebuggerHost, DebuggerHost};
pub use poller::{AttachState, AttachTracker, AttachmentPoller};
pub use probe::{PortProber, TcpPortProber};
