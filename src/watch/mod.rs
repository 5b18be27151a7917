// src/watch/mod.rs

//! File watching.
//!
//! This module is responsible for:
//! - Compiling the `ignore` glob patterns.
//! - Wiring up a polling or native filesystem watcher (`notify`) on the
//!   configured watch directories.
//! - Turning relevant changes into [`WatchTrigger`]s for the orchestrator.
//!
//! It does **not** restart anything itself.

pub mod path_utils;
pub mod patterns;
pub mod watcher;

pub use patterns::IgnoreSet;
pub use watcher::{ChangeKind, WatchTrigger, WatcherHandle, classify_event, spawn_watcher};
