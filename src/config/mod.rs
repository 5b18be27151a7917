// src/config/mod.rs

//! Configuration for hotdlv.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a config file from disk (`loader.rs`).
//! - Validate basic invariants (`validate.rs`).
//! - Resolve the per-session launch configuration (`launch.rs`) and turn it
//!   into the immutable [`RunConfiguration`] (`run.rs`).
//! - Parse poll interval strings (`poll.rs`).

pub mod launch;
pub mod loader;
pub mod model;
pub mod poll;
pub mod run;
pub mod validate;

pub use launch::{DebugLaunchConfig, LaunchOverrides, resolve_debug_configuration};
pub use loader::{load_and_validate, load_from_path, load_settings};
pub use model::{RawConfigFile, RawSettings, Settings};
pub use poll::{DEFAULT_POLL_MS, parse_poll};
pub use run::{RunConfiguration, resolve_output};
