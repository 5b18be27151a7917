// src/errors.rs

//! Crate-wide error aliases and helpers.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum HotdlvError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    /// The workspace root is missing or not a directory.
    #[error("No workspace folder open: {}", .0.display())]
    NoWorkspace(PathBuf),

    /// The build toolchain exited unsuccessfully. `None` means it was
    /// terminated by a signal.
    #[error("Build failed with code {}", code.map(|c| c.to_string()).unwrap_or_else(|| "<signal>".to_string()))]
    BuildFailed { code: Option<i32> },

    #[error("failed to spawn '{program}': {source}")]
    SpawnError {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, HotdlvError>;
