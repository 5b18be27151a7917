// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::model::{RawConfigFile, Settings};
use crate::errors::Result;

/// Default config file name, looked up in the workspace root.
pub const DEFAULT_CONFIG_FILE: &str = "Hotdlv.toml";

/// Load a configuration file from a given path and return the raw
/// `RawConfigFile`.
///
/// This only performs TOML deserialization; semantic validation happens in
/// [`load_and_validate`].
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawConfigFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let config: RawConfigFile = toml::from_str(&contents)?;

    Ok(config)
}

/// Load a configuration file from path and validate its `[hotdlv]` section.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<Settings> {
    let raw = load_from_path(&path)?;
    Settings::try_from(raw.hotdlv)
}

/// Resolve the settings for a session.
///
/// - An explicit path must exist and parse.
/// - Without one, `Hotdlv.toml` in the workspace is used if present,
///   otherwise the built-in defaults apply.
pub fn load_settings(explicit: Option<&Path>, workspace: &Path) -> Result<Settings> {
    if let Some(path) = explicit {
        debug!(path = %path.display(), "loading explicit config");
        return load_and_validate(path);
    }

    let candidate = default_config_path(workspace);
    if candidate.is_file() {
        debug!(path = %candidate.display(), "loading workspace config");
        load_and_validate(&candidate)
    } else {
        debug!("no config file found; using defaults");
        Ok(Settings::default())
    }
}

/// `Hotdlv.toml` inside the given workspace.
pub fn default_config_path(workspace: &Path) -> PathBuf {
    workspace.join(DEFAULT_CONFIG_FILE)
}
