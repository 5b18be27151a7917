// src/config/validate.rs

use globset::Glob;

use crate::config::model::{RawSettings, Settings};
use crate::errors::{HotdlvError, Result};

impl TryFrom<RawSettings> for Settings {
    type Error = HotdlvError;

    fn try_from(raw: RawSettings) -> std::result::Result<Self, Self::Error> {
        validate_raw_settings(&raw)?;
        Ok(Settings::new_unchecked(raw))
    }
}

/// Semantic checks on `[hotdlv]`.
///
/// `poll` is not checked: a malformed interval degrades to the
/// default in `parse_poll`.
fn validate_raw_settings(raw: &RawSettings) -> Result<()> {
    ensure_non_empty("program", &raw.program)?;
    ensure_non_empty("output", &raw.output)?;
    ensure_non_empty("toolchain", &raw.toolchain)?;
    ensure_non_empty("debug_server", &raw.debug_server)?;
    ensure_non_empty("binary_prefix", &raw.binary_prefix)?;

    if raw.port == 0 {
        return Err(HotdlvError::ConfigError(
            "[hotdlv].port must be between 1 and 65535 (got 0)".to_string(),
        ));
    }

    validate_watch_dirs(raw)?;
    validate_ignore_globs(raw)?;
    validate_attach_command(raw)?;
    Ok(())
}

fn ensure_non_empty(key: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(HotdlvError::ConfigError(format!(
            "[hotdlv].{key} must not be empty"
        )));
    }
    Ok(())
}

fn validate_watch_dirs(raw: &RawSettings) -> Result<()> {
    if raw.watch_dirs.is_empty() {
        return Err(HotdlvError::ConfigError(
            "[hotdlv].watch_dirs must list at least one directory".to_string(),
        ));
    }
    if let Some(blank) = raw.watch_dirs.iter().position(|d| d.trim().is_empty()) {
        return Err(HotdlvError::ConfigError(format!(
            "[hotdlv].watch_dirs[{blank}] is empty"
        )));
    }
    Ok(())
}

fn validate_ignore_globs(raw: &RawSettings) -> Result<()> {
    for pattern in raw.ignore.iter() {
        Glob::new(pattern).map_err(|e| {
            HotdlvError::ConfigError(format!(
                "invalid [hotdlv].ignore pattern '{pattern}': {e}"
            ))
        })?;
    }
    Ok(())
}

fn validate_attach_command(raw: &RawSettings) -> Result<()> {
    match raw.attach_command.as_deref() {
        Some([]) => Err(HotdlvError::ConfigError(
            "[hotdlv].attach_command must contain at least the program".to_string(),
        )),
        Some([program, ..]) if program.trim().is_empty() => Err(HotdlvError::ConfigError(
            "[hotdlv].attach_command program must not be empty".to_string(),
        )),
        _ => Ok(()),
    }
}
