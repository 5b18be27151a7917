// src/config/poll.rs

use std::sync::LazyLock;

use regex::Regex;

/// Interval used when a poll interval is missing or malformed.
pub const DEFAULT_POLL_MS: u64 = 500;

static POLL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)(ms|s)$").expect("static poll regex"));

/// Parse a `<integer><unit>` duration (`ms` or `s`) into milliseconds.
///
/// Never fails: anything that does not match, or that overflows, yields
/// [`DEFAULT_POLL_MS`].
pub fn parse_poll(raw: &str) -> u64 {
    let Some(caps) = POLL_PATTERN.captures(raw) else {
        return DEFAULT_POLL_MS;
    };

    let Ok(value) = caps[1].parse::<u64>() else {
        return DEFAULT_POLL_MS;
    };

    match &caps[2] {
        "s" => value.checked_mul(1000).unwrap_or(DEFAULT_POLL_MS),
        _ => value,
    }
}
