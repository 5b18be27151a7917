// src/process/finder.rs

//! Helpers for locating processes by the binary they run.
//!
//! The actual OS query is performed by a [`super::ProcessControl`]
//! implementation; this module holds the pure pieces (query construction and
//! output parsing) so they can be tested without spawning anything.

use std::path::{Path, PathBuf};

/// A candidate OS process. Produced by a finder query and consumed right
/// away by the terminator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessIdentity {
    pub pid: u32,
    pub binary: Option<PathBuf>,
}

impl ProcessIdentity {
    pub fn new(pid: u32, binary: Option<PathBuf>) -> Self {
        Self { pid, binary }
    }
}

/// Parse whitespace-separated PIDs from a helper's stdout.
///
/// Non-numeric tokens and zero are dropped, as is the orchestrator's own
/// PID.
pub fn parse_pid_list(output: &str) -> Vec<u32> {
    let own = std::process::id();
    let mut pids: Vec<u32> = output
        .split_whitespace()
        .filter_map(|tok| tok.parse::<u32>().ok())
        .filter(|pid| *pid != 0 && *pid != own)
        .collect();
    pids.dedup();
    pids
}

/// POSIX extended regex (`pgrep -f`) matching `binary` as a whole
/// command-line word, so `<dir>/app` does not match `<dir>/app-old`.
///
/// Escaped by hand: ERE leaves escapes such as `\-` undefined.
pub fn posix_pattern(binary: &Path) -> String {
    let raw = binary.to_string_lossy();
    let mut escaped = String::with_capacity(raw.len() + 40);
    escaped.push_str("(^|[[:space:]])");
    for ch in raw.chars() {
        if matches!(
            ch,
            '\\' | '.' | '[' | ']' | '(' | ')' | '*' | '+' | '?' | '{' | '}' | '|' | '^' | '$'
        ) {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped.push_str("([[:space:]]|$)");
    escaped
}

/// PowerShell pipeline listing the IDs of processes whose image path equals
/// `binary` exactly.
pub fn powershell_query(binary: &Path) -> String {
    let quoted = binary.to_string_lossy().replace('\'', "''");
    format!(
        "Get-Process | Where-Object {{ $_.Path -eq '{quoted}' }} | Select-Object -ExpandProperty Id"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_newline_and_space_separated_pids() {
        assert_eq!(parse_pid_list("123\n456\n"), vec![123, 456]);
        assert_eq!(parse_pid_list("  77 \r\n 88  "), vec![77, 88]);
    }

    #[test]
    fn drops_garbage_zero_and_self() {
        let own = std::process::id();
        let out = format!("0\nabc\n{own}\n42\n");
        assert_eq!(parse_pid_list(&out), vec![42]);
        assert!(parse_pid_list("").is_empty());
    }

    #[test]
    fn posix_pattern_escapes_regex_metacharacters() {
        let pattern = posix_pattern(Path::new("/ws/.tmp/app(1)"));
        assert_eq!(pattern, r"(^|[[:space:]])/ws/\.tmp/app\(1\)([[:space:]]|$)");
    }

    #[test]
    fn powershell_query_doubles_single_quotes() {
        let query = powershell_query(Path::new(r"C:\it's\app.exe"));
        assert!(query.contains(r"-eq 'C:\it''s\app.exe'"));
        assert!(query.ends_with("Select-Object -ExpandProperty Id"));
    }
}
