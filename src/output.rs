// src/output.rs

//! User-visible output channel.
//!
//! Every state transition of a hot-reload session and every line printed by
//! the build toolchain or the debug server is appended here, prefixed with
//! [`OUTPUT_TAG`]. The channel is backed by a [`LogSink`] so tests can capture
//! lines in order while production forwards them to `tracing`.

use std::fmt;
use std::sync::{Arc, Mutex};

use tracing::info;

/// Fixed prefix for every line written to the output channel.
pub const OUTPUT_TAG: &str = "[hotdlv]";

/// Destination for output-channel lines.
pub trait LogSink: Send + Sync {
    fn append_line(&self, line: &str);
}

/// Production sink: emits each line as an `info` event.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn append_line(&self, line: &str) {
        info!(target: "hotdlv::output", "{line}");
    }
}

/// In-memory sink that records every line.
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    lines: Arc<Mutex<Vec<String>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all lines recorded so far.
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().map(|l| l.clone()).unwrap_or_default()
    }

    /// Index of the first recorded line containing `needle`.
    pub fn position(&self, needle: &str) -> Option<usize> {
        self.lines().iter().position(|l| l.contains(needle))
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.position(needle).is_some()
    }
}

impl LogSink for MemorySink {
    fn append_line(&self, line: &str) {
        if let Ok(mut lines) = self.lines.lock() {
            lines.push(line.to_string());
        }
    }
}

/// Cloneable handle to the session's output channel.
#[derive(Clone)]
pub struct OutputChannel {
    sink: Arc<dyn LogSink>,
}

impl fmt::Debug for OutputChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OutputChannel").finish_non_exhaustive()
    }
}

impl Default for OutputChannel {
    fn default() -> Self {
        Self::new(Arc::new(TracingSink))
    }
}

impl OutputChannel {
    pub fn new(sink: Arc<dyn LogSink>) -> Self {
        Self { sink }
    }

    /// Append a tagged line.
    pub fn log(&self, message: impl AsRef<str>) {
        self.sink
            .append_line(&format!("{OUTPUT_TAG} {}", message.as_ref()));
    }

    /// Append a raw line from a subprocess, without the tag.
    pub fn raw(&self, line: impl AsRef<str>) {
        self.sink.append_line(line.as_ref());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tagged_and_raw_lines_are_recorded_in_order() {
        let sink = MemorySink::new();
        let out = OutputChannel::new(Arc::new(sink.clone()));

        out.log("Build successful");
        out.raw("API server listening at: 127.0.0.1:40000");

        assert_eq!(
            sink.lines(),
            vec![
                "[hotdlv] Build successful".to_string(),
                "API server listening at: 127.0.0.1:40000".to_string(),
            ]
        );
        assert_eq!(sink.position("API server"), Some(1));
    }
}
