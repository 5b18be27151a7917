// src/exec/streams.rs

//! Forwarding of child process output to the output channel.

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::task::JoinHandle;
use tracing::trace;

use crate::output::OutputChannel;

/// Which stream of which process a line came from. Decides how the line is
/// rendered on the output channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineSource {
    BuildStdout,
    BuildStderr,
    ServerStdout,
    ServerStderr,
    AttachStdout,
    AttachStderr,
}

impl LineSource {
    fn emit(self, out: &OutputChannel, line: &str) {
        match self {
            LineSource::BuildStdout => out.log(format!("[build stdout] {}", line.trim())),
            LineSource::BuildStderr => out.log(format!("[build stderr] {}", line.trim())),
            LineSource::ServerStdout => out.raw(line),
            LineSource::ServerStderr => out.raw(format!("[stderr] {line}")),
            LineSource::AttachStdout => out.raw(format!("[attach] {line}")),
            LineSource::AttachStderr => out.raw(format!("[attach stderr] {line}")),
        }
    }
}

/// Spawn a task that reads `reader` line by line until EOF and forwards each
/// line to `out`.
///
/// Always drain child pipes, otherwise a chatty child blocks once the OS
/// buffer fills up.
pub fn forward_lines<R>(reader: R, source: LineSource, out: OutputChannel) -> JoinHandle<()>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut lines = BufReader::new(reader).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            if line.trim().is_empty() {
                continue;
            }
            source.emit(&out, &line);
        }
        trace!(?source, "stream closed");
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::MemorySink;
    use std::sync::Arc;

    #[tokio::test]
    async fn forwards_non_empty_lines_with_source_prefix() {
        let sink = MemorySink::new();
        let out = OutputChannel::new(Arc::new(sink.clone()));

        let input: &[u8] = b"main.go:3: undefined: x\n\n  \nexit status 2\n";
        forward_lines(input, LineSource::BuildStderr, out.clone())
            .await
            .unwrap();
        forward_lines(&b"listening\n"[..], LineSource::ServerStderr, out)
            .await
            .unwrap();

        assert_eq!(
            sink.lines(),
            vec![
                "[hotdlv] [build stderr] main.go:3: undefined: x".to_string(),
                "[hotdlv] [build stderr] exit status 2".to_string(),
                "[stderr] listening".to_string(),
            ]
        );
    }
}
