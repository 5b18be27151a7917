// src/attach/host.rs

//! The debugger front end a session attaches to.

use std::process::Stdio;
use std::sync::Mutex;
use std::time::Duration;

use tokio::process::{Child, Command};
use tokio::time::timeout;
use tracing::{debug, info};

use crate::errors::{HotdlvError, Result};
use crate::exec::streams::{LineSource, forward_lines};
use crate::output::OutputChannel;
use crate::types::{API_VERSION, BoxFuture, DEBUG_HOST};

/// Remote-attach request sent to the debugger front end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachRequest {
    pub name: String,
    /// Debugger kind; also the kind an already active session must have.
    pub kind: String,
    pub request: String,
    pub mode: String,
    pub host: String,
    pub port: u16,
    pub api_version: u32,
}

impl AttachRequest {
    /// Remote attach to the local headless debug server.
    pub fn remote(port: u16) -> Self {
        Self {
            name: "Attach hotdlv".to_string(),
            kind: "go".to_string(),
            request: "attach".to_string(),
            mode: "remote".to_string(),
            host: DEBUG_HOST.to_string(),
            port,
            api_version: API_VERSION,
        }
    }
}

/// Debugger front end capable of attaching to a headless debug server.
pub trait DebuggerHost: Send + Sync {
    /// Whether a debugger session of the expected kind is already live.
    fn has_active_session(&self) -> bool;

    /// Ask the front end to attach. `Ok(false)` means it declined.
    fn attach<'a>(&'a self, request: &'a AttachRequest) -> BoxFuture<'a, Result<bool>>;
}

/// Used when no attach command is configured: announces the endpoint so a
/// debugger can be connected by hand, and counts that as attached.
#[derive(Debug, Clone)]
pub struct AnnounceDebuggerHost {
    out: OutputChannel,
}

impl AnnounceDebuggerHost {
    pub fn new(out: OutputChannel) -> Self {
        Self { out }
    }
}

impl DebuggerHost for AnnounceDebuggerHost {
    fn has_active_session(&self) -> bool {
        false
    }

    fn attach<'a>(&'a self, request: &'a AttachRequest) -> BoxFuture<'a, Result<bool>> {
        Box::pin(async move {
            self.out.log(format!(
                "debug server ready: attach a {} debugger in {} mode to {}:{} (api v{})",
                request.kind, request.mode, request.host, request.port, request.api_version
            ));
            Ok(true)
        })
    }
}

/// Runs a user-supplied client command to attach, e.g. an editor CLI hook.
///
/// A client that keeps running past the grace period counts as an active
/// session until it exits. One that exits within the grace period must exit
/// with status 0 to count as attached.
pub struct CommandDebuggerHost {
    argv: Vec<String>,
    grace: Duration,
    client: Mutex<Option<Child>>,
    out: OutputChannel,
}

/// How long a client must keep running to count as attached.
pub const CLIENT_GRACE: Duration = Duration::from_millis(200);

impl CommandDebuggerHost {
    /// `argv` must be non-empty (enforced by config validation).
    pub fn new(argv: Vec<String>, out: OutputChannel) -> Self {
        Self {
            argv,
            grace: CLIENT_GRACE,
            client: Mutex::new(None),
            out,
        }
    }

    pub fn with_grace(mut self, grace: Duration) -> Self {
        self.grace = grace;
        self
    }
}

/// Replace `{host}` and `{port}` in each argument.
pub fn substitute_args(args: &[String], request: &AttachRequest) -> Vec<String> {
    args.iter()
        .map(|a| {
            a.replace("{host}", &request.host)
                .replace("{port}", &request.port.to_string())
        })
        .collect()
}

impl DebuggerHost for CommandDebuggerHost {
    fn has_active_session(&self) -> bool {
        let Ok(mut client) = self.client.lock() else {
            return false;
        };
        match client.as_mut() {
            Some(child) => matches!(child.try_wait(), Ok(None)),
            None => false,
        }
    }

    fn attach<'a>(&'a self, request: &'a AttachRequest) -> BoxFuture<'a, Result<bool>> {
        Box::pin(async move {
            let Some((program, rest)) = self.argv.split_first() else {
                return Err(HotdlvError::ConfigError(
                    "attach command is empty".to_string(),
                ));
            };
            let args = substitute_args(rest, request);
            info!(%program, ?args, "running attach command");

            let mut child = Command::new(program)
                .args(&args)
                .env("HOTDLV_HOST", &request.host)
                .env("HOTDLV_PORT", request.port.to_string())
                .env("HOTDLV_API_VERSION", request.api_version.to_string())
                .stdin(Stdio::null())
                .stdout(Stdio::piped())
                .stderr(Stdio::piped())
                .kill_on_drop(true)
                .spawn()
                .map_err(|source| HotdlvError::SpawnError {
                    program: program.clone(),
                    source,
                })?;

            if let Some(stdout) = child.stdout.take() {
                forward_lines(stdout, LineSource::AttachStdout, self.out.clone());
            }
            if let Some(stderr) = child.stderr.take() {
                forward_lines(stderr, LineSource::AttachStderr, self.out.clone());
            }

            match timeout(self.grace, child.wait()).await {
                Ok(Ok(status)) => {
                    debug!(%status, "attach command exited within grace period");
                    Ok(status.success())
                }
                Ok(Err(e)) => Err(e.into()),
                Err(_) => {
                    // Still running: keep it as the live session. A previous
                    // client, if any, is dropped and killed.
                    if let Ok(mut client) = self.client.lock() {
                        *client = Some(child);
                    }
                    Ok(true)
                }
            }
        })
    }
}
