// src/exec/launcher.rs

//! Starts the built binary under the headless debug server.

use std::fmt;
use std::path::Path;
use std::process::Stdio;
use std::sync::Arc;

use tokio::process::{Child, Command};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::attach::AttachmentPoller;
use crate::config::RunConfiguration;
use crate::engine::session::SharedSession;
use crate::exec::backend::LaunchStep;
use crate::exec::streams::{LineSource, forward_lines};
use crate::output::OutputChannel;
use crate::types::{API_VERSION, BoxFuture, DEBUG_HOST};

/// Handle for a running debug server process.
///
/// - `cancel` asks the monitor task to kill the process.
/// - `task` is the Tokio task that owns the child and completes once it has
///   exited.
///
/// Dropping the handle without calling [`DebugServerHandle::shutdown`] also
/// kills the process: the monitor sees its cancel channel close.
pub struct DebugServerHandle {
    pid: Option<u32>,
    cancel: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
}

impl fmt::Debug for DebugServerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DebugServerHandle")
            .field("pid", &self.pid)
            .field("running", &!self.task.is_finished())
            .finish()
    }
}

impl DebugServerHandle {
    /// Assemble a handle from its parts. The task must finish once `cancel`
    /// fires or is dropped.
    pub fn from_parts(pid: Option<u32>, cancel: oneshot::Sender<()>, task: JoinHandle<()>) -> Self {
        Self {
            pid,
            cancel: Some(cancel),
            task,
        }
    }

    pub fn pid(&self) -> Option<u32> {
        self.pid
    }

    /// Request termination and wait until the process has closed.
    pub async fn shutdown(self) {
        let DebugServerHandle { pid, cancel, task } = self;
        if let Some(cancel) = cancel {
            if cancel.send(()).is_err() {
                debug!(?pid, "debug server already exited");
            }
        }
        if let Err(e) = task.await {
            warn!(?pid, error = %e, "debug server monitor task failed");
        }
    }
}

/// Debug server arguments for `binary` listening on `port`.
pub fn debug_server_args(binary: &Path, port: u16) -> Vec<String> {
    vec![
        "exec".to_string(),
        binary.to_string_lossy().into_owned(),
        "--headless".to_string(),
        format!("--listen={DEBUG_HOST}:{port}"),
        format!("--api-version={API_VERSION}"),
        "--accept-multiclient".to_string(),
    ]
}

/// Production [`LaunchStep`].
pub struct DebugLauncher {
    config: Arc<RunConfiguration>,
    session: SharedSession,
    poller: Arc<AttachmentPoller>,
    out: OutputChannel,
}

impl DebugLauncher {
    pub fn new(
        config: Arc<RunConfiguration>,
        session: SharedSession,
        poller: Arc<AttachmentPoller>,
        out: OutputChannel,
    ) -> Self {
        Self {
            config,
            session,
            poller,
            out,
        }
    }

    /// Spawn the debug server for `binary`, store its handle in the session
    /// and start polling for a debugger attachment in the background.
    pub fn start(&self, workspace: &Path, binary: &Path) {
        let args = debug_server_args(binary, self.config.port);
        info!(server = %self.config.debug_server, ?args, "starting debug server");

        let mut cmd = Command::new(&self.config.debug_server);
        cmd.args(&args)
            .current_dir(workspace)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = match cmd.spawn() {
            Ok(child) => child,
            Err(e) => {
                self.out.log(format!("[dlv error] {e}"));
                return;
            }
        };

        if let Some(stdout) = child.stdout.take() {
            forward_lines(stdout, LineSource::ServerStdout, self.out.clone());
        }
        if let Some(stderr) = child.stderr.take() {
            forward_lines(stderr, LineSource::ServerStderr, self.out.clone());
        }

        let pid = child.id();
        let (cancel_tx, cancel_rx) = oneshot::channel::<()>();
        let task = tokio::spawn(monitor(child, cancel_rx, self.out.clone()));

        self.session
            .install_debug_server(DebugServerHandle::from_parts(pid, cancel_tx, task));
        self.out.log(format!(
            "Debug server started (pid={}) on {DEBUG_HOST}:{}",
            pid.map(|p| p.to_string()).unwrap_or_else(|| "?".to_string()),
            self.config.port
        ));

        let tracker = Arc::clone(&self.poller).spawn();
        self.session.set_attach_tracker(tracker);
    }
}

impl LaunchStep for DebugLauncher {
    fn launch<'a>(&'a self, workspace: &'a Path, binary: &'a Path) -> BoxFuture<'a, ()> {
        Box::pin(async move { self.start(workspace, binary) })
    }
}

/// Own the child until it exits on its own or is cancelled.
async fn monitor(mut child: Child, mut cancel_rx: oneshot::Receiver<()>, out: OutputChannel) {
    tokio::select! {
        status = child.wait() => {
            match status {
                Ok(status) => out.log(format!("[dlv exited with code {}]", exit_code(status))),
                Err(e) => out.log(format!("[dlv error] {e}")),
            }
        }

        cancel = &mut cancel_rx => {
            if cancel.is_err() {
                debug!("debug server handle dropped; killing replaced process");
            }
            if let Err(e) = child.kill().await {
                warn!(error = %e, "failed to kill debug server");
            }
            match child.wait().await {
                Ok(status) => out.log(format!("[dlv exited with code {}]", exit_code(status))),
                Err(e) => debug!(error = %e, "waiting for killed debug server"),
            }
        }
    }
}

fn exit_code(status: std::process::ExitStatus) -> String {
    status
        .code()
        .map(|c| c.to_string())
        .unwrap_or_else(|| "null".to_string())
}
