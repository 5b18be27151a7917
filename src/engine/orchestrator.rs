// src/engine/orchestrator.rs

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::sync::{Mutex, mpsc};
use tracing::{debug, info, warn};

use crate::attach::{
    AnnounceDebuggerHost, AttachmentPoller, CommandDebuggerHost, DebuggerHost, TcpPortProber,
};
use crate::config::RunConfiguration;
use crate::engine::retry::{RetryPolicy, retry};
use crate::engine::session::SharedSession;
use crate::engine::{RestartAttempt, RestartOutcome, validate_workspace};
use crate::errors::Result;
use crate::exec::{BuildStep, Builder, DebugLauncher, LaunchStep};
use crate::fs::RealFileSystem;
use crate::output::OutputChannel;
use crate::process::{ProcessControl, Termination, Terminator, platform_control};
use crate::types::OverlapPolicy;
use crate::watch::{WatchTrigger, spawn_watcher};

/// Kill, rebuild, relaunch and reattach on every trigger.
pub struct Orchestrator {
    config: Arc<RunConfiguration>,
    session: SharedSession,
    terminator: Terminator,
    build: Arc<dyn BuildStep>,
    launch: Arc<dyn LaunchStep>,
    out: OutputChannel,
    retry: RetryPolicy,
    /// Held for the whole duration of a queued restart.
    flight: Mutex<()>,
    /// Set while one queued restart waits for `flight`.
    waiting: AtomicBool,
}

impl Orchestrator {
    pub fn new(
        config: Arc<RunConfiguration>,
        session: SharedSession,
        control: Arc<dyn ProcessControl>,
        build: Arc<dyn BuildStep>,
        launch: Arc<dyn LaunchStep>,
        out: OutputChannel,
    ) -> Self {
        let terminator = Terminator::new(control, session.clone(), out.clone());
        Self {
            config,
            session,
            terminator,
            build,
            launch,
            out,
            retry: RetryPolicy::RESTART,
            flight: Mutex::new(()),
            waiting: AtomicBool::new(false),
        }
    }

    /// Wire up the real builder, debug launcher, process control and
    /// debugger host for `config`.
    pub fn production(config: Arc<RunConfiguration>, out: OutputChannel) -> Self {
        let session = SharedSession::default();

        let host: Arc<dyn DebuggerHost> = match &config.attach_command {
            Some(argv) => Arc::new(CommandDebuggerHost::new(argv.clone(), out.clone())),
            None => Arc::new(AnnounceDebuggerHost::new(out.clone())),
        };
        let poller = Arc::new(AttachmentPoller::new(
            config.port,
            host,
            Arc::new(TcpPortProber),
            out.clone(),
        ));

        let build = Arc::new(Builder::new(
            Arc::clone(&config),
            Arc::new(RealFileSystem),
            out.clone(),
        ));
        let launch = Arc::new(DebugLauncher::new(
            Arc::clone(&config),
            session.clone(),
            poller,
            out.clone(),
        ));

        Self::new(config, session, platform_control(), build, launch, out)
    }

    pub fn with_retry(mut self, policy: RetryPolicy) -> Self {
        self.retry = policy;
        self
    }

    pub fn with_settle(mut self, settle: Duration) -> Self {
        self.terminator = self.terminator.with_settle(settle);
        self
    }

    pub fn session(&self) -> &SharedSession {
        &self.session
    }

    pub fn out(&self) -> &OutputChannel {
        &self.out
    }

    pub fn config(&self) -> &RunConfiguration {
        &self.config
    }

    /// Restart the debug session under the configured overlap policy.
    pub async fn restart(&self, workspace: &Path) -> Result<RestartOutcome> {
        match self.config.overlap {
            OverlapPolicy::Concurrent => self.restart_now(workspace).await,
            OverlapPolicy::Queue => {
                let _guard = match self.flight.try_lock() {
                    Ok(guard) => guard,
                    Err(_) => {
                        if self.waiting.swap(true, Ordering::SeqCst) {
                            debug!("restart already queued; coalescing trigger");
                            return Ok(RestartOutcome::Coalesced);
                        }
                        let guard = self.flight.lock().await;
                        self.waiting.store(false, Ordering::SeqCst);
                        guard
                    }
                };
                self.restart_now(workspace).await
            }
        }
    }

    async fn restart_now(&self, workspace: &Path) -> Result<RestartOutcome> {
        self.out.log("Restarting debug server with fresh binary");
        let mut record = RestartAttempt::new(workspace, self.config.output_path(workspace));
        self.terminator.terminate(Some(&record.output)).await;

        let result = retry(self.retry, &self.out, |attempt| {
            record.attempt = attempt;
            async move {
                let binary = self.build.build(workspace).await?;
                self.launch.launch(workspace, &binary).await;
                Ok(binary)
            }
        })
        .await;

        match result {
            Ok(binary) => {
                info!(binary = %binary.display(), attempts = record.attempt, "restart complete");
                Ok(RestartOutcome::Restarted {
                    binary,
                    attempts: record.attempt,
                })
            }
            Err(e) => {
                record.last_error = Some(e.to_string());
                warn!(?record, "restart gave up");
                Err(e)
            }
        }
    }

    /// Validate the workspace, replace any running session, restart once
    /// and start watching for changes.
    ///
    /// A failed initial restart is reported and watching still begins.
    pub async fn start(self: &Arc<Self>, workspace: &Path) -> Result<()> {
        let workspace = self.prepare(workspace).await?;

        if let Err(e) = self.restart(&workspace).await {
            self.out.log(format!("Initial restart failed: {e}"));
            warn!(error = %e, "initial restart failed; waiting for changes");
        }

        let (tx, rx) = mpsc::channel::<WatchTrigger>(64);
        let watcher = spawn_watcher(&workspace, &self.config, tx)?;
        self.session.install_watcher(watcher);
        tokio::spawn(Arc::clone(self).dispatch(workspace, rx));

        self.out.log("hotdlv started.");
        Ok(())
    }

    /// Like [`Orchestrator::start`] without the watcher. The restart error,
    /// if any, is returned.
    pub async fn start_once(&self, workspace: &Path) -> Result<RestartOutcome> {
        let workspace = self.prepare(workspace).await?;
        self.restart(&workspace).await
    }

    /// Stop watching and terminate the session binary. An in-flight build is
    /// left to finish.
    pub async fn shutdown(&self, workspace: &Path) -> Termination {
        if self.session.take_watcher().is_some() {
            debug!("watcher dropped");
        }
        let workspace = validate_workspace(workspace).unwrap_or_else(|_| workspace.to_path_buf());
        let output = self.config.output_path(&workspace);
        self.terminator.terminate(Some(&output)).await
    }

    async fn prepare(&self, workspace: &Path) -> Result<PathBuf> {
        let workspace = validate_workspace(workspace)?;
        if let Some(existing) = self.session.take_debug_server() {
            self.out.log("Existing dlv process found. Killing...");
            existing.shutdown().await;
        }
        Ok(workspace)
    }

    async fn dispatch(
        self: Arc<Self>,
        workspace: PathBuf,
        mut triggers: mpsc::Receiver<WatchTrigger>,
    ) {
        while let Some(trigger) = triggers.recv().await {
            debug!(path = %trigger.path.display(), kind = ?trigger.kind, "change detected");
            let this = Arc::clone(&self);
            let workspace = workspace.clone();
            tokio::spawn(async move {
                if let Err(e) = this.restart(&workspace).await {
                    this.out.log(format!("Restart failed: {e}"));
                }
            });
        }
        debug!("trigger channel closed; dispatch loop finished");
    }
}
