// src/process/terminator.rs

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, info};

use crate::engine::retry::attempt_logged;
use crate::engine::session::SharedSession;
use crate::output::OutputChannel;
use crate::process::control::ProcessControl;

/// Pause after killing, so the OS releases the binary before a rebuild
/// overwrites it.
pub const SETTLE_DELAY: Duration = Duration::from_millis(300);

/// What a termination targeted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Termination {
    pub pids: Vec<u32>,
    pub had_known_handle: bool,
}

impl Termination {
    pub fn is_noop(&self) -> bool {
        self.pids.is_empty() && !self.had_known_handle
    }
}

/// Stops the session's debug server and any stray processes running the
/// session binary.
#[derive(Clone)]
pub struct Terminator {
    control: Arc<dyn ProcessControl>,
    session: SharedSession,
    out: OutputChannel,
    settle: Duration,
}

impl Terminator {
    pub fn new(
        control: Arc<dyn ProcessControl>,
        session: SharedSession,
        out: OutputChannel,
    ) -> Self {
        Self {
            control,
            session,
            out,
            settle: SETTLE_DELAY,
        }
    }

    pub fn with_settle(mut self, settle: Duration) -> Self {
        self.settle = settle;
        self
    }

    /// Kill the known debug server plus every process found running
    /// `binary`, then wait for the settle delay.
    ///
    /// Resolves immediately when there is nothing to kill. Individual kill
    /// failures are ignored since the target may already be gone.
    pub async fn terminate(&self, binary: Option<&Path>) -> Termination {
        // The stored handle is cleared before any signal goes out, so a
        // concurrently scheduled launch never sees a handle that is about to
        // die.
        let known = self.session.take_debug_server();

        let mut pids: Vec<u32> = known.as_ref().and_then(|h| h.pid()).into_iter().collect();
        if let Some(binary) = binary {
            for found in self.control.find_by_binary(binary).await {
                if !pids.contains(&found.pid) {
                    pids.push(found.pid);
                }
            }
        }

        let report = Termination {
            pids,
            had_known_handle: known.is_some(),
        };

        if report.is_noop() {
            debug!("nothing to terminate");
            return report;
        }

        for pid in report.pids.iter().copied() {
            let killed = attempt_logged(&format!("kill pid {pid}"), self.control.kill(pid)).await;
            debug!(pid, killed, "kill signal issued");
        }

        if let Some(handle) = known {
            handle.shutdown().await;
        }

        let joined = report
            .pids
            .iter()
            .map(u32::to_string)
            .collect::<Vec<_>>()
            .join(",");
        self.out.log(format!("dlv process closed (pids={joined})"));
        info!(pids = %joined, settle_ms = self.settle.as_millis() as u64, "terminated; settling");

        sleep(self.settle).await;
        report
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::exec::launcher::DebugServerHandle;
    use crate::output::MemorySink;
    use crate::process::finder::ProcessIdentity;
    use crate::types::BoxFuture;

    #[derive(Default)]
    struct StaticControl {
        found: Vec<u32>,
        killed: Mutex<Vec<u32>>,
    }

    impl ProcessControl for StaticControl {
        fn find_by_binary<'a>(&'a self, binary: &'a Path) -> BoxFuture<'a, Vec<ProcessIdentity>> {
            let found = self
                .found
                .iter()
                .map(|pid| ProcessIdentity::new(*pid, Some(binary.to_path_buf())))
                .collect();
            Box::pin(async move { found })
        }

        fn kill(&self, pid: u32) -> BoxFuture<'_, std::io::Result<()>> {
            self.killed.lock().unwrap().push(pid);
            Box::pin(async { Err(std::io::Error::other("no such process")) })
        }
    }

    fn terminator(control: Arc<StaticControl>, session: SharedSession) -> (Terminator, MemorySink) {
        let sink = MemorySink::new();
        let out = OutputChannel::new(Arc::new(sink.clone()));
        (Terminator::new(control, session, out), sink)
    }

    #[tokio::test(start_paused = true)]
    async fn terminating_twice_with_nothing_running_is_a_noop() {
        let control = Arc::new(StaticControl::default());
        let (term, sink) = terminator(control.clone(), SharedSession::default());

        let first = term.terminate(Some(Path::new("/ws/.tmp/app"))).await;
        let second = term.terminate(None).await;

        assert!(first.is_noop());
        assert!(second.is_noop());
        assert!(control.killed.lock().unwrap().is_empty());
        assert!(sink.lines().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn known_handle_is_cleared_and_strays_are_killed() {
        let control = Arc::new(StaticControl {
            found: vec![4242, 99],
            ..StaticControl::default()
        });
        let session = SharedSession::default();

        let (cancel_tx, cancel_rx) = tokio::sync::oneshot::channel();
        let task = tokio::spawn(async move {
            let _ = cancel_rx.await;
        });
        session.install_debug_server(DebugServerHandle::from_parts(Some(99), cancel_tx, task));

        let (term, sink) = terminator(control.clone(), session.clone());
        let started = tokio::time::Instant::now();
        let report = term.terminate(Some(Path::new("/ws/.tmp/app"))).await;

        assert_eq!(report.pids, vec![99, 4242]);
        assert!(report.had_known_handle);
        assert!(!session.has_debug_server());
        assert_eq!(*control.killed.lock().unwrap(), vec![99, 4242]);
        assert!(sink.contains("dlv process closed (pids=99,4242)"));
        assert!(started.elapsed() >= SETTLE_DELAY);
    }
}
