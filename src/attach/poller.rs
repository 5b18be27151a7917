// src/attach/poller.rs

//! Attachment poller.
//!
//! ```text
//! Idle -> Polling -> Attached
//!                 -> TimedOut
//! ```
//!
//! Once the debug server is spawned, the poller waits for its port to accept
//! connections and asks the [`DebuggerHost`] to attach, backing off between
//! attempts until a deadline. Timing out is reported but not fatal: the
//! binary keeps running undebugged until the next restart.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::{Instant, sleep};
use tracing::{debug, info, warn};

use crate::attach::host::{AttachRequest, DebuggerHost};
use crate::attach::probe::PortProber;
use crate::engine::retry::backoff_delay;
use crate::output::OutputChannel;

/// Poller lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachState {
    Idle,
    Polling,
    Attached,
    TimedOut,
}

impl AttachState {
    pub fn is_terminal(self) -> bool {
        matches!(self, AttachState::Attached | AttachState::TimedOut)
    }
}

/// Timing of the poll loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PollTiming {
    /// Total budget measured from entering `Polling`.
    deadline: Duration,
    /// Connect timeout of a single port probe.
    probe_timeout: Duration,
    /// Pause after a probe found the port closed.
    closed_port_wait: Duration,
}

impl Default for PollTiming {
    fn default() -> Self {
        Self {
            deadline: Duration::from_secs(15),
            probe_timeout: Duration::from_millis(150),
            closed_port_wait: Duration::from_millis(100),
        }
    }
}

/// Observer of a detached poll. Cheap to clone.
#[derive(Debug, Clone)]
pub struct AttachTracker {
    state: watch::Receiver<AttachState>,
}

impl AttachTracker {
    pub fn current(&self) -> AttachState {
        *self.state.borrow()
    }

    /// Wait until the poll reaches `Attached` or `TimedOut`.
    ///
    /// If the poll task disappears first, the last published state is
    /// returned.
    pub async fn wait(&mut self) -> AttachState {
        if let Ok(state) = self.state.wait_for(|s| s.is_terminal()).await {
            return *state;
        }
        *self.state.borrow()
    }
}

pub struct AttachmentPoller {
    port: u16,
    host: Arc<dyn DebuggerHost>,
    prober: Arc<dyn PortProber>,
    out: OutputChannel,
    timing: PollTiming,
}

impl AttachmentPoller {
    pub fn new(
        port: u16,
        host: Arc<dyn DebuggerHost>,
        prober: Arc<dyn PortProber>,
        out: OutputChannel,
    ) -> Self {
        Self {
            port,
            host,
            prober,
            out,
            timing: PollTiming::default(),
        }
    }

    /// Run the poll loop on a detached task.
    pub fn spawn(self: Arc<Self>) -> AttachTracker {
        let (tx, rx) = watch::channel(AttachState::Idle);
        tokio::spawn(async move {
            let outcome = self.poll(&tx).await;
            debug!(?outcome, "attachment poll finished");
        });
        AttachTracker { state: rx }
    }

    /// Run the poll loop to completion on the current task.
    pub async fn run(&self) -> AttachState {
        let (tx, _rx) = watch::channel(AttachState::Idle);
        self.poll(&tx).await
    }

    async fn poll(&self, state: &watch::Sender<AttachState>) -> AttachState {
        state.send_replace(AttachState::Polling);
        let deadline = Instant::now() + self.timing.deadline;
        let request = AttachRequest::remote(self.port);
        let mut attempt: u32 = 0;

        while Instant::now() < deadline {
            attempt += 1;

            if self.host.has_active_session() {
                self.out
                    .log(format!("debug session already active (attempt {attempt})."));
                return finish(state, AttachState::Attached);
            }

            if !self.prober.is_open(self.port, self.timing.probe_timeout).await {
                sleep(self.timing.closed_port_wait).await;
                continue;
            }

            match self.host.attach(&request).await {
                Ok(true) => {
                    self.out.log("debugger started");
                    info!(port = self.port, attempt, "debugger attached");
                    return finish(state, AttachState::Attached);
                }
                Ok(false) => self.out.log("reattach failed: debugger declined the request"),
                Err(e) => self.out.log(format!("reattach failed: {e}")),
            }

            sleep(backoff_delay(attempt)).await;
        }

        self.out.log("failed to attach debugger after retries");
        warn!(port = self.port, attempts = attempt, "attach deadline elapsed");
        finish(state, AttachState::TimedOut)
    }
}

fn finish(state: &watch::Sender<AttachState>, terminal: AttachState) -> AttachState {
    state.send_replace(terminal);
    terminal
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    use super::*;
    use crate::errors::{HotdlvError, Result};
    use crate::output::MemorySink;
    use crate::types::BoxFuture;

    struct ScriptedProber {
        probes: AtomicUsize,
        open_after: Option<usize>,
    }

    impl PortProber for ScriptedProber {
        fn is_open(&self, _port: u16, _within: Duration) -> BoxFuture<'_, bool> {
            let n = self.probes.fetch_add(1, Ordering::SeqCst) + 1;
            let open = self.open_after.is_some_and(|after| n > after);
            Box::pin(async move { open })
        }
    }

    struct ScriptedHost {
        active: AtomicBool,
        failures_before_success: AtomicUsize,
        attaches: AtomicUsize,
    }

    impl DebuggerHost for ScriptedHost {
        fn has_active_session(&self) -> bool {
            self.active.load(Ordering::SeqCst)
        }

        fn attach<'a>(&'a self, _request: &'a AttachRequest) -> BoxFuture<'a, Result<bool>> {
            self.attaches.fetch_add(1, Ordering::SeqCst);
            let fail = self
                .failures_before_success
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok();
            Box::pin(async move {
                if fail {
                    Err(HotdlvError::Other(anyhow::anyhow!("connection reset")))
                } else {
                    Ok(true)
                }
            })
        }
    }

    fn poller(
        prober: ScriptedProber,
        host: ScriptedHost,
    ) -> (AttachmentPoller, Arc<ScriptedProber>, Arc<ScriptedHost>, MemorySink) {
        let sink = MemorySink::new();
        let prober = Arc::new(prober);
        let host = Arc::new(host);
        let poller = AttachmentPoller::new(
            40000,
            host.clone(),
            prober.clone(),
            OutputChannel::new(Arc::new(sink.clone())),
        );
        (poller, prober, host, sink)
    }

    fn host(active: bool, failures: usize) -> ScriptedHost {
        ScriptedHost {
            active: AtomicBool::new(active),
            failures_before_success: AtomicUsize::new(failures),
            attaches: AtomicUsize::new(0),
        }
    }

    fn prober(open_after: Option<usize>) -> ScriptedProber {
        ScriptedProber {
            probes: AtomicUsize::new(0),
            open_after,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn active_session_short_circuits_without_probing() {
        let (poller, prober, host, _) = poller(prober(Some(0)), host(true, 0));

        assert_eq!(poller.run().await, AttachState::Attached);
        assert_eq!(prober.probes.load(Ordering::SeqCst), 0);
        assert_eq!(host.attaches.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn closed_port_times_out_within_deadline() {
        let (poller, prober, host, sink) = poller(prober(None), host(false, 0));
        let started = Instant::now();

        assert_eq!(poller.run().await, AttachState::TimedOut);

        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_secs(15));
        assert!(elapsed <= Duration::from_secs(15) + Duration::from_millis(400));
        assert!(prober.probes.load(Ordering::SeqCst) > 100);
        assert_eq!(host.attaches.load(Ordering::SeqCst), 0);
        assert!(sink.contains("failed to attach debugger after retries"));
    }

    #[tokio::test(start_paused = true)]
    async fn attach_failures_back_off_then_succeed() {
        let (poller, _, host, sink) = poller(prober(Some(2)), host(false, 2));

        assert_eq!(poller.run().await, AttachState::Attached);
        assert_eq!(host.attaches.load(Ordering::SeqCst), 3);
        assert!(sink.contains("reattach failed: connection reset"));
        assert!(sink.contains("debugger started"));
    }

    #[tokio::test(start_paused = true)]
    async fn spawned_poll_is_observable_through_tracker() {
        let (poller, _, _, _) = poller(prober(Some(5)), host(false, 0));

        let mut tracker = Arc::new(poller).spawn();
        assert_eq!(tracker.wait().await, AttachState::Attached);
        assert_eq!(tracker.current(), AttachState::Attached);
    }
}
