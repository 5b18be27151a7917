#![allow(dead_code)]

//! In-memory stand-ins for every seam the orchestrator depends on.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::oneshot;

use hotdlv::attach::{AttachRequest, DebuggerHost, PortProber};
use hotdlv::engine::SharedSession;
use hotdlv::errors::{HotdlvError, Result};
use hotdlv::exec::{BuildStep, DebugServerHandle, LaunchStep};
use hotdlv::process::{ProcessControl, ProcessIdentity};
use hotdlv::types::BoxFuture;

/// Process control that "finds" a fixed set of strays and records kills.
#[derive(Default)]
pub struct FakeProcessControl {
    strays: Mutex<Vec<u32>>,
    killed: Mutex<Vec<u32>>,
    queries: AtomicUsize,
}

impl FakeProcessControl {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pids reported for any binary until killed.
    pub fn with_strays(pids: &[u32]) -> Self {
        Self {
            strays: Mutex::new(pids.to_vec()),
            ..Self::default()
        }
    }

    pub fn killed(&self) -> Vec<u32> {
        self.killed.lock().unwrap().clone()
    }

    pub fn queries(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }
}

impl ProcessControl for FakeProcessControl {
    fn find_by_binary<'a>(&'a self, binary: &'a Path) -> BoxFuture<'a, Vec<ProcessIdentity>> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        let found = self
            .strays
            .lock()
            .unwrap()
            .iter()
            .map(|pid| ProcessIdentity::new(*pid, Some(binary.to_path_buf())))
            .collect();
        Box::pin(async move { found })
    }

    fn kill(&self, pid: u32) -> BoxFuture<'_, std::io::Result<()>> {
        self.killed.lock().unwrap().push(pid);
        let was_stray = {
            let mut strays = self.strays.lock().unwrap();
            let before = strays.len();
            strays.retain(|p| *p != pid);
            strays.len() != before
        };
        Box::pin(async move {
            if was_stray {
                Ok(())
            } else {
                Err(std::io::Error::other("no such process"))
            }
        })
    }
}

/// Port prober that reports the port open from the `n+1`th probe on.
pub struct FakePortProber {
    open_after: Option<usize>,
    probes: AtomicUsize,
}

impl FakePortProber {
    pub fn always_open() -> Self {
        Self::open_after(0)
    }

    pub fn never_open() -> Self {
        Self {
            open_after: None,
            probes: AtomicUsize::new(0),
        }
    }

    pub fn open_after(probes: usize) -> Self {
        Self {
            open_after: Some(probes),
            probes: AtomicUsize::new(0),
        }
    }

    pub fn probes(&self) -> usize {
        self.probes.load(Ordering::SeqCst)
    }
}

impl PortProber for FakePortProber {
    fn is_open(&self, _port: u16, _within: Duration) -> BoxFuture<'_, bool> {
        let n = self.probes.fetch_add(1, Ordering::SeqCst) + 1;
        let open = self.open_after.is_some_and(|after| n > after);
        Box::pin(async move { open })
    }
}

/// Debugger host that accepts every attach after a number of failures.
#[derive(Default)]
pub struct FakeDebuggerHost {
    active: AtomicBool,
    failures_left: AtomicU32,
    attaches: Mutex<Vec<AttachRequest>>,
}

impl FakeDebuggerHost {
    pub fn accepting() -> Self {
        Self::default()
    }

    pub fn failing_first(failures: u32) -> Self {
        Self {
            failures_left: AtomicU32::new(failures),
            ..Self::default()
        }
    }

    pub fn set_active(&self, active: bool) {
        self.active.store(active, Ordering::SeqCst);
    }

    pub fn attaches(&self) -> Vec<AttachRequest> {
        self.attaches.lock().unwrap().clone()
    }
}

impl DebuggerHost for FakeDebuggerHost {
    fn has_active_session(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    fn attach<'a>(&'a self, request: &'a AttachRequest) -> BoxFuture<'a, Result<bool>> {
        self.attaches.lock().unwrap().push(request.clone());
        let fail = self
            .failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        Box::pin(async move {
            if fail {
                Err(HotdlvError::Other(anyhow::anyhow!("debugger not ready")))
            } else {
                Ok(true)
            }
        })
    }
}

/// Build step that fails a configurable number of times, then returns a
/// fixed output path. Every call takes `duration` of (virtual) time.
pub struct FakeBuildStep {
    output: PathBuf,
    duration: Duration,
    failures_left: AtomicU32,
    calls: AtomicU32,
}

impl FakeBuildStep {
    pub fn succeeding(output: impl Into<PathBuf>) -> Self {
        Self {
            output: output.into(),
            duration: Duration::ZERO,
            failures_left: AtomicU32::new(0),
            calls: AtomicU32::new(0),
        }
    }

    pub fn failing(failures: u32, output: impl Into<PathBuf>) -> Self {
        Self {
            failures_left: AtomicU32::new(failures),
            ..Self::succeeding(output)
        }
    }

    pub fn taking(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

impl BuildStep for FakeBuildStep {
    fn build<'a>(&'a self, _workspace: &'a Path) -> BoxFuture<'a, Result<PathBuf>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let fail = self
            .failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        Box::pin(async move {
            tokio::time::sleep(self.duration).await;
            if fail {
                Err(HotdlvError::BuildFailed { code: Some(1) })
            } else {
                Ok(self.output.clone())
            }
        })
    }
}

/// Launch step that installs a fake debug server handle into the session.
///
/// `alive` counts fake servers whose handle has not been stopped or dropped
/// yet, so tests can check that at most one survives.
pub struct FakeLaunchStep {
    session: SharedSession,
    next_pid: AtomicU32,
    launches: AtomicU32,
    alive: Arc<AtomicUsize>,
}

impl FakeLaunchStep {
    pub fn new(session: SharedSession) -> Self {
        Self {
            session,
            next_pid: AtomicU32::new(1000),
            launches: AtomicU32::new(0),
            alive: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn launches(&self) -> u32 {
        self.launches.load(Ordering::SeqCst)
    }

    pub fn alive(&self) -> usize {
        self.alive.load(Ordering::SeqCst)
    }
}

impl LaunchStep for FakeLaunchStep {
    fn launch<'a>(&'a self, _workspace: &'a Path, _binary: &'a Path) -> BoxFuture<'a, ()> {
        Box::pin(async move {
            self.launches.fetch_add(1, Ordering::SeqCst);
            let pid = self.next_pid.fetch_add(1, Ordering::SeqCst);

            let alive = Arc::clone(&self.alive);
            alive.fetch_add(1, Ordering::SeqCst);
            let (cancel_tx, cancel_rx) = oneshot::channel::<()>();
            let task = tokio::spawn(async move {
                let _ = cancel_rx.await;
                alive.fetch_sub(1, Ordering::SeqCst);
            });

            self.session
                .install_debug_server(DebugServerHandle::from_parts(Some(pid), cancel_tx, task));
        })
    }
}
