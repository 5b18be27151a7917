// src/engine/session.rs

//! Mutable state of the current hot-reload run.
//!
//! The debug server handle, the watcher handle and the attach tracker are the
//! only shared mutable state in the system. Every accessor locks briefly and
//! never across an `.await`.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::debug;

use crate::attach::AttachTracker;
use crate::exec::launcher::DebugServerHandle;
use crate::watch::WatcherHandle;

#[derive(Default)]
pub struct SessionState {
    debug_server: Option<DebugServerHandle>,
    watcher: Option<WatcherHandle>,
    attach: Option<AttachTracker>,
}

impl fmt::Debug for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionState")
            .field("debug_server_pid", &self.debug_server.as_ref().and_then(|h| h.pid()))
            .field("watching", &self.watcher.is_some())
            .field("attach", &self.attach.as_ref().map(|t| t.current()))
            .finish()
    }
}

/// Cloneable handle to the session state.
#[derive(Clone, Default, Debug)]
pub struct SharedSession {
    inner: Arc<Mutex<SessionState>>,
}

impl SharedSession {
    fn lock(&self) -> MutexGuard<'_, SessionState> {
        // A panic while holding the lock cannot leave these plain Options in
        // a torn state, so recover from poisoning.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Remove and return the debug server handle.
    pub fn take_debug_server(&self) -> Option<DebugServerHandle> {
        self.lock().debug_server.take()
    }

    /// Store a freshly launched debug server, unconditionally replacing the
    /// previous one. A replaced handle is dropped, which kills its process.
    pub fn install_debug_server(&self, handle: DebugServerHandle) {
        let replaced = self.lock().debug_server.replace(handle);
        if let Some(old) = replaced {
            debug!(pid = ?old.pid(), "replacing debug server handle; dropping previous");
        }
    }

    pub fn has_debug_server(&self) -> bool {
        self.lock().debug_server.is_some()
    }

    pub fn debug_server_pid(&self) -> Option<u32> {
        self.lock().debug_server.as_ref().and_then(|h| h.pid())
    }

    pub fn install_watcher(&self, watcher: WatcherHandle) {
        self.lock().watcher = Some(watcher);
    }

    pub fn take_watcher(&self) -> Option<WatcherHandle> {
        self.lock().watcher.take()
    }

    pub fn is_watching(&self) -> bool {
        self.lock().watcher.is_some()
    }

    pub fn set_attach_tracker(&self, tracker: AttachTracker) {
        self.lock().attach = Some(tracker);
    }

    /// Tracker of the most recently started attachment poll.
    pub fn attach_tracker(&self) -> Option<AttachTracker> {
        self.lock().attach.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};

    fn fake_handle(pid: u32, stopped: Arc<AtomicBool>) -> DebugServerHandle {
        let (cancel_tx, cancel_rx) = tokio::sync::oneshot::channel::<()>();
        let task = tokio::spawn(async move {
            let _ = cancel_rx.await;
            stopped.store(true, Ordering::SeqCst);
        });
        DebugServerHandle::from_parts(Some(pid), cancel_tx, task)
    }

    #[tokio::test]
    async fn installing_a_handle_stops_the_replaced_one() {
        let session = SharedSession::default();
        let first_stopped = Arc::new(AtomicBool::new(false));
        let second_stopped = Arc::new(AtomicBool::new(false));

        session.install_debug_server(fake_handle(1, first_stopped.clone()));
        session.install_debug_server(fake_handle(2, second_stopped.clone()));
        tokio::task::yield_now().await;
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;

        assert_eq!(session.debug_server_pid(), Some(2));
        assert!(first_stopped.load(Ordering::SeqCst));
        assert!(!second_stopped.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn take_clears_the_handle() {
        let session = SharedSession::default();
        session.install_debug_server(fake_handle(7, Arc::new(AtomicBool::new(false))));

        let taken = session.take_debug_server();
        assert_eq!(taken.and_then(|h| h.pid()), Some(7));
        assert!(!session.has_debug_server());
        assert!(session.take_debug_server().is_none());
    }
}
