use std::future::Future;
use std::pin::Pin;

use serde::Deserialize;

/// Behaviour when a restart is requested while another one is in progress.
///
/// - `Queue`: restarts are single-flight. A request that arrives while one is
///   running waits for it; if a request is already waiting, later arrivals
///   are coalesced into it (default).
/// - `Concurrent`: every request runs immediately and may interleave with
///   others. The most recently launched debug server owns the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverlapPolicy {
    #[default]
    Queue,
    Concurrent,
}

/// Loopback host the debug server binds to and debuggers connect to.
pub const DEBUG_HOST: &str = "127.0.0.1";

/// Debug server protocol API version.
pub const API_VERSION: u32 = 2;

/// Boxed future returned by the async seams (`ProcessControl`, `BuildStep`,
/// `DebuggerHost`, ...), which are used as trait objects.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;
