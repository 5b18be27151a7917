//! Shared helpers for hotdlv's unit and integration tests.

pub mod builders;
pub mod fakes;
#[cfg(unix)]
pub mod scripts;

use std::future::Future;
use std::sync::{Arc, Once};
use std::time::Duration;

use tracing_subscriber::{EnvFilter, fmt};

use hotdlv::logging::LOG_ENV_VAR;
use hotdlv::output::{MemorySink, OutputChannel};

static INIT: Once = Once::new();

/// Upper bound for anything a test waits on in real time.
pub const TEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Install a test-writer subscriber once per test binary.
///
/// The filter is read from `HOTDLV_LOG` (e.g. `HOTDLV_LOG=hotdlv=debug`) and
/// defaults to `warn`. Output shows up for failing tests or with
/// `--nocapture`.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter =
            EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new("warn"));

        fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .init();
    });
}

/// An output channel that records every line, plus the recorder.
pub fn memory_output() -> (OutputChannel, MemorySink) {
    let sink = MemorySink::new();
    (OutputChannel::new(Arc::new(sink.clone())), sink)
}

/// Await `f`, failing the test after [`TEST_TIMEOUT`].
pub async fn with_timeout<F, T>(f: F) -> T
where
    F: Future<Output = T>,
{
    tokio::time::timeout(TEST_TIMEOUT, f)
        .await
        .unwrap_or_else(|_| panic!("test timed out after {TEST_TIMEOUT:?}"))
}
