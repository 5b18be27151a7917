// src/engine/retry.rs

//! Retry, backoff and "attempt and ignore" helpers shared by the
//! orchestrator, terminator and attachment poller.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, warn};

use crate::errors::Result;
use crate::output::OutputChannel;

/// Fixed-delay retry bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total number of tries, including the first one.
    pub attempts: u32,
    pub delay: Duration,
}

impl RetryPolicy {
    /// Build + launch: 5 tries, 500ms apart.
    pub const RESTART: RetryPolicy = RetryPolicy {
        attempts: 5,
        delay: Duration::from_millis(500),
    };
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::RESTART
    }
}

/// Run `op` until it succeeds or `policy.attempts` tries have failed.
///
/// `op` receives the 1-based attempt number. Each failure is logged to the
/// output channel and followed by `policy.delay`. The error of the final
/// try is returned.
pub async fn retry<T, F, Fut>(policy: RetryPolicy, out: &OutputChannel, mut op: F) -> Result<T>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let attempts = policy.attempts.max(1);
    let mut attempt = 1;

    loop {
        match op(attempt).await {
            Ok(value) => return Ok(value),
            Err(err) => {
                out.log(format!("Retry {attempt}/{attempts} failed: {err}"));
                warn!(attempt, attempts, error = %err, "attempt failed");
                // The delay also follows the final failure.
                sleep(policy.delay).await;
                if attempt >= attempts {
                    return Err(err);
                }
                attempt += 1;
            }
        }
    }
}

/// Await a fallible side effect, log a failure at debug level and report
/// whether it succeeded.
pub async fn attempt_logged<F, E>(label: &str, fut: F) -> bool
where
    F: Future<Output = std::result::Result<(), E>>,
    E: Display,
{
    match fut.await {
        Ok(()) => true,
        Err(e) => {
            debug!(label, error = %e, "ignored failure");
            false
        }
    }
}

/// Attachment backoff: `min(100 + attempt * 50, 400)` ms.
pub fn backoff_delay(attempt: u32) -> Duration {
    let ms = 100u64.saturating_add(u64::from(attempt).saturating_mul(50));
    Duration::from_millis(ms.min(400))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::HotdlvError;
    use crate::output::MemorySink;
    use proptest::prelude::*;
    use std::sync::Arc;

    fn channel() -> (OutputChannel, MemorySink) {
        let sink = MemorySink::new();
        (OutputChannel::new(Arc::new(sink.clone())), sink)
    }

    #[tokio::test(start_paused = true)]
    async fn stops_at_first_success() {
        let (out, sink) = channel();
        let mut calls = 0;

        let value = retry(RetryPolicy::RESTART, &out, |n| {
            calls += 1;
            async move {
                if n < 3 {
                    Err(HotdlvError::BuildFailed { code: Some(1) })
                } else {
                    Ok(n)
                }
            }
        })
        .await
        .unwrap();

        assert_eq!(value, 3);
        assert_eq!(calls, 3);
        assert!(sink.contains("Retry 2/5 failed: Build failed with code 1"));
    }

    #[tokio::test(start_paused = true)]
    async fn returns_last_error_after_all_attempts() {
        let (out, _sink) = channel();
        let started = tokio::time::Instant::now();
        let mut calls = 0;

        let err = retry(RetryPolicy::RESTART, &out, |n| {
            calls += 1;
            async move { Err::<(), _>(HotdlvError::BuildFailed { code: Some(n as i32) }) }
        })
        .await
        .unwrap_err();

        assert_eq!(calls, 5);
        assert!(matches!(err, HotdlvError::BuildFailed { code: Some(5) }));
        assert!(started.elapsed() >= Duration::from_millis(2000));
    }

    #[tokio::test]
    async fn attempt_logged_reports_outcome() {
        assert!(attempt_logged("ok", async { Ok::<(), String>(()) }).await);
        assert!(!attempt_logged("fail", async { Err::<(), _>("gone".to_string()) }).await);
    }

    #[test]
    fn backoff_grows_then_caps() {
        assert_eq!(backoff_delay(0), Duration::from_millis(100));
        assert_eq!(backoff_delay(1), Duration::from_millis(150));
        assert_eq!(backoff_delay(6), Duration::from_millis(400));
        assert_eq!(backoff_delay(u32::MAX), Duration::from_millis(400));
    }

    proptest! {
        #[test]
        fn backoff_stays_within_bounds(attempt in any::<u32>()) {
            let d = backoff_delay(attempt);
            prop_assert!(d >= Duration::from_millis(100));
            prop_assert!(d <= Duration::from_millis(400));
        }
    }
}
