// tests/overlap_policy.rs

mod common;
use crate::common::{count_lines, harness, settle_tasks, ws};

use std::time::Duration;

use hotdlv::engine::RestartOutcome;
use hotdlv::types::OverlapPolicy;
use hotdlv_test_utils::builders::RunConfigBuilder;
use hotdlv_test_utils::fakes::{FakeBuildStep, FakeProcessControl};

#[tokio::test(start_paused = true)]
async fn queued_restarts_coalesce_behind_the_running_one() {
    let h = harness(
        RunConfigBuilder::new().overlap(OverlapPolicy::Queue).build(),
        FakeProcessControl::new(),
        FakeBuildStep::succeeding("/ws/.tmp/app").taking(Duration::from_secs(1)),
    );
    let o = &h.orchestrator;

    let (a, b, c, d, e) = tokio::join!(
        o.restart(ws()),
        o.restart(ws()),
        o.restart(ws()),
        o.restart(ws()),
        o.restart(ws()),
    );
    settle_tasks().await;

    let outcomes = [a.unwrap(), b.unwrap(), c.unwrap(), d.unwrap(), e.unwrap()];
    let coalesced = outcomes
        .iter()
        .filter(|o| matches!(o, RestartOutcome::Coalesced))
        .count();

    assert_eq!(coalesced, 3);
    assert_eq!(h.build.calls(), 2);
    assert_eq!(h.launch.launches(), 2);
    assert_eq!(h.launch.alive(), 1);
    assert!(h.session.has_debug_server());
    // The second restart stopped the first server before rebuilding.
    assert_eq!(count_lines(&h.sink, "dlv process closed"), 1);
}

#[tokio::test(start_paused = true)]
async fn concurrent_restarts_leave_exactly_one_server() {
    let h = harness(
        RunConfigBuilder::new().overlap(OverlapPolicy::Concurrent).build(),
        FakeProcessControl::new(),
        FakeBuildStep::succeeding("/ws/.tmp/app").taking(Duration::from_secs(1)),
    );
    let o = &h.orchestrator;

    let (a, b, c) = tokio::join!(o.restart(ws()), o.restart(ws()), o.restart(ws()));
    settle_tasks().await;

    for outcome in [a, b, c] {
        assert!(matches!(outcome.unwrap(), RestartOutcome::Restarted { .. }));
    }
    assert_eq!(h.build.calls(), 3);
    assert_eq!(h.launch.launches(), 3);
    assert_eq!(h.launch.alive(), 1);
    assert!(h.session.debug_server_pid().is_some());
}

#[tokio::test(start_paused = true)]
async fn sequential_restarts_replace_the_server_each_time() {
    let h = harness(
        RunConfigBuilder::new().build(),
        FakeProcessControl::new(),
        FakeBuildStep::succeeding("/ws/.tmp/app"),
    );

    for _ in 0..3 {
        h.orchestrator.restart(ws()).await.unwrap();
    }
    settle_tasks().await;

    assert_eq!(h.launch.launches(), 3);
    assert_eq!(h.launch.alive(), 1);
    assert_eq!(count_lines(&h.sink, "dlv process closed"), 2);
}
