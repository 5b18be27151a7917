// tests/termination.rs

mod common;
use crate::common::{harness, settle_tasks, ws};

use hotdlv_test_utils::builders::RunConfigBuilder;
use hotdlv_test_utils::fakes::{FakeBuildStep, FakeProcessControl};

#[tokio::test(start_paused = true)]
async fn shutdown_with_nothing_running_is_a_silent_noop() {
    let h = harness(
        RunConfigBuilder::new().build(),
        FakeProcessControl::new(),
        FakeBuildStep::succeeding("/ws/.tmp/app"),
    );

    let first = h.orchestrator.shutdown(ws()).await;
    let second = h.orchestrator.shutdown(ws()).await;

    assert!(first.is_noop());
    assert!(second.is_noop());
    assert!(h.control.killed().is_empty());
    assert!(h.sink.lines().is_empty());
}

#[tokio::test(start_paused = true)]
async fn shutdown_stops_the_server_and_strays_once() {
    let h = harness(
        RunConfigBuilder::new().build(),
        FakeProcessControl::new(),
        FakeBuildStep::succeeding("/ws/.tmp/app"),
    );
    h.orchestrator.restart(ws()).await.unwrap();
    assert_eq!(h.launch.alive(), 1);

    let report = h.orchestrator.shutdown(ws()).await;
    settle_tasks().await;

    assert!(report.had_known_handle);
    assert_eq!(report.pids, vec![1000]);
    assert!(!h.session.has_debug_server());
    assert_eq!(h.launch.alive(), 0);

    let again = h.orchestrator.shutdown(ws()).await;
    assert!(again.is_noop());
}

#[tokio::test(start_paused = true)]
async fn strays_are_looked_up_by_the_resolved_output_path() {
    let h = harness(
        RunConfigBuilder::new().output("./out/server").build(),
        FakeProcessControl::with_strays(&[7, 8]),
        FakeBuildStep::succeeding("/ws/out/server"),
    );

    let report = h.orchestrator.shutdown(ws()).await;

    assert_eq!(report.pids, vec![7, 8]);
    assert!(!report.had_known_handle);
    assert_eq!(h.control.killed(), vec![7, 8]);
    assert_eq!(h.control.queries(), 1);
    assert!(h.sink.contains("dlv process closed (pids=7,8)"));
}
