#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use hotdlv::config::RunConfiguration;
use hotdlv::engine::{Orchestrator, SharedSession};
use hotdlv::output::MemorySink;
use hotdlv_test_utils::fakes::{FakeBuildStep, FakeLaunchStep, FakeProcessControl};
use hotdlv_test_utils::memory_output;

/// Orchestrator wired entirely to fakes, plus handles on each fake.
pub struct Harness {
    pub orchestrator: Arc<Orchestrator>,
    pub session: SharedSession,
    pub control: Arc<FakeProcessControl>,
    pub build: Arc<FakeBuildStep>,
    pub launch: Arc<FakeLaunchStep>,
    pub sink: MemorySink,
}

pub fn harness(
    config: RunConfiguration,
    control: FakeProcessControl,
    build: FakeBuildStep,
) -> Harness {
    let session = SharedSession::default();
    let control = Arc::new(control);
    let build = Arc::new(build);
    let launch = Arc::new(FakeLaunchStep::new(session.clone()));
    let (out, sink) = memory_output();

    let orchestrator = Orchestrator::new(
        Arc::new(config),
        session.clone(),
        control.clone(),
        build.clone(),
        launch.clone(),
        out,
    );

    Harness {
        orchestrator: Arc::new(orchestrator),
        session,
        control,
        build,
        launch,
        sink,
    }
}

/// Let spawned tasks (fake server monitors) observe dropped handles.
pub async fn settle_tasks() {
    tokio::time::sleep(Duration::from_millis(10)).await;
}

pub fn count_lines(sink: &MemorySink, needle: &str) -> usize {
    sink.lines().iter().filter(|l| l.contains(needle)).count()
}

pub fn ws() -> &'static Path {
    Path::new("/ws")
}
