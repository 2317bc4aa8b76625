//! Spoolfetch: streamed backlog replay behind an opaque cursor.

use crate::prelude::*;
use pulse_core::{Settings, WorkerState};
use pulse_store::EngineCall;

fn spool_rig() -> Spec {
    let spec = spec_with(Settings::default());
    enable_spool(&spec);
    spec
}

fn backlog(spec: &Spec) {
    spec.transport.respond(
        "spoolfetch 1000",
        &[
            "multigraph load",
            "load.label load",
            "load.value 1100:0.5",
            "multigraph cpu",
            "cpu.label cpu",
            "cpu.type DERIVE",
            "cpu.value 1200:42",
            "multigraph temp",
            "temp.label temp",
            "temp.value 1300:1.5e-2",
            "1300",
            ".",
        ],
    );
}

fn seeded(spec: Spec) -> Spec {
    let mut spec = spec;
    let mut state = WorkerState::default();
    state.spoolfetch = Some("1000".to_string());
    spec.worker.state = state;
    spec
}

#[tokio::test]
async fn backlog_replays_and_the_cursor_advances() {
    let mut spec = seeded(spool_rig());
    backlog(&spec);

    spec.worker.run(&spec.host).await.unwrap();

    assert!(spec.transport.sent().contains(&"spoolfetch 1000".to_string()));
    assert_eq!(spec.engine.updates().len(), 3, "one batched update per service");
    assert_eq!(spec.worker.state.spoolfetch.as_deref(), Some("1300"));

    // Scientific notation was normalised before reaching the engine.
    let temp_update = spec.engine.updates().into_iter().find_map(|call| {
        let EngineCall::Update { path, samples, .. } = call else {
            return None;
        };
        path.ends_with("alpha-temp-temp-g.rrd").then_some(samples)
    });
    assert_eq!(temp_update.unwrap(), vec!["1300:0.015000"]);
}

#[tokio::test]
async fn a_mid_stream_drop_keeps_the_old_cursor() {
    let mut spec = seeded(spool_rig());
    backlog(&spec);
    // The connection dies after the banner and the first four lines.
    spec.transport.drop_after(5);

    spec.worker.run(&spec.host).await.unwrap_err();

    assert_eq!(
        spec.worker.state.spoolfetch.as_deref(),
        Some("1000"),
        "cursor only advances on a clean stream"
    );
    assert_eq!(spec.transport.shutdown_count(), 1, "torn down on abort");
}

#[tokio::test]
async fn earlier_blocks_stay_written_after_an_abort() {
    let mut spec = seeded(spool_rig());
    backlog(&spec);
    // Enough lines for the load block and the cpu switch line.
    spec.transport.drop_after(6);

    spec.worker.run(&spec.host).await.unwrap_err();

    let updates = spec.engine.updates();
    assert_eq!(updates.len(), 1, "the finished load block was committed");
}

#[tokio::test]
async fn list_path_is_never_taken_when_spooling() {
    let mut spec = seeded(spool_rig());
    backlog(&spec);

    spec.worker.run(&spec.host).await.unwrap();
    assert!(!spec.transport.sent().contains(&"list".to_string()));
}
