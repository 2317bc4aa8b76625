//! Re-running against an agent with no new samples changes nothing.

use crate::prelude::*;
use std::time::Duration;

#[tokio::test]
async fn second_run_with_stale_samples_writes_nothing_new() {
    let mut spec = spec();
    spec.transport.respond("list", &["load"]);
    spec.transport.respond("config load", &["load.label load", "."]);
    // The agent keeps replaying the same explicitly-dated sample.
    spec.transport
        .respond("fetch load", &["load.value 90000:0.5", "."]);

    spec.worker.run(&spec.host).await.unwrap();
    assert_eq!(spec.engine.updates().len(), 1);
    let stamp_after_first = spec.worker.state.last_updated["load"].clone();

    // Long past the update rate, so the fetch is re-issued.
    spec.clock.advance(Duration::from_secs(600));
    spec.worker.run(&spec.host).await.unwrap();

    assert_eq!(
        spec.engine.updates().len(),
        1,
        "the stale sample never reaches the engine twice"
    );

    let stamp_after_second = &spec.worker.state.last_updated["load"];
    let first: u64 = stamp_after_first.split(' ').next().unwrap().parse().unwrap();
    let second: u64 = stamp_after_second.split(' ').next().unwrap().parse().unwrap();
    assert!(second >= first, "last_updated never moves backwards");
}

#[tokio::test]
async fn monotonic_filter_survives_state_round_trips() {
    let mut spec = spec();
    spec.transport.respond("list", &["load"]);
    spec.transport.respond("config load", &["load.label load", "."]);
    spec.transport
        .respond("fetch load", &["load.value 90000:0.5", "."]);

    spec.worker.run(&spec.host).await.unwrap();

    // The dispatcher persists and reloads the state blob between runs.
    let json = spec.worker.state.to_json().unwrap();
    spec.worker.state = pulse_core::WorkerState::from_json(&json).unwrap();

    spec.clock.advance(Duration::from_secs(600));
    spec.worker.run(&spec.host).await.unwrap();

    assert_eq!(spec.engine.updates().len(), 1);
}
