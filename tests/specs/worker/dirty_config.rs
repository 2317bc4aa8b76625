//! Dirty config: a `config` response that carries the current sample
//! spares the explicit fetch round trip.

use crate::prelude::*;
use pulse_store::EngineCall;

#[tokio::test]
async fn inline_sample_lands_without_a_fetch() {
    let mut spec = spec();
    spec.transport.respond("list", &["cpu"]);
    spec.transport.respond(
        "config cpu",
        &["cpu.label CPU", "cpu.type DERIVE", "cpu.value 123456", "."],
    );

    spec.worker.run(&spec.host).await.unwrap();

    assert!(
        !spec.transport.sent().contains(&"fetch cpu".to_string()),
        "dirty config suppresses the explicit fetch"
    );

    let expected = spec.rrd("cpu", "cpu", 'd');
    assert!(expected.exists());

    let updates = spec.engine.updates();
    assert_eq!(updates.len(), 1);
    let EngineCall::Update { path, samples, .. } = &updates[0] else {
        panic!();
    };
    assert_eq!(path, &expected);
    assert_eq!(samples, &[format!("{EPOCH}:123456")]);
}

#[tokio::test]
async fn dirty_config_with_explicit_when_keeps_it() {
    let mut spec = spec();
    spec.transport.respond("list", &["cpu"]);
    spec.transport.respond(
        "config cpu",
        &["cpu.label CPU", "cpu.value 90000:7", "."],
    );

    spec.worker.run(&spec.host).await.unwrap();

    let EngineCall::Update { samples, .. } = &spec.engine.updates()[0] else {
        panic!();
    };
    assert_eq!(samples, &["90000:7"]);
}
