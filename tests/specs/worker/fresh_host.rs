//! Fresh host, one plugin, one field: the happy path end to end.

use crate::prelude::*;
use pulse_core::Settings;
use pulse_store::EngineCall;
use tokio::io::AsyncReadExt;
use tokio::net::TcpListener;

fn script_load(spec: &Spec) {
    spec.transport.respond("list", &["load"]);
    spec.transport.respond(
        "config load",
        &[
            "graph_title System Load",
            "load.label load",
            "load.type GAUGE",
            ".",
        ],
    );
    spec.transport.respond("fetch load", &["load.value 0.42", "."]);
}

#[tokio::test]
async fn creates_the_file_with_a_normal_profile_and_writes_one_sample() {
    let mut spec = spec();
    script_load(&spec);

    let stats = spec.worker.run(&spec.host).await.unwrap();
    assert!(stats.elapsed.as_secs() < 60);

    let expected = spec.rrd("load", "load", 'g');
    assert!(expected.exists(), "rrd file born at {}", expected.display());

    let calls = spec.engine.calls();
    let EngineCall::Create { path, args } = &calls[0] else {
        panic!("expected create first, got {calls:?}");
    };
    assert_eq!(path, &expected);
    assert!(args.contains(&"RRA:AVERAGE:0.5:1:576".to_string()));
    assert!(args.contains(&"RRA:AVERAGE:0.5:288:450".to_string()));
    assert_eq!(
        args.iter().filter(|a| a.starts_with("RRA:")).count(),
        12,
        "normal profile: 4 archives x AVERAGE/MIN/MAX"
    );

    let EngineCall::Update { samples, .. } = &calls[1] else {
        panic!("expected update second, got {calls:?}");
    };
    assert_eq!(samples, &[format!("{EPOCH}:0.42")], "bare value dated now");
}

#[tokio::test]
async fn emits_one_carbon_line_when_configured() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let received = tokio::spawn(async move {
        let (mut peer, _) = listener.accept().await.unwrap();
        let mut buf = String::new();
        peer.read_to_string(&mut buf).await.unwrap();
        buf
    });

    let mut settings = Settings::default();
    settings.carbon_server = Some("127.0.0.1".to_string());
    settings.carbon_port = port;
    settings.carbon_prefix = Some("pulse".to_string());
    let mut spec = spec_with(settings);
    script_load(&spec);

    spec.worker.run(&spec.host).await.unwrap();

    assert_eq!(
        received.await.unwrap(),
        format!("pulse.alpha.load.load 0.4200 {EPOCH}\n")
    );
}

#[tokio::test]
async fn a_quiet_declared_field_still_gets_its_file() {
    let mut spec = spec();
    spec.transport.respond("list", &["load"]);
    spec.transport
        .respond("config load", &["load.label load", "."]);
    spec.transport.respond("fetch load", &["."]);

    spec.worker.run(&spec.host).await.unwrap();

    assert!(spec.rrd("load", "load", 'g').exists());
    assert!(spec.engine.updates().is_empty(), "no samples, no update");
}
