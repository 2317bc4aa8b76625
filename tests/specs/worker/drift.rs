//! Config drift across runs: type changes diverge, oldname renames.

use crate::prelude::*;
use pulse_core::OldConfig;
use pulse_store::EngineCall;
use std::collections::HashMap;

const VERSION: &str = env!("CARGO_PKG_VERSION");

fn field_config(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn old_config(service: &str, field: &str, pairs: &[(&str, &str)]) -> OldConfig {
    let mut old = OldConfig {
        version: Some(VERSION.to_string()),
        ..OldConfig::default()
    };
    old.remember(service, field, field_config(pairs));
    old
}

#[tokio::test]
async fn type_change_diverges_instead_of_renaming() {
    let mut spec = spec();
    spec.worker.old_config = old_config(
        "load",
        "load",
        &[("label", "load"), ("type", "GAUGE")],
    );
    let old_file = spec.rrd("load", "load", 'g');
    touch(&old_file);

    spec.transport.respond("list", &["load"]);
    spec.transport.respond(
        "config load",
        &["load.label load", "load.type COUNTER", "."],
    );
    spec.transport.respond("fetch load", &["load.value 0.5", "."]);

    spec.worker.run(&spec.host).await.unwrap();

    assert!(old_file.exists(), "historical file left intact");
    let new_file = spec.rrd("load", "load", 'c');
    assert!(new_file.exists(), "fresh file born under the new type");

    let calls = spec.engine.calls();
    assert!(
        !calls.iter().any(|c| matches!(c, EngineCall::Tune { .. })),
        "the old file is not tuned into the new shape"
    );
    let update_paths: Vec<_> = calls
        .iter()
        .filter_map(|c| match c {
            EngineCall::Update { path, .. } => Some(path.clone()),
            _ => None,
        })
        .collect();
    assert_eq!(update_paths, vec![new_file]);
}

#[tokio::test]
async fn oldname_renames_then_tunes() {
    let mut spec = spec();
    spec.worker.old_config = old_config(
        "cpu",
        "user",
        &[("label", "user"), ("type", "GAUGE")],
    );
    let old_file = spec.rrd("cpu", "user", 'g');
    touch(&old_file);

    spec.transport.respond("list", &["cpu"]);
    spec.transport.respond(
        "config cpu",
        &[
            "cpu_user.label user",
            "cpu_user.type GAUGE",
            "cpu_user.oldname user",
            ".",
        ],
    );
    spec.transport
        .respond("fetch cpu", &["cpu_user.value 0.5", "."]);

    spec.worker.run(&spec.host).await.unwrap();

    let new_file = spec.rrd("cpu", "cpu_user", 'g');
    assert!(!old_file.exists(), "old file moved away");
    assert!(new_file.exists(), "renamed into place");

    let calls = spec.engine.calls();
    assert!(
        calls
            .iter()
            .any(|c| matches!(c, EngineCall::Tune { path, .. } if path == &new_file)),
        "renamed file gets tuned: {calls:?}"
    );
    assert!(
        calls
            .iter()
            .any(|c| matches!(c, EngineCall::Update { path, .. } if path == &new_file)),
        "new samples land in the renamed file"
    );
    assert!(
        !calls.iter().any(|c| matches!(c, EngineCall::Create { .. })),
        "no fresh file is created"
    );
}

#[tokio::test]
async fn oldname_with_both_files_present_touches_nothing() {
    let mut spec = spec();
    spec.worker.old_config = old_config("cpu", "user", &[("label", "user")]);
    let old_file = spec.rrd("cpu", "user", 'g');
    let new_file = spec.rrd("cpu", "cpu_user", 'g');
    touch(&old_file);
    touch(&new_file);

    spec.transport.respond("list", &["cpu"]);
    spec.transport.respond(
        "config cpu",
        &["cpu_user.label user", "cpu_user.oldname user", "."],
    );
    spec.transport.respond("fetch cpu", &["."]);

    spec.worker.run(&spec.host).await.unwrap();

    assert!(old_file.exists());
    assert!(new_file.exists());
    assert!(
        !spec
            .engine
            .calls()
            .iter()
            .any(|c| matches!(c, EngineCall::Tune { .. })),
        "ambiguity leaves both files untouched"
    );
}

#[tokio::test]
async fn min_change_tunes_the_file_in_place() {
    let mut spec = spec();
    spec.worker.old_config = old_config("load", "load", &[("label", "load"), ("min", "0")]);
    let file = spec.rrd("load", "load", 'g');
    touch(&file);

    spec.transport.respond("list", &["load"]);
    spec.transport.respond(
        "config load",
        &["load.label load", "load.min 1", "."],
    );
    spec.transport.respond("fetch load", &["."]);

    spec.worker.run(&spec.host).await.unwrap();

    let calls = spec.engine.calls();
    assert!(
        calls
            .iter()
            .any(|c| matches!(c, EngineCall::Tune { path, args } if path == &file
                && args.contains(&"--minimum".to_string()))),
        "{calls:?}"
    );
}

#[tokio::test]
async fn version_bump_tunes_existing_files_precautionarily() {
    let mut spec = spec();
    let mut old = old_config("load", "load", &[("label", "load")]);
    old.version = Some("0.0.1".to_string());
    spec.worker.old_config = old;
    let file = spec.rrd("load", "load", 'g');
    touch(&file);

    spec.transport.respond("list", &["load"]);
    spec.transport.respond("config load", &["load.label load", "."]);
    spec.transport.respond("fetch load", &["."]);

    spec.worker.run(&spec.host).await.unwrap();

    assert!(
        spec.engine
            .calls()
            .iter()
            .any(|c| matches!(c, EngineCall::Tune { path, .. } if path == &file)),
        "software upgrade re-tunes the file once"
    );
    assert_eq!(
        spec.worker.old_config.version.as_deref(),
        Some(VERSION),
        "version stamp refreshed after the run"
    );
}
