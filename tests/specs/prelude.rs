//! Test helpers for behavioral specifications.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic, dead_code)]

use pulse_core::{FakeClock, Host, Settings};
use pulse_store::FakeEngine;
use pulse_wire::{FakeConnector, FakeTransport};
use pulse_worker::UpdateWorker;
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;

/// Frozen wall clock for every spec.
pub const EPOCH: u64 = 100_000;

/// One scripted worker-against-agent rig.
pub struct Spec {
    pub transport: FakeTransport,
    pub engine: FakeEngine,
    pub clock: FakeClock,
    pub worker: UpdateWorker<FakeConnector, FakeEngine>,
    pub host: Host,
    pub dbdir: TempDir,
}

impl Spec {
    /// Path of the rrd file for `(service, field, type_initial)` on the
    /// rig's host.
    pub fn rrd(&self, service: &str, field: &str, initial: char) -> PathBuf {
        self.dbdir
            .path()
            .join("web")
            .join(format!("alpha-{service}-{field}-{initial}.rrd"))
    }
}

pub fn spec() -> Spec {
    spec_with(Settings::default())
}

pub fn spec_with(mut settings: Settings) -> Spec {
    let dbdir = tempfile::tempdir().unwrap();
    settings.dbdir = dbdir.path().to_path_buf();

    let transport = FakeTransport::new();
    transport.respond("cap multigraph dirtyconfig", &["cap multigraph dirtyconfig"]);

    let engine = FakeEngine::new();
    let clock = FakeClock::at_epoch(EPOCH);
    let worker = UpdateWorker::with_clock(
        settings,
        FakeConnector::new(transport.clone()),
        engine.clone(),
        Arc::new(clock.clone()),
    );

    let mut host = Host::new("web", "alpha");
    host.address = Some("fake".to_string());

    Spec {
        transport,
        engine,
        clock,
        worker,
        host,
        dbdir,
    }
}

/// Give the agent the `spool` capability.
pub fn enable_spool(spec: &Spec) {
    spec.transport.respond(
        "cap multigraph dirtyconfig",
        &["cap multigraph dirtyconfig spool"],
    );
}

/// Touch a file, creating parents.
pub fn touch(path: &std::path::Path) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::File::create(path).unwrap();
}
