//! Multigraph: one plugin presenting nested services.

use crate::prelude::*;

#[tokio::test]
async fn nested_services_get_their_own_files() {
    let mut spec = spec();
    spec.transport.respond("list", &["disk"]);
    spec.transport.respond(
        "config disk",
        &[
            "graph_title Disk",
            "multigraph disk.read",
            "read.label r",
            "read.type COUNTER",
            "multigraph disk.write",
            "write.label w",
            "write.type COUNTER",
            ".",
        ],
    );
    spec.transport.respond("fetch disk", &["."]);

    spec.worker.run(&spec.host).await.unwrap();

    assert!(spec.rrd("disk-read", "read", 'c').exists());
    assert!(spec.rrd("disk-write", "write", 'c').exists());
    assert!(spec.engine.updates().is_empty(), "no samples yet");
}

#[tokio::test]
async fn nested_samples_route_to_the_nested_files() {
    let mut spec = spec();
    spec.transport.respond("list", &["disk"]);
    spec.transport.respond(
        "config disk",
        &[
            "multigraph disk.read",
            "read.label r",
            "read.type COUNTER",
            "read.value 1000",
            "multigraph disk.write",
            "write.label w",
            "write.type COUNTER",
            "write.value 2000",
            ".",
        ],
    );

    spec.worker.run(&spec.host).await.unwrap();

    assert_eq!(spec.engine.updates().len(), 2);
    assert!(spec.rrd("disk-read", "read", 'c').exists());
    assert!(spec.rrd("disk-write", "write", 'c').exists());
}
