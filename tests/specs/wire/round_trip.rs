//! Parsing a config response and re-emitting its attributes yields the
//! same nested config.

use pulse_core::FakeClock;
use pulse_wire::Accumulator;
use std::sync::Arc;

fn parse(lines: &[String]) -> pulse_core::ServiceConfigs {
    let mut acc = Accumulator::new("df", 300, Arc::new(FakeClock::at_epoch(1000)));
    for line in lines {
        acc.feed_config_line(line).unwrap();
    }
    let (configs, _) = acc.into_parts();
    configs
}

/// Re-emit a parsed config as wire lines, multigraph switches included.
fn emit(configs: &pulse_core::ServiceConfigs) -> Vec<String> {
    let mut services: Vec<&String> = configs
        .global
        .keys()
        .chain(configs.data_source.keys())
        .collect();
    services.sort();
    services.dedup();

    let mut lines = Vec::new();
    for service in services {
        lines.push(format!("multigraph {service}"));
        if let Some(attrs) = configs.global.get(service) {
            for (key, value) in attrs {
                lines.push(format!("{key} {value}"));
            }
        }
        if let Some(fields) = configs.data_source.get(service) {
            let mut names: Vec<_> = fields.keys().collect();
            names.sort();
            for field in names {
                let mut attrs: Vec<_> = fields[field].iter().collect();
                attrs.sort();
                for (key, value) in attrs {
                    lines.push(format!("{field}.{key} {value}"));
                }
            }
        }
    }
    lines
}

#[test]
fn config_round_trips_modulo_attribute_order() {
    let original: Vec<String> = [
        "graph_title Disk usage",
        "graph_args --lower-limit 0",
        "root.label /",
        "root.type GAUGE",
        "root.min 0",
        "multigraph df.inodes",
        "graph_title Inode usage",
        "root.label inodes /",
        "root.warning 90",
    ]
    .iter()
    .map(|l| l.to_string())
    .collect();

    let first = parse(&original);
    let second = parse(&emit(&first));

    for service in ["df", "df.inodes"] {
        assert_eq!(
            first.global_attr(service, "graph_title"),
            second.global_attr(service, "graph_title"),
            "{service} service attrs survive"
        );
        let a = first.data_source.get(service);
        let b = second.data_source.get(service);
        assert_eq!(a, b, "{service} field attrs survive");
    }
}
