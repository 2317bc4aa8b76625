// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Façade over the rrd engine: file birth with a retention profile,
//! monotonic batched updates, and autotune.

use crate::engine::RrdEngine;
use pulse_core::timespec::parse_custom_resolution;
use pulse_core::{normalize_scientific, FieldConfig, FieldData, WorkerState};
use std::path::Path;

/// The fixed internal data-source name. The field name lives in the
/// filename, not inside the file.
pub const DS_NAME: &str = "42";

/// Above this batch size, updates through a cache daemon go one sample
/// per call to stay under the daemon's command-size limit.
const MAX_CACHED_BATCH: usize = 32;

/// Archive `(multiplier, count)` pairs for a retention profile.
///
/// `normal` keeps 5-minute detail for 48h, then 30-minute, 2-hour and
/// daily consolidations; `huge` keeps full detail for 400 days. The
/// multipliers are in units of the update rate. An unknown profile falls
/// back to `normal` with a warning.
pub fn archives_for(profile: &str, update_rate: u64) -> Vec<(u64, u64)> {
    let profile = profile.trim();
    match profile {
        "normal" => vec![(1, 576), (6, 432), (24, 540), (288, 450)],
        "huge" => vec![(1, 115200)],
        _ => match profile.strip_prefix("custom") {
            Some(spec) => parse_custom_resolution(spec, update_rate),
            None => {
                tracing::warn!(profile, "unknown graph_data_size, using normal");
                vec![(1, 576), (6, 432), (24, 540), (288, 450)]
            }
        },
    }
}

/// One worker's handle on the on-disk store.
pub struct RrdStore<E> {
    engine: E,
    daemon: Option<String>,
}

impl<E: RrdEngine> RrdStore<E> {
    pub fn new(engine: E, daemon: Option<String>) -> Self {
        Self { engine, daemon }
    }

    /// Create a fresh file for one data source.
    ///
    /// Engine failures are logged and swallowed; the missing file is
    /// retried on the next cycle.
    pub async fn create(
        &self,
        path: &Path,
        ds_config: &FieldConfig,
        profile: &str,
        update_rate: u64,
        first_epoch: u64,
    ) {
        if let Some(parent) = path.parent() {
            if let Err(e) = std::fs::create_dir_all(parent) {
                tracing::error!(path = %path.display(), error = %e, "cannot create rrd directory");
                return;
            }
        }

        let ds_type = ds_config
            .get("type")
            .map(|t| pulse_core::DsType::parse(t))
            .unwrap_or_default();
        let min = ds_config.get("min").map(String::as_str).unwrap_or("U");
        let max = ds_config.get("max").map(String::as_str).unwrap_or("U");
        let rate = update_rate.max(1);
        let heartbeat = 2 * rate;

        let mut args = vec![
            "--start".to_string(),
            first_epoch.saturating_sub(rate).to_string(),
            "--step".to_string(),
            rate.to_string(),
            format!("DS:{DS_NAME}:{}:{heartbeat}:{min}:{max}", ds_type.as_wire()),
        ];
        for (multiplier, count) in archives_for(profile, rate) {
            for cf in ["AVERAGE", "MIN", "MAX"] {
                args.push(format!("RRA:{cf}:0.5:{multiplier}:{count}"));
            }
        }

        tracing::debug!(path = %path.display(), profile, "creating rrd file");
        if let Err(e) = self.engine.create(path, &args).await {
            tracing::error!(path = %path.display(), error = %e, "rrd create failed");
        }
    }

    /// Write samples for one file, in one batch where possible.
    ///
    /// Samples at or before the last committed `when` are dropped, and
    /// scientific notation is rewritten since the engine rejects it.
    /// Returns the newest accepted `when`, or 0 when nothing landed.
    pub async fn update(&self, path: &Path, data: &FieldData, state: &mut WorkerState) -> u64 {
        let key = format!("{}:{DS_NAME}", path.display());
        let mut last_when = state.last_committed_when(&key).unwrap_or(0);

        let mut accepted: Vec<(u64, String)> = Vec::new();
        for (when, value) in data.whens.iter().zip(data.values.iter()) {
            if *when <= last_when {
                tracing::debug!(
                    path = %path.display(),
                    when,
                    last_when,
                    "dropping non-monotonic sample"
                );
                continue;
            }
            last_when = *when;
            accepted.push((*when, normalize_scientific(value)));
        }

        if accepted.is_empty() {
            return 0;
        }

        let samples: Vec<String> = accepted
            .iter()
            .map(|(when, value)| format!("{when}:{value}"))
            .collect();

        let daemon = self.daemon.as_deref();
        let mut written = samples.len();
        if daemon.is_some() && samples.len() > MAX_CACHED_BATCH {
            // rrdcached chokes on oversized command lines
            for (i, sample) in samples.iter().enumerate() {
                if let Err(e) = self
                    .engine
                    .update(path, daemon, std::slice::from_ref(sample))
                    .await
                {
                    tracing::error!(path = %path.display(), error = %e, "rrd update failed");
                    written = i;
                    break;
                }
            }
        } else if let Err(e) = self.engine.update(path, daemon, &samples).await {
            tracing::error!(path = %path.display(), error = %e, "rrd update failed");
            written = 0;
        }

        let mut committed = 0;
        for (when, value) in accepted.iter().take(written) {
            state.record_value(&key, *when, value);
            committed = *when;
        }
        committed
    }

    /// Push the autotune subset of a declaration into an existing file.
    ///
    /// Only `type`, `min` and `max` propagate; each property goes to the
    /// engine independently so one failure does not block the rest.
    pub async fn tune(&self, path: &Path, ds_config: &FieldConfig) {
        let properties = [
            ("type", "--data-source-type"),
            ("min", "--minimum"),
            ("max", "--maximum"),
        ];
        for (attr, flag) in properties {
            let Some(value) = ds_config.get(attr) else {
                continue;
            };
            let value = if attr == "type" {
                pulse_core::DsType::parse(value).as_wire().to_string()
            } else {
                value.clone()
            };
            let args = vec![flag.to_string(), format!("{DS_NAME}:{value}")];
            if let Err(e) = self.engine.tune(path, &args).await {
                tracing::error!(path = %path.display(), attr, error = %e, "rrd tune failed");
            }
        }
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
