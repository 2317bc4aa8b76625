// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-worker persistent state.
//!
//! The dispatcher loads this blob before a run and persists it after;
//! within a run it is private to one worker. It remembers when each
//! service was last polled, the spoolfetch cursor, and the last two
//! samples committed per rrd file (so updates never re-read the file).

use crate::service::FieldConfig;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Last two `(when, value)` pairs committed to one rrd file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValuePair {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current: Option<(u64, String)>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous: Option<(u64, String)>,
}

/// Serializable worker state, opaque to the dispatcher.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkerState {
    /// `service -> "<sec> <usec>"` wall clock of the last successful poll.
    #[serde(default)]
    pub last_updated: HashMap<String, String>,
    /// Opaque cursor returned by the agent's previous spoolfetch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spoolfetch: Option<String>,
    /// `"<rrd_file>:42" ->` committed sample pairs.
    #[serde(default)]
    pub value: HashMap<String, ValuePair>,
}

impl WorkerState {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// `when` of the newest committed sample for a file key.
    pub fn last_committed_when(&self, key: &str) -> Option<u64> {
        self.value
            .get(key)
            .and_then(|pair| pair.current.as_ref())
            .map(|(when, _)| *when)
    }

    /// Record a committed sample, shifting the previous one down.
    pub fn record_value(&mut self, key: &str, when: u64, value: &str) {
        let pair = self.value.entry(key.to_string()).or_default();
        pair.previous = pair.current.take();
        pair.current = Some((when, value.to_string()));
    }
}

/// The previous run's data-source declarations, used for drift detection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OldConfig {
    /// Software version that wrote the previous declarations.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// `service -> field -> attribute -> value`.
    #[serde(default)]
    pub data_source: HashMap<String, HashMap<String, FieldConfig>>,
}

impl OldConfig {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Previous declaration of one field, if any.
    pub fn field(&self, service: &str, field: &str) -> Option<&FieldConfig> {
        self.data_source.get(service).and_then(|f| f.get(field))
    }

    /// Remember the current declaration for the next run.
    pub fn remember(&mut self, service: &str, field: &str, config: FieldConfig) {
        self.data_source
            .entry(service.to_string())
            .or_default()
            .insert(field.to_string(), config);
    }
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;
