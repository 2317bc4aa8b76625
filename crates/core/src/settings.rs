// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Worker configuration options.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Duration;

fn default_dbdir() -> PathBuf {
    PathBuf::from("/var/lib/pulse")
}

fn default_carbon_port() -> u16 {
    2003
}

fn default_graph_data_size() -> String {
    "normal".to_string()
}

fn default_update_rate() -> u64 {
    300
}

fn default_timeout_secs() -> u64 {
    180
}

/// Options the update worker recognises, loaded from the master
/// configuration file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    /// Root of the on-disk rrd layout.
    #[serde(default = "default_dbdir")]
    pub dbdir: PathBuf,
    /// Path to an rrdcached UNIX socket; absent means direct file I/O.
    #[serde(default)]
    pub rrdcached_socket: Option<String>,
    #[serde(default)]
    pub carbon_server: Option<String>,
    #[serde(default = "default_carbon_port")]
    pub carbon_port: u16,
    #[serde(default)]
    pub carbon_prefix: Option<String>,
    /// When non-empty, only these plugins are polled in the list path.
    #[serde(default)]
    pub limit_services: HashSet<String>,
    /// Default retention profile: `normal`, `huge`, or `custom <spec>`.
    #[serde(default = "default_graph_data_size")]
    pub graph_data_size: String,
    /// Default polling rate in seconds.
    #[serde(default = "default_update_rate")]
    pub update_rate: u64,
    /// Session-level read/write timeout.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            dbdir: default_dbdir(),
            rrdcached_socket: None,
            carbon_server: None,
            carbon_port: default_carbon_port(),
            carbon_prefix: None,
            limit_services: HashSet::new(),
            graph_data_size: default_graph_data_size(),
            update_rate: default_update_rate(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Settings {
    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[cfg(test)]
#[path = "settings_tests.rs"]
mod tests;
