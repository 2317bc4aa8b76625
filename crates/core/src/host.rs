// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Monitored-host descriptor.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

fn default_port() -> u16 {
    4949
}

/// One configured monitored node. Immutable for the duration of a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Host {
    pub group_name: String,
    pub host_name: String,
    /// Overrides address resolution when set.
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Per-service declaration overrides from the host configuration,
    /// keyed by service name, in declaration order.
    #[serde(default)]
    pub service_config: HashMap<String, Vec<(String, String)>>,
}

impl Host {
    pub fn new(group_name: impl Into<String>, host_name: impl Into<String>) -> Self {
        Self {
            group_name: group_name.into(),
            host_name: host_name.into(),
            address: None,
            port: default_port(),
            service_config: HashMap::new(),
        }
    }

    /// The `group;host` path that seeds the on-disk layout.
    pub fn path(&self) -> String {
        format!("{};{}", self.group_name, self.host_name)
    }
}
