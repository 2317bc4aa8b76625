// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Parsed service declarations and sample sequences.
//!
//! A service is one metric producer on the agent; under multigraph it may
//! present nested sub-services (`disk.read`, `disk.write`). Each service
//! carries service-wide attributes and per-field ("data source")
//! attribute maps.

use crate::timespec::parse_update_rate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Attribute map for one data source (`label`, `type`, `min`, ...).
pub type FieldConfig = HashMap<String, String>;

/// On-disk data-source type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DsType {
    #[default]
    Gauge,
    Counter,
    Derive,
    Absolute,
}

impl DsType {
    /// Parse the wire form (`GAUGE`, `counter`, ...); unknown types fall
    /// back to the default.
    pub fn parse(s: &str) -> Self {
        match s.to_ascii_uppercase().as_str() {
            "COUNTER" => DsType::Counter,
            "DERIVE" => DsType::Derive,
            "ABSOLUTE" => DsType::Absolute,
            _ => DsType::Gauge,
        }
    }

    /// Uppercase wire form, as handed to the RRD engine.
    pub fn as_wire(self) -> &'static str {
        match self {
            DsType::Gauge => "GAUGE",
            DsType::Counter => "COUNTER",
            DsType::Derive => "DERIVE",
            DsType::Absolute => "ABSOLUTE",
        }
    }

    /// Lower-cased first character, embedded in the rrd filename so a
    /// type change lands in a fresh file.
    pub fn initial(self) -> char {
        match self {
            DsType::Gauge => 'g',
            DsType::Counter => 'c',
            DsType::Derive => 'd',
            DsType::Absolute => 'a',
        }
    }
}

impl std::fmt::Display for DsType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_wire())
    }
}

/// Nested service configuration accumulated from `config` responses.
///
/// `global` keeps service-wide attributes as ordered `(key, value)` pairs
/// (declaration order matters for inherited-setting lookup);
/// `data_source` nests `service -> field -> attribute -> value`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServiceConfigs {
    pub global: HashMap<String, Vec<(String, String)>>,
    pub data_source: HashMap<String, HashMap<String, FieldConfig>>,
}

impl ServiceConfigs {
    /// Append a service-wide attribute, preserving declaration order.
    pub fn push_global(&mut self, service: &str, key: &str, value: &str) {
        self.global
            .entry(service.to_string())
            .or_default()
            .push((key.to_string(), value.to_string()));
    }

    /// Set one field attribute.
    pub fn set_field_attr(&mut self, service: &str, field: &str, key: &str, value: &str) {
        self.data_source
            .entry(service.to_string())
            .or_default()
            .entry(field.to_string())
            .or_default()
            .insert(key.to_string(), value.to_string());
    }

    /// Last declared value of a service-wide attribute.
    pub fn global_attr(&self, service: &str, key: &str) -> Option<&str> {
        self.global.get(service).and_then(|attrs| {
            attrs
                .iter()
                .rev()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.as_str())
        })
    }

    /// One field's attribute map.
    pub fn field(&self, service: &str, field: &str) -> Option<&FieldConfig> {
        self.data_source.get(service).and_then(|f| f.get(field))
    }

    /// Inherited setting lookup: field attribute, then service attribute.
    pub fn inherited(&self, service: &str, field: Option<&str>, key: &str) -> Option<&str> {
        if let Some(field) = field {
            if let Some(value) = self.field(service, field).and_then(|c| c.get(key)) {
                return Some(value.as_str());
            }
        }
        self.global_attr(service, key)
    }

    /// Effective `(seconds, aligned)` update rate for a service,
    /// falling back to `default_rate` when undeclared or malformed.
    pub fn update_rate(&self, service: &str, default_rate: u64) -> (u64, bool) {
        match self.inherited(service, None, "update_rate") {
            Some(declared) => match parse_update_rate(declared) {
                (0, _) => (default_rate, false),
                parsed => parsed,
            },
            None => (default_rate, false),
        }
    }

    /// Declared data-source type of a field (default Gauge).
    pub fn ds_type(&self, service: &str, field: &str) -> DsType {
        self.field(service, field)
            .and_then(|c| c.get("type"))
            .map(|t| DsType::parse(t))
            .unwrap_or_default()
    }
}

/// Index-aligned sample sequences for one field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldData {
    pub whens: Vec<u64>,
    pub values: Vec<String>,
}

impl FieldData {
    pub fn push(&mut self, when: u64, value: String) {
        self.whens.push(when);
        self.values.push(value);
    }

    pub fn len(&self) -> usize {
        self.whens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.whens.is_empty()
    }
}

/// Samples accumulated from `fetch`/dirty-config/spoolfetch responses,
/// nested `service -> field`.
#[derive(Debug, Clone, Default)]
pub struct ServiceData {
    pub services: HashMap<String, HashMap<String, FieldData>>,
}

impl ServiceData {
    pub fn push_sample(&mut self, service: &str, field: &str, when: u64, value: String) {
        self.services
            .entry(service.to_string())
            .or_default()
            .entry(field.to_string())
            .or_default()
            .push(when, value);
    }

    pub fn field(&self, service: &str, field: &str) -> Option<&FieldData> {
        self.services.get(service).and_then(|f| f.get(field))
    }

    pub fn is_empty(&self) -> bool {
        self.services.values().all(|fields| fields.is_empty())
    }

    /// Largest sample epoch across all services, 0 when none.
    pub fn max_when(&self) -> u64 {
        self.services
            .values()
            .flat_map(|fields| fields.values())
            .flat_map(|data| data.whens.iter().copied())
            .max()
            .unwrap_or(0)
    }
}

#[cfg(test)]
#[path = "service_tests.rs"]
mod tests;
