// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Folds a stream of wire events into nested config and sample
//! structures.
//!
//! One accumulator handles one agent response (or the whole spoolfetch
//! stream): it carries the current multigraph context, resolves `N`
//! sentinels through the clock, snaps aligned update rates, and tracks
//! the largest sample epoch seen. A non-zero epoch after a config pass
//! means a dirty config advanced the data and the explicit fetch can be
//! skipped.

use crate::message::{When, WireEvent};
use crate::parser::{parse_config_line, parse_fetch_line, WireError};
use pulse_core::timespec::round_to_granularity;
use pulse_core::{Clock, ServiceConfigs, ServiceData};
use std::sync::Arc;

pub struct Accumulator {
    current: String,
    configs: ServiceConfigs,
    data: ServiceData,
    last_when: u64,
    default_rate: u64,
    clock: Arc<dyn Clock>,
}

impl Accumulator {
    pub fn new(service: &str, default_rate: u64, clock: Arc<dyn Clock>) -> Self {
        Self {
            current: service.to_string(),
            configs: ServiceConfigs::default(),
            data: ServiceData::default(),
            last_when: 0,
            default_rate,
            clock,
        }
    }

    /// The service subsequent lines belong to (changes on multigraph).
    pub fn current_service(&self) -> &str {
        &self.current
    }

    /// Largest sample epoch applied so far, 0 when none.
    pub fn last_when(&self) -> u64 {
        self.last_when
    }

    pub fn configs(&self) -> &ServiceConfigs {
        &self.configs
    }

    pub fn data(&self) -> &ServiceData {
        &self.data
    }

    pub fn into_parts(self) -> (ServiceConfigs, ServiceData) {
        (self.configs, self.data)
    }

    /// Parse and apply one config-grammar line.
    pub fn feed_config_line(&mut self, line: &str) -> Result<(), WireError> {
        let event = parse_config_line(line)?;
        self.apply(event);
        Ok(())
    }

    /// Parse and apply one fetch-grammar line.
    pub fn feed_fetch_line(&mut self, line: &str) -> Result<(), WireError> {
        let event = parse_fetch_line(line)?;
        self.apply(event);
        Ok(())
    }

    /// Apply one event to the accumulated structures.
    pub fn apply(&mut self, event: WireEvent) {
        match event {
            WireEvent::MultigraphSwitch { name } => {
                self.current = name;
            }
            WireEvent::ServiceAttr { key, value } => {
                self.configs.push_global(&self.current, &key, &value);
            }
            WireEvent::FieldAttr { field, key, value } => {
                self.configs
                    .set_field_attr(&self.current, &field, &key, &value);
            }
            WireEvent::Sample { field, when, value } => {
                let when = match when {
                    When::Now => self.clock.epoch_secs(),
                    When::At(epoch) => epoch,
                };
                let (rate, aligned) = self.configs.update_rate(&self.current, self.default_rate);
                let when = if aligned {
                    round_to_granularity(when, rate)
                } else {
                    when
                };
                self.data.push_sample(&self.current, &field, when, value);
                self.last_when = self.last_when.max(when);
            }
        }
    }
}

#[cfg(test)]
#[path = "accumulate_tests.rs"]
mod tests;
