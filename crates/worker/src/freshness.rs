// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-service freshness gate.
//!
//! `last_updated` stamps carry microsecond resolution so sub-second
//! polling rates still behave. The stamp moves only after a service's
//! response is actually received; a crashing fetch therefore retries on
//! the next cycle instead of being silently skipped for a full period.

use pulse_core::{Clock, WorkerState};
use std::sync::Arc;

/// Decides whether a service needs re-polling.
#[derive(Clone)]
pub struct FreshnessClock {
    clock: Arc<dyn Clock>,
}

fn parse_stamp(stamp: &str) -> Option<(u64, u32)> {
    let (sec, usec) = stamp.split_once(' ')?;
    Some((sec.parse().ok()?, usec.parse().ok()?))
}

impl FreshnessClock {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }

    /// True when the service was polled less than `rate_secs` ago and
    /// this cycle should skip it. Unknown or garbled stamps count as
    /// stale.
    pub fn is_fresh_enough(&self, state: &WorkerState, service: &str, rate_secs: u64) -> bool {
        let Some((sec, usec)) = state
            .last_updated
            .get(service)
            .and_then(|stamp| parse_stamp(stamp))
        else {
            return false;
        };
        let (now_sec, now_usec) = self.clock.epoch_micros();
        let stored = i128::from(sec) * 1_000_000 + i128::from(usec);
        let now = i128::from(now_sec) * 1_000_000 + i128::from(now_usec);
        now - stored < i128::from(rate_secs) * 1_000_000
    }

    /// Stamp the service as polled now. Call after successful receipt.
    pub fn mark_polled(&self, state: &mut WorkerState, service: &str) {
        let (sec, usec) = self.clock.epoch_micros();
        state
            .last_updated
            .insert(service.to_string(), format!("{sec} {usec}"));
    }
}

#[cfg(test)]
#[path = "freshness_tests.rs"]
mod tests;
