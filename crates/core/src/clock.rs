// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Wall-clock abstraction so freshness decisions and `N` sentinels are
//! deterministic under test.

use std::time::{SystemTime, UNIX_EPOCH};

/// Source of wall-clock time.
pub trait Clock: Send + Sync {
    /// Current wall-clock time.
    fn now(&self) -> SystemTime;

    /// Current time as whole seconds since the epoch.
    fn epoch_secs(&self) -> u64 {
        self.now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs()
    }

    /// Current time as `(seconds, microseconds)` since the epoch.
    fn epoch_micros(&self) -> (u64, u32) {
        let elapsed = self
            .now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default();
        (elapsed.as_secs(), elapsed.subsec_micros())
    }
}

/// System wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> SystemTime {
        SystemTime::now()
    }
}

/// Settable clock for tests.
#[cfg(any(test, feature = "test-support"))]
#[derive(Clone)]
pub struct FakeClock {
    inner: std::sync::Arc<parking_lot::Mutex<SystemTime>>,
}

#[cfg(any(test, feature = "test-support"))]
impl FakeClock {
    /// Create a clock frozen at the given epoch second.
    pub fn at_epoch(secs: u64) -> Self {
        Self {
            inner: std::sync::Arc::new(parking_lot::Mutex::new(
                UNIX_EPOCH + std::time::Duration::from_secs(secs),
            )),
        }
    }

    /// Move the clock to the given epoch second.
    pub fn set_epoch(&self, secs: u64) {
        *self.inner.lock() = UNIX_EPOCH + std::time::Duration::from_secs(secs);
    }

    /// Advance the clock.
    pub fn advance(&self, by: std::time::Duration) {
        let mut now = self.inner.lock();
        *now += by;
    }
}

#[cfg(any(test, feature = "test-support"))]
impl Clock for FakeClock {
    fn now(&self) -> SystemTime {
        *self.inner.lock()
    }
}
