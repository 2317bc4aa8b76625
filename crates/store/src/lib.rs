// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! pulse-store: On-disk time-series persistence and the carbon relay.

pub mod cached;
pub mod carbon;
pub mod engine;
pub mod path;
pub mod store;

pub use carbon::CarbonSink;
pub use engine::{EngineError, RrdEngine, RrdToolEngine};
pub use path::rrd_file_path;
pub use store::{archives_for, RrdStore, DS_NAME};

#[cfg(any(test, feature = "test-support"))]
pub use engine::{EngineCall, FakeEngine};
