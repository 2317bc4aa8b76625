// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! pulse-core: Data model and shared helpers for the Pulse update worker

pub mod clock;
pub mod host;
pub mod service;
pub mod settings;
pub mod state;
pub mod timespec;
pub mod value;

pub use clock::{Clock, SystemClock};
pub use host::Host;
pub use service::{DsType, FieldConfig, FieldData, ServiceConfigs, ServiceData};
pub use settings::Settings;
pub use state::{OldConfig, ValuePair, WorkerState};
pub use value::{carbon_value, normalize_scientific};

#[cfg(any(test, feature = "test-support"))]
pub use clock::FakeClock;
