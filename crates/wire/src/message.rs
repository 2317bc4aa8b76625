// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tagged wire events.
//!
//! The agent protocol is loosely typed text; each parsed line becomes one
//! of these variants and downstream consumers dispatch on them.

/// Timestamp token of a sample line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum When {
    /// The `N` sentinel: the wall clock at the instant of parsing.
    Now,
    /// Explicit epoch seconds.
    At(u64),
}

/// One parsed line of agent output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WireEvent {
    /// Service-wide attribute (`graph_title System Load`).
    ServiceAttr { key: String, value: String },
    /// Field attribute (`load.label load`).
    FieldAttr {
        field: String,
        key: String,
        value: String,
    },
    /// A sample (`load.value 0.42`, `load.value 1000:0.42`).
    Sample {
        field: String,
        when: When,
        value: String,
    },
    /// `multigraph <name>`: switch the nested service context.
    MultigraphSwitch { name: String },
}
