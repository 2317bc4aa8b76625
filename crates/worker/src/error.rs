// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for the update worker

use pulse_wire::{SessionError, TransportError};
use thiserror::Error;

/// Failures that end a run. Per-field and per-operation problems
/// (missing labels, store errors, drift ambiguity) are logged and the
/// run continues; these are the ones the dispatcher sees.
#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("transport failure: {0}")]
    Transport(#[from] TransportError),
    #[error("session failure: {0}")]
    Session(#[from] SessionError),
}
