// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Cache-daemon socket wiring.
//!
//! The engine picks the daemon up through `RRDCACHED_ADDRESS`, so the
//! worker must set it before any engine call and clear it when the
//! socket is unusable so the engine falls back to direct file I/O.

use std::path::Path;

/// Environment variable the rrd engine reads for its cache daemon.
pub const RRDCACHED_ADDRESS: &str = "RRDCACHED_ADDRESS";

/// Probe the configured socket and publish or clear the address.
///
/// Returns the usable daemon address, if any.
pub fn configure(socket: Option<&str>) -> Option<String> {
    match socket {
        Some(socket) if socket_usable(Path::new(socket)) => {
            std::env::set_var(RRDCACHED_ADDRESS, socket);
            Some(socket.to_string())
        }
        Some(socket) => {
            tracing::warn!(socket, "rrdcached socket unusable, using direct file I/O");
            std::env::remove_var(RRDCACHED_ADDRESS);
            None
        }
        None => {
            std::env::remove_var(RRDCACHED_ADDRESS);
            None
        }
    }
}

fn socket_usable(path: &Path) -> bool {
    match std::fs::metadata(path) {
        Ok(meta) => !meta.permissions().readonly(),
        Err(_) => false,
    }
}

#[cfg(test)]
#[path = "cached_tests.rs"]
mod tests;
