// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Best-effort metric relay over plain-text TCP.
//!
//! Carbon is auxiliary: a failed connect makes the sink a no-op for the
//! rest of the run, and a failed write disables it. Nothing here ever
//! surfaces an error to the worker.

use pulse_core::carbon_value;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;

/// One worker's connection to the carbon relay.
pub struct CarbonSink {
    stream: Option<TcpStream>,
    prefix: String,
}

/// Reverse a dotted hostname: `a.b.c` -> `c.b.a`.
fn reverse_host(host: &str) -> String {
    let mut parts: Vec<&str> = host.split('.').collect();
    parts.reverse();
    parts.join(".")
}

/// Normalise the metric prefix: empty stays empty, anything else gets a
/// trailing dot.
fn normalize_prefix(prefix: Option<&str>) -> String {
    match prefix {
        None | Some("") => String::new(),
        Some(p) if p.ends_with('.') => p.to_string(),
        Some(p) => format!("{p}."),
    }
}

impl CarbonSink {
    /// Connect at the start of a run; failure degrades to a no-op sink.
    pub async fn connect(server: &str, port: u16, prefix: Option<&str>) -> Self {
        let stream = match TcpStream::connect((server, port)).await {
            Ok(stream) => Some(stream),
            Err(e) => {
                tracing::warn!(server, port, error = %e, "carbon connect failed, disabling sink");
                None
            }
        };
        Self {
            stream,
            prefix: normalize_prefix(prefix),
        }
    }

    /// A sink that never sends (no carbon_server configured).
    pub fn disabled() -> Self {
        Self {
            stream: None,
            prefix: String::new(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.stream.is_some()
    }

    /// Metric path for one sample.
    fn metric_path(&self, host: &str, service: &str, field: &str) -> String {
        format!("{}{}.{service}.{field}", self.prefix, reverse_host(host))
    }

    /// Send one sample line. Errors disable the sink silently.
    pub async fn emit(&mut self, host: &str, service: &str, field: &str, value: &str, when: u64) {
        let line = format!(
            "{} {} {when}\n",
            self.metric_path(host, service, field),
            carbon_value(value)
        );
        let Some(stream) = self.stream.as_mut() else {
            return;
        };
        if let Err(e) = stream.write_all(line.as_bytes()).await {
            tracing::warn!(error = %e, "carbon write failed, disabling sink");
            self.stream = None;
        }
    }

    /// Flush and drop the connection at the end of the run.
    pub async fn close(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            let _ = stream.flush().await;
            let _ = stream.shutdown().await;
        }
    }
}

#[cfg(test)]
#[path = "carbon_tests.rs"]
mod tests;
