// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake transport for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{Connector, Transport, TransportError};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

struct FakeState {
    /// Scripted responses: request line -> lines queued on write.
    responses: HashMap<String, Vec<String>>,
    /// Lines waiting to be read (seeded with the banner).
    pending: VecDeque<String>,
    /// Every line the session wrote.
    sent: Vec<String>,
    /// When set, reads hit end-of-stream after this many more lines.
    lines_until_eof: Option<usize>,
    banner: String,
    shutdown_count: usize,
}

/// Scripted in-memory transport recording the conversation.
#[derive(Clone)]
pub struct FakeTransport {
    inner: Arc<Mutex<FakeState>>,
    helper_pid: Option<u32>,
}

impl Default for FakeTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeTransport {
    pub fn new() -> Self {
        let banner = "# pulse node at fake.example.com".to_string();
        let mut pending = VecDeque::new();
        pending.push_back(banner.clone());
        Self {
            inner: Arc::new(Mutex::new(FakeState {
                responses: HashMap::new(),
                pending,
                sent: Vec::new(),
                lines_until_eof: None,
                banner,
                shutdown_count: 0,
            })),
            helper_pid: None,
        }
    }

    /// Script the response lines for one request line.
    pub fn respond(&self, request: &str, lines: &[&str]) {
        self.inner.lock().responses.insert(
            request.to_string(),
            lines.iter().map(|l| l.to_string()).collect(),
        );
    }

    /// Simulate a connection drop after `n` more lines are read.
    pub fn drop_after(&self, n: usize) {
        self.inner.lock().lines_until_eof = Some(n);
    }

    /// Pretend the transport forked a helper with this PID.
    pub fn with_helper_pid(mut self, pid: u32) -> Self {
        self.helper_pid = Some(pid);
        self
    }

    /// Every request line written so far.
    pub fn sent(&self) -> Vec<String> {
        self.inner.lock().sent.clone()
    }

    /// How many times the session shut the transport down.
    pub fn shutdown_count(&self) -> usize {
        self.inner.lock().shutdown_count
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn read_line(&mut self) -> Result<Option<String>, TransportError> {
        let mut state = self.inner.lock();
        if let Some(budget) = state.lines_until_eof.as_mut() {
            if *budget == 0 {
                return Ok(None);
            }
            *budget -= 1;
        }
        Ok(state.pending.pop_front())
    }

    async fn write_line(&mut self, line: &str) -> Result<(), TransportError> {
        let mut state = self.inner.lock();
        state.sent.push(line.to_string());
        if let Some(lines) = state.responses.get(line).cloned() {
            state.pending.extend(lines);
        }
        Ok(())
    }

    fn helper_pid(&self) -> Option<u32> {
        self.helper_pid
    }

    async fn shutdown(&mut self) {
        // Reset the conversation so a reconnect sees a fresh banner.
        let mut state = self.inner.lock();
        state.shutdown_count += 1;
        state.pending.clear();
        let banner = state.banner.clone();
        state.pending.push_back(banner);
        state.lines_until_eof = None;
    }
}

/// Connector handing out clones of one scripted transport.
#[derive(Clone)]
pub struct FakeConnector {
    transport: FakeTransport,
    refuse: bool,
}

impl FakeConnector {
    pub fn new(transport: FakeTransport) -> Self {
        Self {
            transport,
            refuse: false,
        }
    }

    /// Make every connect attempt fail.
    pub fn refusing() -> Self {
        Self {
            transport: FakeTransport::new(),
            refuse: true,
        }
    }
}

#[async_trait]
impl Connector for FakeConnector {
    type Transport = FakeTransport;

    async fn connect(&self, address: &str, port: u16) -> Result<FakeTransport, TransportError> {
        if self.refuse {
            return Err(TransportError::ConnectFailed(format!(
                "{address}:{port}: connection refused"
            )));
        }
        Ok(self.transport.clone())
    }
}
