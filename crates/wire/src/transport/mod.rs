// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Line-oriented transports to a node's agent.

mod command;
mod tcp;

pub use command::CommandTransport;
pub use tcp::{TcpConnector, TcpTransport};

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeConnector, FakeTransport};

use async_trait::async_trait;
use thiserror::Error;

/// Errors from transport operations
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("connect failed: {0}")]
    ConnectFailed(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("read/write timed out")]
    Timeout,
}

/// A line-oriented channel to one agent.
///
/// Implementations that fork a helper process publish its PID so the
/// session can reap it on every exit path.
#[async_trait]
pub trait Transport: Send {
    /// Read one line without its newline; `None` on end of stream.
    async fn read_line(&mut self) -> Result<Option<String>, TransportError>;

    /// Write one line; the newline is appended.
    async fn write_line(&mut self, line: &str) -> Result<(), TransportError>;

    /// PID of the forked helper process, if any.
    fn helper_pid(&self) -> Option<u32>;

    /// Close the channel and reap any helper process.
    async fn shutdown(&mut self);
}

/// Builds a transport to `(address, port)`; the seam the dispatcher's
/// transport layer plugs into.
#[async_trait]
pub trait Connector: Send + Sync {
    type Transport: Transport;

    async fn connect(&self, address: &str, port: u16) -> Result<Self::Transport, TransportError>;
}
