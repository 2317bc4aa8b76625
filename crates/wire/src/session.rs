// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Ordered conversation with one remote agent.
//!
//! Requests are pipelined one at a time: `cap`, `list`, `config`,
//! `fetch`, `spoolfetch`, `quit`. Multi-line responses end with a lone
//! `.`. Every read and write is bounded by the session timeout; the
//! transport (and any helper process behind it) is torn down on every
//! exit path.

use crate::parser::{is_noise, WireError};
use crate::transport::{Transport, TransportError};
use std::collections::HashSet;
use std::time::Duration;
use thiserror::Error;

/// Errors from a node session
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("transport failure: {0}")]
    Transport(#[from] TransportError),
    #[error("protocol violation: {0}")]
    Protocol(String),
    /// Benign: the agent had nothing spooled and no cursor to offer.
    #[error("no spoolfetch data")]
    NoSpoolfetchData,
}

impl From<WireError> for SessionError {
    fn from(e: WireError) -> Self {
        SessionError::Protocol(e.to_string())
    }
}

/// An open session with one agent.
pub struct NodeSession<T: Transport> {
    transport: T,
    timeout: Duration,
    capabilities: HashSet<String>,
}

impl<T: Transport> NodeSession<T> {
    /// Take ownership of a connected transport and consume the banner.
    pub async fn open(transport: T, timeout: Duration) -> Result<Self, SessionError> {
        let mut session = Self {
            transport,
            timeout,
            capabilities: HashSet::new(),
        };
        match session.must_line().await {
            Ok(banner) => {
                tracing::debug!(banner, "session opened");
                Ok(session)
            }
            Err(e) => {
                // A half-open transport may have a helper behind it.
                session.transport.shutdown().await;
                Err(e)
            }
        }
    }

    async fn read_line(&mut self) -> Result<Option<String>, SessionError> {
        let line = tokio::time::timeout(self.timeout, self.transport.read_line())
            .await
            .map_err(|_| TransportError::Timeout)??;
        Ok(line)
    }

    async fn must_line(&mut self) -> Result<String, SessionError> {
        self.read_line()
            .await?
            .ok_or_else(|| SessionError::Protocol("unexpected end of stream".to_string()))
    }

    async fn send(&mut self, line: &str) -> Result<(), SessionError> {
        tokio::time::timeout(self.timeout, self.transport.write_line(line))
            .await
            .map_err(|_| TransportError::Timeout)??;
        Ok(())
    }

    /// Offer our capabilities and record what the agent supports.
    pub async fn negotiate(&mut self, offered: &[&str]) -> Result<(), SessionError> {
        self.send(&format!("cap {}", offered.join(" "))).await?;
        let reply = self.must_line().await?;
        if let Some(caps) = reply.strip_prefix("cap") {
            self.capabilities = caps.split_whitespace().map(str::to_string).collect();
        } else {
            // Old agents answer with an error banner; treat as no caps.
            tracing::debug!(reply, "agent did not negotiate capabilities");
        }
        Ok(())
    }

    pub fn has_capability(&self, cap: &str) -> bool {
        self.capabilities.contains(cap)
    }

    /// Enumerate the agent's plugins.
    pub async fn list(&mut self) -> Result<Vec<String>, SessionError> {
        self.send("list").await?;
        let line = self.must_line().await?;
        Ok(line.split_whitespace().map(str::to_string).collect())
    }

    /// Request `config <plugin>` and return the sanitised response lines.
    pub async fn config(&mut self, plugin: &str) -> Result<Vec<String>, SessionError> {
        self.command(&format!("config {plugin}")).await
    }

    /// Request `fetch <plugin>` and return the sanitised response lines.
    pub async fn fetch(&mut self, plugin: &str) -> Result<Vec<String>, SessionError> {
        self.command(&format!("fetch {plugin}")).await
    }

    async fn command(&mut self, request: &str) -> Result<Vec<String>, SessionError> {
        self.send(request).await?;
        let mut lines = Vec::new();
        loop {
            let line = self.must_line().await?;
            if line.trim() == "." {
                return Ok(lines);
            }
            if is_noise(&line) {
                continue;
            }
            lines.push(line.trim().to_string());
        }
    }

    /// Start streaming a spoolfetch response.
    ///
    /// Spoolfetch replays may be arbitrarily large, so the response is
    /// never buffered whole: the caller pulls lines one at a time and
    /// commits finished service blocks as they arrive.
    pub async fn spoolfetch(&mut self, cursor: &str) -> Result<SpoolStream<'_, T>, SessionError> {
        self.send(&format!("spoolfetch {cursor}")).await?;
        Ok(SpoolStream {
            session: self,
            cursor: None,
            saw_data: false,
        })
    }

    pub fn helper_pid(&self) -> Option<u32> {
        self.transport.helper_pid()
    }

    /// Say goodbye (best effort) and tear the transport down, reaping
    /// any helper process. Safe to call on aborted sessions.
    pub async fn close(&mut self) {
        let _ = self.send("quit").await;
        if let Some(pid) = self.transport.helper_pid() {
            tracing::debug!(pid, "reaping transport helper");
        }
        self.transport.shutdown().await;
    }
}

/// An in-flight spoolfetch response.
///
/// A bare epoch line inside the stream is the agent's cursor; the last
/// one seen wins and is consumed here rather than handed to the caller.
pub struct SpoolStream<'a, T: Transport> {
    session: &'a mut NodeSession<T>,
    cursor: Option<String>,
    saw_data: bool,
}

impl<T: Transport> SpoolStream<'_, T> {
    /// Next data line, or `None` at the terminator.
    pub async fn next_line(&mut self) -> Result<Option<String>, SessionError> {
        loop {
            let line = self.session.must_line().await?;
            let line = line.trim();
            if line == "." {
                return Ok(None);
            }
            if is_noise(line) {
                continue;
            }
            if line.bytes().all(|b| b.is_ascii_digit()) {
                self.cursor = Some(line.to_string());
                continue;
            }
            self.saw_data = true;
            return Ok(Some(line.to_string()));
        }
    }

    /// The cursor to persist, once the stream is exhausted.
    ///
    /// An empty stream with no cursor is the benign
    /// [`SessionError::NoSpoolfetchData`]; data without a final cursor is
    /// a protocol violation.
    pub fn finish(self) -> Result<String, SessionError> {
        match self.cursor {
            Some(cursor) => Ok(cursor),
            None if self.saw_data => Err(SessionError::Protocol(
                "spoolfetch stream ended without a cursor".to_string(),
            )),
            None => Err(SessionError::NoSpoolfetchData),
        }
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
