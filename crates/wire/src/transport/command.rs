// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Indirect transport through a helper process (ssh tunnel, local
//! command). The child's stdio carries the line protocol; the child PID
//! is published so the session can reap strays on abort.

use super::{Transport, TransportError};
use async_trait::async_trait;
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};

pub struct CommandTransport {
    child: Child,
    reader: BufReader<ChildStdout>,
    writer: ChildStdin,
}

impl CommandTransport {
    /// Spawn the helper and wire its stdio up as the protocol channel.
    pub fn spawn(program: &str, args: &[String]) -> Result<Self, TransportError> {
        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| TransportError::ConnectFailed(format!("{program}: {e}")))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| TransportError::ConnectFailed("helper stdout unavailable".into()))?;
        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| TransportError::ConnectFailed("helper stdin unavailable".into()))?;

        Ok(Self {
            child,
            reader: BufReader::new(stdout),
            writer: stdin,
        })
    }
}

#[async_trait]
impl Transport for CommandTransport {
    async fn read_line(&mut self) -> Result<Option<String>, TransportError> {
        let mut line = String::new();
        let n = self.reader.read_line(&mut line).await?;
        if n == 0 {
            return Ok(None);
        }
        while line.ends_with('\n') || line.ends_with('\r') {
            line.pop();
        }
        Ok(Some(line))
    }

    async fn write_line(&mut self, line: &str) -> Result<(), TransportError> {
        self.writer.write_all(line.as_bytes()).await?;
        self.writer.write_all(b"\n").await?;
        self.writer.flush().await?;
        Ok(())
    }

    fn helper_pid(&self) -> Option<u32> {
        self.child.id()
    }

    async fn shutdown(&mut self) {
        // Reap the helper unconditionally: a clean quit usually lets it
        // exit on its own, an aborted session leaves it mid-read.
        match self.child.try_wait() {
            Ok(Some(_)) => {}
            Ok(None) | Err(_) => {
                if let Err(e) = self.child.start_kill() {
                    tracing::warn!(error = %e, "failed to signal helper process");
                }
                let _ = self.child.wait().await;
            }
        }
    }
}
