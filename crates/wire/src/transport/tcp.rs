// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Plain TCP transport.

use super::{Connector, Transport, TransportError};
use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;

/// TCP connection to an agent.
pub struct TcpTransport {
    reader: BufReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
}

impl TcpTransport {
    pub async fn connect(address: &str, port: u16) -> Result<Self, TransportError> {
        let stream = TcpStream::connect((address, port))
            .await
            .map_err(|e| TransportError::ConnectFailed(format!("{address}:{port}: {e}")))?;
        let (read_half, write_half) = stream.into_split();
        Ok(Self {
            reader: BufReader::new(read_half),
            writer: write_half,
        })
    }
}

#[async_trait]
impl Transport for TcpTransport {
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
        None
    }

    async fn shutdown(&mut self) {
        let _ = self.writer.shutdown().await;
    }
}

/// Connector producing plain TCP transports.
#[derive(Debug, Clone, Copy, Default)]
pub struct TcpConnector;

#[async_trait]
impl Connector for TcpConnector {
    type Transport = TcpTransport;

    async fn connect(&self, address: &str, port: u16) -> Result<TcpTransport, TransportError> {
        TcpTransport::connect(address, port).await
    }
}
