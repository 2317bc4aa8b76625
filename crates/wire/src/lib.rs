// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! pulse-wire: Agent line protocol parsing, transports, and the node
//! session state machine.

pub mod accumulate;
pub mod message;
pub mod parser;
pub mod session;
pub mod transport;

pub use accumulate::Accumulator;
pub use message::{When, WireEvent};
pub use parser::{is_noise, parse_config_line, parse_fetch_line, WireError};
pub use session::{NodeSession, SessionError, SpoolStream};
pub use transport::{Connector, TcpConnector, TcpTransport, Transport, TransportError};

#[cfg(any(test, feature = "test-support"))]
pub use transport::{FakeConnector, FakeTransport};
