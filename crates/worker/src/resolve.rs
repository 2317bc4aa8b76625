// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Address fallback resolution for hosts configured without one.

use pulse_core::Host;

async fn resolves(name: &str) -> bool {
    tokio::net::lookup_host((name, 0))
        .await
        .map(|mut addrs| addrs.next().is_some())
        .unwrap_or(false)
}

/// Pick the address to dial.
///
/// An explicit `address` always wins. Otherwise a dotted `host_name`
/// that resolves is used as-is, then `<group>.<host>`, and finally the
/// bare `host_name` unresolved (the connect will surface the failure).
pub async fn resolve_address(host: &Host) -> String {
    if let Some(address) = &host.address {
        return address.clone();
    }
    if host.host_name.contains('.') && resolves(&host.host_name).await {
        return host.host_name.clone();
    }
    let qualified = format!("{}.{}", host.group_name, host.host_name);
    if resolves(&qualified).await {
        return qualified;
    }
    tracing::debug!(host = host.host_name, "address unresolved, dialing bare host name");
    host.host_name.clone()
}

#[cfg(test)]
#[path = "resolve_tests.rs"]
mod tests;
