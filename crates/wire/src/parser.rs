// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Line grammars for `config` and `fetch` responses.
//!
//! The two grammars share a tokenizer. A `config` line whose dotted
//! attribute is `value` is a *dirty config* inline sample and is diverted
//! through the fetch grammar, so one parser serves both passes.

use crate::message::{When, WireEvent};
use thiserror::Error;

/// Errors from wire parsing
#[derive(Debug, Error)]
pub enum WireError {
    #[error("unparseable line: {0:?}")]
    ProtocolViolation(String),
}

/// True for lines the session drops before parsing: blanks and comments.
pub fn is_noise(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.is_empty() || trimmed.starts_with('#')
}

/// Split `head value` at the first run of whitespace.
fn head_and_rest(line: &str) -> Option<(&str, &str)> {
    let head_end = line.find(char::is_whitespace)?;
    let rest = line[head_end..].trim_start();
    if rest.is_empty() {
        return None;
    }
    Some((&line[..head_end], rest))
}

/// Parse one line of a `config` response.
///
/// `head value` is a service attribute, `head.attr value` a field
/// attribute, `head.value token` an inline sample, and
/// `multigraph <name>` switches the service context.
pub fn parse_config_line(line: &str) -> Result<WireEvent, WireError> {
    let line = line.trim();
    let (head, rest) =
        head_and_rest(line).ok_or_else(|| WireError::ProtocolViolation(line.to_string()))?;

    if head == "multigraph" {
        return Ok(WireEvent::MultigraphSwitch {
            name: rest.to_string(),
        });
    }

    match head.split_once('.') {
        None => Ok(WireEvent::ServiceAttr {
            key: head.to_string(),
            value: rest.to_string(),
        }),
        Some((field, "value")) if !field.is_empty() => {
            let token = rest
                .split_whitespace()
                .next()
                .ok_or_else(|| WireError::ProtocolViolation(line.to_string()))?;
            sample_event(field, token)
        }
        Some((field, attr)) if !field.is_empty() && !attr.is_empty() => Ok(WireEvent::FieldAttr {
            field: field.to_string(),
            key: attr.to_string(),
            value: rest.to_string(),
        }),
        Some(_) => Err(WireError::ProtocolViolation(line.to_string())),
    }
}

/// Parse one line of a `fetch` (or spoolfetch) response.
pub fn parse_fetch_line(line: &str) -> Result<WireEvent, WireError> {
    let line = line.trim();
    let (head, rest) =
        head_and_rest(line).ok_or_else(|| WireError::ProtocolViolation(line.to_string()))?;

    // Spoolfetch interleaves multigraph switches with sample blocks.
    if head == "multigraph" {
        return Ok(WireEvent::MultigraphSwitch {
            name: rest.to_string(),
        });
    }

    let field = match head.split_once('.') {
        None => head,
        Some((field, _arg)) if !field.is_empty() => field,
        Some(_) => return Err(WireError::ProtocolViolation(line.to_string())),
    };

    let token = rest
        .split_whitespace()
        .next()
        .ok_or_else(|| WireError::ProtocolViolation(line.to_string()))?;
    sample_event(field, token)
}

/// Build a Sample from a `[when:]value` token.
fn sample_event(field: &str, token: &str) -> Result<WireEvent, WireError> {
    let (when_str, value) = match token.split_once(':') {
        Some((when, value)) => (Some(when), value),
        None => (None, token),
    };

    let when = match when_str {
        None | Some("N") => When::Now,
        Some(epoch) => When::At(
            epoch
                .parse()
                .map_err(|_| WireError::ProtocolViolation(format!("{field}.value {token}")))?,
        ),
    };

    Ok(WireEvent::Sample {
        field: field.to_string(),
        when,
        value: value.to_string(),
    })
}

#[cfg(test)]
#[path = "parser_tests.rs"]
mod tests;
