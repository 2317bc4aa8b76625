// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Human duration parsing and sample-timestamp rounding.
//!
//! Durations arrive from the agent as `<number><unit>` strings (`5m`,
//! `1h`, `400d`). Update rates may additionally carry an `aligned` word,
//! and retention profiles a comma-separated archive list.

/// Seconds in a month (31 days) and a year (365 days).
const MONTH_SECS: u64 = 31 * 86400;
const YEAR_SECS: u64 = 365 * 86400;

/// Parse a duration like `"5m"` or `"2d"` into seconds.
///
/// Recognised suffixes: `s m h d w t y` (t = month of 31 days,
/// y = year of 365 days). A bare number or an unrecognised suffix is
/// taken as integer seconds; an unparseable number yields 0.
pub fn to_seconds(s: &str) -> u64 {
    let s = s.trim();
    let (num_str, suffix) = s
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit())
        .map(|(i, _)| (&s[..i], &s[i..]))
        .unwrap_or((s, ""));

    let num: u64 = match num_str.parse() {
        Ok(n) => n,
        Err(_) => return 0,
    };

    let multiplier = match suffix {
        "s" | "" => 1,
        "m" => 60,
        "h" => 3600,
        "d" => 86400,
        "w" => 604800,
        "t" => MONTH_SECS,
        "y" => YEAR_SECS,
        _ => 1,
    };

    num * multiplier
}

/// Round `when` down to a multiple of `granularity` (0 = no rounding).
pub fn round_to_granularity(when: u64, granularity: u64) -> u64 {
    if granularity == 0 {
        when
    } else {
        when - (when % granularity)
    }
}

/// Resolve a fetch-line timestamp token: the sentinel `N` means "now".
pub fn resolve_when(token: &str, now: u64) -> Option<u64> {
    if token == "N" {
        Some(now)
    } else {
        token.parse().ok()
    }
}

/// Parse an update-rate declaration: `<number><unit>?( aligned)?`.
///
/// Returns `(seconds, aligned)`; anything that does not match the shape
/// yields `(0, false)` so the caller falls back to its default rate.
pub fn parse_update_rate(s: &str) -> (u64, bool) {
    let mut words = s.split_whitespace();
    let (spec, aligned) = match (words.next(), words.next(), words.next()) {
        (Some(spec), None, _) => (spec, false),
        (Some(spec), Some("aligned"), None) => (spec, true),
        _ => return (0, false),
    };

    let digits = spec.chars().take_while(|c| c.is_ascii_digit()).count();
    let suffix = &spec[digits..];
    let suffix_ok = matches!(suffix, "" | "s" | "m" | "h" | "d" | "w" | "t" | "y");
    if digits == 0 || !suffix_ok {
        return (0, false);
    }

    (to_seconds(spec), aligned)
}

/// Parse a `custom` retention profile into `(multiplier, count)` archive
/// pairs relative to `update_rate`.
///
/// The first comma-separated element is the full resolution: a bare
/// number `n` means `(1, n)`, while `<step> for <span>` means
/// `(step/update_rate, span/step)`. Subsequent elements are either
/// explicit `<mul> <count>` pairs or further `for`-forms. Every count is
/// inflated by 10% (at least +1) to tolerate write latency.
pub fn parse_custom_resolution(spec: &str, update_rate: u64) -> Vec<(u64, u64)> {
    let rate = update_rate.max(1);
    let mut archives = Vec::new();

    for (i, element) in spec.split(',').map(str::trim).enumerate() {
        if element.is_empty() {
            continue;
        }
        let words: Vec<&str> = element.split_whitespace().collect();
        let pair = match words.as_slice() {
            [step, "for", span] => {
                let step = to_seconds(step).max(1);
                let span = to_seconds(span);
                ((step / rate).max(1), span / step)
            }
            [count] if i == 0 => (1, to_seconds(count)),
            [mul, count] => (to_seconds(mul).max(1), to_seconds(count)),
            _ => continue,
        };
        archives.push(pair);
    }

    for archive in &mut archives {
        archive.1 += (archive.1 / 10).max(1);
    }

    archives
}

#[cfg(test)]
#[path = "timespec_tests.rs"]
mod tests;
