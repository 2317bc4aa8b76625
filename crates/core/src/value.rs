// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Sample value normalisation.
//!
//! Agents may emit scientific notation (`1.5e-2`); the RRD engine and the
//! carbon relay both reject it, so values are rewritten to fixed point
//! before leaving the worker.

/// Exponent of a trailing scientific suffix (`…\d[eE][+-]?N`), if the
/// whole token is a well-formed scientific number.
fn scientific_exponent(value: &str) -> Option<i32> {
    let epos = value.rfind(['e', 'E'])?;
    let mantissa = &value[..epos];
    if !mantissa.ends_with(|c: char| c.is_ascii_digit()) {
        return None;
    }
    mantissa.parse::<f64>().ok()?;
    value[epos + 1..].parse::<i32>().ok()
}

/// Rewrite a scientific-notation value to fixed-point decimal.
///
/// Non-negative exponents use 4 fractional digits; negative exponents
/// widen to `|exp| + 4` fractional digits so at least 4 significant
/// digits survive. Anything else (including `U`) passes through.
pub fn normalize_scientific(value: &str) -> String {
    if let Some(exp) = scientific_exponent(value) {
        if let Ok(parsed) = value.parse::<f64>() {
            return if exp >= 0 {
                format!("{parsed:.4}")
            } else {
                let digits = exp.unsigned_abs() as usize + 4;
                format!("{parsed:.digits$}")
            };
        }
    }
    value.to_string()
}

/// Format a value for the carbon relay: scientific values are rewritten
/// as above, plain non-integer decimals are fixed to 4 fractional
/// digits, integers and `U` pass through.
pub fn carbon_value(value: &str) -> String {
    if scientific_exponent(value).is_some() {
        return normalize_scientific(value);
    }
    if value.contains('.') {
        if let Ok(parsed) = value.parse::<f64>() {
            return format!("{parsed:.4}");
        }
    }
    value.to_string()
}

#[cfg(test)]
#[path = "value_tests.rs"]
mod tests;
