// src/duration.rs

//! Duration strings as written in container labels and the config file.

use std::time::Duration;

use crate::errors::{Result, TugbotError};

/// Parse a duration string like `"10s"`, `"250ms"`, `"1.5h"` or `"1m30s"`.
///
/// One or more `<number><unit>` groups are summed. Supported units are
/// `ns`, `us` (or `µs`), `ms`, `s`, `m` and `h`. Zero-length durations are
/// rejected: a timer needs a positive period.
pub fn parse_duration(s: &str) -> Result<Duration> {
    let s = s.trim();
    if s.is_empty() {
        return Err(invalid(s, "empty duration string"));
    }
    if s.starts_with('-') {
        return Err(invalid(s, "negative durations are not allowed"));
    }

    let mut rest = s.strip_prefix('+').unwrap_or(s);
    let mut total_nanos: f64 = 0.0;

    while !rest.is_empty() {
        let num_len = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(rest.len());
        if num_len == 0 {
            return Err(invalid(s, "expected a number"));
        }
        let (num_part, after_num) = rest.split_at(num_len);
        let value: f64 = num_part
            .parse()
            .map_err(|e| invalid(s, &format!("invalid number '{num_part}': {e}")))?;

        let unit_len = after_num
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(after_num.len());
        let (unit, after_unit) = after_num.split_at(unit_len);
        let scale = unit_nanos(unit).ok_or_else(|| {
            if unit.is_empty() {
                invalid(s, "missing unit suffix")
            } else {
                invalid(
                    s,
                    &format!("unsupported unit '{unit}'; expected ns, us, ms, s, m or h"),
                )
            }
        })?;

        total_nanos += value * scale;
        rest = after_unit;
    }

    if !total_nanos.is_finite() || total_nanos > u64::MAX as f64 {
        return Err(invalid(s, "duration out of range"));
    }
    let nanos = total_nanos.round() as u64;
    if nanos == 0 {
        return Err(invalid(s, "duration must be greater than zero"));
    }

    Ok(Duration::from_nanos(nanos))
}

fn unit_nanos(unit: &str) -> Option<f64> {
    match unit {
        "ns" => Some(1.0),
        "us" | "µs" | "μs" => Some(1e3),
        "ms" => Some(1e6),
        "s" => Some(1e9),
        "m" => Some(60.0 * 1e9),
        "h" => Some(3600.0 * 1e9),
        _ => None,
    }
}

fn invalid(input: &str, reason: &str) -> TugbotError {
    TugbotError::InvalidDuration(format!("'{input}': {reason}"))
}
