//! Byte-size parsing and formatting.
//!
//! Size limits arrive as human-oriented strings like `"1MB"` or `"500KB"`,
//! or as plain byte counts. Units are powers of 1024 (B, KB, MB, GB).
//!
//! Formatting is lossy display: `parse_size` applied to a `format_size`
//! result is not required to reproduce the original byte count, but
//! `format_size` is monotonic in its input.

/// Fallback limit when a size string cannot be parsed: 1 MiB.
pub const DEFAULT_LIMIT_BYTES: u64 = 1024 * 1024;

const KIB: f64 = 1024.0;
const MIB: f64 = 1024.0 * 1024.0;
const GIB: f64 = 1024.0 * 1024.0 * 1024.0;

/// Parse a human-readable size into bytes.
///
/// Accepts a plain integer byte count (`"1048576"`) or `<number><unit>` with
/// unit one of B, KB, MB, GB (case-insensitive, optional whitespace before
/// the unit). Decimal numbers are allowed (`"0.5MB"`). The result is floored
/// to a whole byte count. Returns `None` for anything else.
pub fn parse_size(input: &str) -> Option<u64> {
    let s = input.trim();
    if s.is_empty() {
        return None;
    }

    let number_end = s
        .find(|c: char| !c.is_ascii_digit() && c != '.')
        .unwrap_or(s.len());
    let (number, unit) = s.split_at(number_end);

    let value: f64 = number.parse().ok()?;
    let multiplier = match unit.trim().to_ascii_uppercase().as_str() {
        "" | "B" => 1.0,
        "KB" => KIB,
        "MB" => MIB,
        "GB" => GIB,
        _ => return None,
    };

    Some((value * multiplier).floor() as u64)
}

/// Parse a size, falling back to [`DEFAULT_LIMIT_BYTES`] on unrecognized input.
///
/// A malformed limit must never fail a hook run, so the fallback is paired
/// with a warning message for the caller to surface instead of an error.
pub fn parse_size_or_default(input: &str) -> (u64, Option<String>) {
    match parse_size(input) {
        Some(bytes) => (bytes, None),
        None => (
            DEFAULT_LIMIT_BYTES,
            Some(format!(
                "invalid size format {input:?}, using default {}",
                format_size(DEFAULT_LIMIT_BYTES)
            )),
        ),
    }
}

/// Render a byte count with the largest unit where the value is at least 1.
///
/// KB/MB/GB get two decimal places; plain bytes print as an integer.
pub fn format_size(bytes: u64) -> String {
    let b = bytes as f64;
    if b >= GIB {
        format!("{:.2}GB", b / GIB)
    } else if b >= MIB {
        format!("{:.2}MB", b / MIB)
    } else if b >= KIB {
        format!("{:.2}KB", b / KIB)
    } else {
        format!("{bytes}B")
    }
}
