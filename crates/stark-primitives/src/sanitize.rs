//! Hex string normalization

/// Normalize a hex string: lowercase, `0x` prefix, no leading zeros.
///
/// Input that is not hex is only lowercased and prefixed, so two such
/// strings still compare sensibly.
pub fn sanitize_hex(s: &str) -> String {
    let digits = s
        .trim()
        .strip_prefix("0x")
        .or_else(|| s.trim().strip_prefix("0X"))
        .unwrap_or(s.trim());
    let trimmed = digits.trim_start_matches('0');
    if trimmed.is_empty() {
        "0x0".to_string()
    } else {
        format!("0x{}", trimmed.to_ascii_lowercase())
    }
}

/// Case-insensitive comparison of two hex strings ignoring leading zeros
pub fn sanitized_hex_eq(a: &str, b: &str) -> bool {
    sanitize_hex(a) == sanitize_hex(b)
}
