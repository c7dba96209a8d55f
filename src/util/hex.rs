//! Hex string validation.
//!
//! Transaction bytes travel as hex strings end to end; the node
//! expects an even number of digits (whole bytes).

/// Returns true if `s` is non-empty, even-length, and all hex digits.
pub fn is_hex(s: &str) -> bool {
    !s.is_empty() && s.len() % 2 == 0 && s.bytes().all(|b| b.is_ascii_hexdigit())
}

/// Like [`is_hex`] but accepts `None` as invalid.
pub fn is_hex_opt(s: Option<&str>) -> bool {
    s.map(is_hex).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_hex() {
        assert!(is_hex("00"));
        assert!(is_hex("deadBEEF"));
        assert!(is_hex("0123456789abcdefABCDEF00"));
    }

    #[test]
    fn test_invalid_hex() {
        assert!(!is_hex(""));
        assert!(!is_hex("abc")); // odd length
        assert!(!is_hex("zz"));
        assert!(!is_hex("12 34"));
        assert!(!is_hex_opt(None));
        assert!(is_hex_opt(Some("ff")));
    }
}
