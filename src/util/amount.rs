//! Decimal-exact conversion between NQT and the display unit.
//!
//! 1 display unit = 10^8 NQT. Conversions run on integers and digit
//! strings; floating point would silently corrupt large balances.

use crate::error::{ClientError, ClientResult};

/// NQT per display unit.
const NQT_PER_UNIT: u128 = 100_000_000;

/// Fractional digits of the display unit.
const FRACTION_DIGITS: usize = 8;

/// Convert a display-unit decimal string (e.g. `"0.0001"`) to an NQT
/// amount string (`"10000"`).
///
/// Rejects negative values, more than 8 fractional digits, and
/// anything that is not a plain decimal number.
pub fn display_to_nqt(display: &str) -> ClientResult<String> {
    let display = display.trim();
    if display.is_empty() || display.starts_with('-') || display.starts_with('+') {
        return Err(ClientError::InvalidAmount(display.to_string()));
    }

    let (int_part, frac_part) = match display.split_once('.') {
        Some((i, f)) => (i, f),
        None => (display, ""),
    };
    if int_part.is_empty() && frac_part.is_empty() {
        return Err(ClientError::InvalidAmount(display.to_string()));
    }
    if frac_part.len() > FRACTION_DIGITS {
        return Err(ClientError::InvalidAmount(format!(
            "{display}: more than {FRACTION_DIGITS} fractional digits"
        )));
    }
    if !int_part.bytes().all(|b| b.is_ascii_digit())
        || !frac_part.bytes().all(|b| b.is_ascii_digit())
    {
        return Err(ClientError::InvalidAmount(display.to_string()));
    }

    let int_value: u128 = if int_part.is_empty() {
        0
    } else {
        int_part
            .parse()
            .map_err(|_| ClientError::InvalidAmount(display.to_string()))?
    };

    let mut frac_padded = frac_part.to_string();
    while frac_padded.len() < FRACTION_DIGITS {
        frac_padded.push('0');
    }
    let frac_value: u128 = frac_padded
        .parse()
        .map_err(|_| ClientError::InvalidAmount(display.to_string()))?;

    let nqt = int_value
        .checked_mul(NQT_PER_UNIT)
        .and_then(|v| v.checked_add(frac_value))
        .ok_or_else(|| ClientError::InvalidAmount(format!("{display}: overflow")))?;

    Ok(nqt.to_string())
}

/// Convert an NQT amount string (`"123450000"`) to a display-unit
/// decimal string (`"1.2345"`), trimming trailing fractional zeros.
pub fn nqt_to_display(nqt: &str) -> ClientResult<String> {
    let nqt = nqt.trim();
    if nqt.is_empty() || !nqt.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ClientError::InvalidAmount(nqt.to_string()));
    }
    let value: u128 = nqt
        .parse()
        .map_err(|_| ClientError::InvalidAmount(nqt.to_string()))?;

    let int_part = value / NQT_PER_UNIT;
    let frac_part = value % NQT_PER_UNIT;
    if frac_part == 0 {
        return Ok(int_part.to_string());
    }
    let frac = format!("{frac_part:08}");
    let frac = frac.trim_end_matches('0');
    Ok(format!("{int_part}.{frac}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_to_nqt() {
        assert_eq!(display_to_nqt("0.0001").unwrap(), "10000");
        assert_eq!(display_to_nqt("1").unwrap(), "100000000");
        assert_eq!(display_to_nqt("1.2345").unwrap(), "123450000");
        assert_eq!(display_to_nqt("0").unwrap(), "0");
        assert_eq!(display_to_nqt(".5").unwrap(), "50000000");
        assert_eq!(display_to_nqt("21000000").unwrap(), "2100000000000000");
    }

    #[test]
    fn test_display_to_nqt_rejects() {
        assert!(display_to_nqt("").is_err());
        assert!(display_to_nqt("-1").is_err());
        assert!(display_to_nqt("1.123456789").is_err()); // 9 fractional digits
        assert!(display_to_nqt("1,5").is_err());
        assert!(display_to_nqt("1e8").is_err());
        assert!(display_to_nqt(".").is_err());
    }

    #[test]
    fn test_nqt_to_display() {
        assert_eq!(nqt_to_display("10000").unwrap(), "0.0001");
        assert_eq!(nqt_to_display("100000000").unwrap(), "1");
        assert_eq!(nqt_to_display("123450000").unwrap(), "1.2345");
        assert_eq!(nqt_to_display("0").unwrap(), "0");
        assert_eq!(nqt_to_display("1").unwrap(), "0.00000001");
    }

    #[test]
    fn test_round_trip_exactness() {
        for display in ["0.00000001", "12.5", "999999.99999999"] {
            let nqt = display_to_nqt(display).unwrap();
            assert_eq!(nqt_to_display(&nqt).unwrap(), display);
        }
    }

    #[test]
    fn test_nqt_to_display_rejects() {
        assert!(nqt_to_display("").is_err());
        assert!(nqt_to_display("-10").is_err());
        assert!(nqt_to_display("1.5").is_err());
    }
}
