//! Exact decimal conversion between raw integer balances and
//! human-readable amounts.
//!
//! All arithmetic is on decimal digit strings of `U256` values. Raw
//! balance strings are never routed through floating point, so the
//! invariant `decimal == raw / 10^decimals` holds exactly.

use alloy::primitives::U256;

use crate::error::{SyncError, SyncResult};

/// Format a raw integer balance with the given precision.
///
/// Trailing fractional zeros are trimmed; whole values render without
/// a decimal point. `format_units_exact(1500000, 6)` is `"1.5"`.
pub fn format_units_exact(raw: U256, decimals: u8) -> String {
    let digits = raw.to_string();
    let d = decimals as usize;
    if d == 0 {
        return digits;
    }

    let (int_part, frac_part) = if digits.len() > d {
        let split = digits.len() - d;
        (digits[..split].to_string(), digits[split..].to_string())
    } else {
        ("0".to_string(), format!("{:0>width$}", digits, width = d))
    };

    let frac_trimmed = frac_part.trim_end_matches('0');
    if frac_trimmed.is_empty() {
        int_part
    } else {
        format!("{}.{}", int_part, frac_trimmed)
    }
}

/// Parse a human-readable amount into raw integer units.
///
/// Rejects amounts with more fractional digits than the asset carries
/// rather than silently truncating.
pub fn parse_units_exact(amount: &str, decimals: u8) -> SyncResult<U256> {
    let amount = amount.trim();
    let (int_str, frac_str) = match amount.split_once('.') {
        Some((i, f)) => (i, f),
        None => (amount, ""),
    };

    if int_str.is_empty() && frac_str.is_empty() {
        return Err(SyncError::InvalidInput(format!("empty amount {:?}", amount)));
    }
    if !int_str.bytes().all(|b| b.is_ascii_digit())
        || !frac_str.bytes().all(|b| b.is_ascii_digit())
    {
        return Err(SyncError::InvalidInput(format!(
            "amount {:?} is not an unsigned decimal",
            amount
        )));
    }
    if frac_str.len() > decimals as usize {
        return Err(SyncError::InvalidInput(format!(
            "amount {:?} has more than {} fractional digits",
            amount, decimals
        )));
    }

    let combined = format!(
        "{}{:0<width$}",
        int_str,
        frac_str,
        width = decimals as usize
    );
    let combined = combined.trim_start_matches('0');
    if combined.is_empty() {
        return Ok(U256::ZERO);
    }
    U256::from_str_radix(combined, 10)
        .map_err(|e| SyncError::InvalidInput(format!("amount {:?} out of range: {}", amount, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_spec_example() {
        assert_eq!(format_units_exact(U256::from(1_500_000u64), 6), "1.5");
    }

    #[test]
    fn test_format_whole_and_zero() {
        assert_eq!(format_units_exact(U256::from(2_000_000u64), 6), "2");
        assert_eq!(format_units_exact(U256::ZERO, 18), "0");
        assert_eq!(format_units_exact(U256::from(5u64), 0), "5");
    }

    #[test]
    fn test_format_sub_unit() {
        assert_eq!(format_units_exact(U256::from(1u64), 18), "0.000000000000000001");
        assert_eq!(format_units_exact(U256::from(10u64), 6), "0.00001");
    }

    #[test]
    fn test_format_max_precision_does_not_overflow() {
        // decimals can be up to 255; 10^255 exceeds U256 but string
        // arithmetic is indifferent to that.
        let s = format_units_exact(U256::from(1u64), 255);
        assert!(s.starts_with("0.000"));
        assert!(s.ends_with('1'));
        assert_eq!(s.len(), 2 + 255);
    }

    #[test]
    fn test_parse_round_trips_format() {
        let raw = U256::from(1_500_000u64);
        let formatted = format_units_exact(raw, 6);
        assert_eq!(parse_units_exact(&formatted, 6).unwrap(), raw);
    }

    #[test]
    fn test_parse_whole_amount() {
        assert_eq!(
            parse_units_exact("1", 18).unwrap(),
            U256::from(10u64).pow(U256::from(18u64))
        );
        assert_eq!(parse_units_exact("0", 6).unwrap(), U256::ZERO);
    }

    #[test]
    fn test_parse_rejects_excess_precision() {
        assert!(parse_units_exact("1.1234567", 6).is_err());
        assert!(parse_units_exact("0.5", 0).is_err());
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_units_exact("", 6).is_err());
        assert!(parse_units_exact("-1", 6).is_err());
        assert!(parse_units_exact("1.2.3", 6).is_err());
        assert!(parse_units_exact("abc", 6).is_err());
    }

    #[test]
    fn test_parse_failures_are_local_input_errors() {
        for bad in ["", "abc", "-1", "1.1234567"] {
            assert!(matches!(
                parse_units_exact(bad, 6).unwrap_err(),
                SyncError::InvalidInput(_)
            ));
        }
    }
}
