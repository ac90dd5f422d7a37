//! Native currency amounts
//!
//! Mint charges are stored as decimal text (e.g. `"0.01"`) and committed on-chain in
//! wei (18-decimal fixed point). Conversion is exact or it fails.

use crate::{Error, Result};
use alloy_primitives::U256;

/// Decimals of the native currency
pub const NATIVE_DECIMALS: usize = 18;

/// Convert a decimal amount to base units.
///
/// Accepts `"1"`, `"0.01"`, `".5"`, `"2."`. Fractional digits past 18 are accepted only when
/// they are zeros. Signs, exponents and separators are rejected.
pub fn parse_units(decimal: &str) -> Result<U256> {
    let text = decimal.trim();
    if text.is_empty() {
        return Err(Error::Validation("Amount is empty".to_string()));
    }

    let (whole, fraction) = match text.split_once('.') {
        Some((whole, fraction)) => (whole, fraction),
        None => (text, ""),
    };

    if whole.is_empty() && fraction.is_empty() {
        return Err(Error::Validation(format!("Invalid amount: {}", decimal)));
    }

    if !whole.chars().all(|c| c.is_ascii_digit()) || !fraction.chars().all(|c| c.is_ascii_digit())
    {
        return Err(Error::Validation(format!("Invalid amount: {}", decimal)));
    }

    let significant = fraction.trim_end_matches('0');
    if significant.len() > NATIVE_DECIMALS {
        return Err(Error::Validation(format!(
            "Amount {} has more than {} decimals",
            decimal, NATIVE_DECIMALS
        )));
    }

    let mut digits = String::with_capacity(whole.len() + NATIVE_DECIMALS);
    digits.push_str(whole);
    digits.push_str(significant);
    for _ in significant.len()..NATIVE_DECIMALS {
        digits.push('0');
    }

    let digits = digits.trim_start_matches('0');
    if digits.is_empty() {
        return Ok(U256::ZERO);
    }

    U256::from_str_radix(digits, 10)
        .map_err(|e| Error::Validation(format!("Amount {} out of range: {}", decimal, e)))
}

/// Render base units as a decimal string without trailing zeros
pub fn format_units(value: U256) -> String {
    let scale = U256::from(10u64).pow(U256::from(NATIVE_DECIMALS));
    let whole = value / scale;
    let fraction = value % scale;

    if fraction.is_zero() {
        return whole.to_string();
    }

    let fraction = format!("{:0>width$}", fraction.to_string(), width = NATIVE_DECIMALS);
    format!("{}.{}", whole, fraction.trim_end_matches('0'))
}

/// Total charge for `count` mints at `unit` base units each
pub fn total_charge(unit: U256, count: u64) -> Result<U256> {
    unit.checked_mul(U256::from(count)).ok_or_else(|| {
        Error::Encoding(format!("Mint charge {} x {} overflows uint256", unit, count))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ether(n: u64) -> U256 {
        U256::from(n) * U256::from(10u64).pow(U256::from(18u64))
    }

    #[test]
    fn test_parse_whole_and_fraction() {
        assert_eq!(parse_units("1").unwrap(), ether(1));
        assert_eq!(parse_units("0.01").unwrap(), U256::from(10_000_000_000_000_000u64));
        assert_eq!(parse_units(".5").unwrap(), U256::from(500_000_000_000_000_000u64));
        assert_eq!(parse_units("2.").unwrap(), ether(2));
        assert_eq!(parse_units("0").unwrap(), U256::ZERO);
        assert_eq!(parse_units("0.000000000000000001").unwrap(), U256::from(1u64));
    }

    #[test]
    fn test_trailing_zeros_past_precision_accepted() {
        assert_eq!(
            parse_units("0.010000000000000000000").unwrap(),
            U256::from(10_000_000_000_000_000u64)
        );
    }

    #[test]
    fn test_precision_loss_rejected() {
        let result = parse_units("0.0000000000000000001");
        assert!(matches!(result, Err(Error::Validation(_))));
    }

    #[test]
    fn test_garbage_rejected() {
        for input in ["", ".", "-1", "1e18", "1,5", "abc", "1.2.3"] {
            assert!(parse_units(input).is_err(), "accepted {:?}", input);
        }
    }

    #[test]
    fn test_format_units() {
        assert_eq!(format_units(ether(3)), "3");
        assert_eq!(format_units(U256::from(30_000_000_000_000_000u64)), "0.03");
        assert_eq!(format_units(U256::from(1u64)), "0.000000000000000001");
        assert_eq!(format_units(parse_units("12.345").unwrap()), "12.345");
    }

    #[test]
    fn test_total_charge() {
        let unit = parse_units("0.01").unwrap();
        assert_eq!(
            total_charge(unit, 3).unwrap(),
            U256::from(30_000_000_000_000_000u64)
        );
        assert!(total_charge(U256::MAX, 2).is_err());
        assert_eq!(total_charge(U256::MAX, 0).unwrap(), U256::ZERO);
    }
}
