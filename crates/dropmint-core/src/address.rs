//! Account address parsing
//!
//! Wallets and gating collections are 20-byte accounts. Text input is accepted only as
//! `0x` + 40 hex digits; mixed-case input must carry a valid EIP-55 checksum.

use crate::{Error, Result};
use alloy_primitives::Address;

/// Sentinel for "no gating collection"
pub const ZERO_ADDRESS: Address = Address::ZERO;

/// Parse and validate an account address
pub fn parse_address(input: &str) -> Result<Address> {
    let trimmed = input.trim();
    let digits = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .ok_or_else(|| Error::Validation(format!("Address must start with 0x: {}", input)))?;

    if digits.len() != 40 {
        return Err(Error::Validation(format!(
            "Address must have 40 hex digits, got {}",
            digits.len()
        )));
    }

    if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(Error::Validation(format!("Address is not hex: {}", input)));
    }

    let has_lower = digits.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = digits.chars().any(|c| c.is_ascii_uppercase());

    if has_lower && has_upper {
        let with_prefix = format!("0x{}", digits);
        return Address::parse_checksummed(&with_prefix, None)
            .map_err(|_| Error::Validation(format!("Bad address checksum: {}", input)));
    }

    let mut bytes = [0u8; 20];
    hex::decode_to_slice(digits, &mut bytes)
        .map_err(|e| Error::Validation(format!("Invalid address {}: {}", input, e)))?;

    Ok(Address::from(bytes))
}

/// Whether the address is the zero-address sentinel
pub fn is_zero_address(address: &Address) -> bool {
    *address == ZERO_ADDRESS
}
