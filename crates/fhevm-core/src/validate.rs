//! Bit-width validation for plaintext values
//!
//! Every check here is synchronous and pure. A value that fails never
//! reaches an engine.

use alloy_primitives::{Address, U256};

use crate::{EncryptedType, ValidationError};

/// Largest value representable in `bits` bits (`2^bits - 1`)
pub fn max_for_bits(bits: u32) -> U256 {
    if bits >= 256 {
        U256::MAX
    } else {
        (U256::from(1u8) << bits as usize) - U256::from(1u8)
    }
}

fn uint_bits(kind: EncryptedType) -> Result<u32, ValidationError> {
    kind.uint_bits()
        .ok_or_else(|| ValidationError::Type(format!("{} is not an integer type", kind)))
}

fn range_error(kind: EncryptedType, value: impl ToString) -> ValidationError {
    let max = kind
        .uint_bits()
        .map(|bits| max_for_bits(bits).to_string())
        .unwrap_or_default();
    ValidationError::Range {
        kind,
        value: value.to_string(),
        max,
    }
}

/// Check that `value` fits the bit width of an integer kind
pub fn check_uint(kind: EncryptedType, value: U256) -> Result<U256, ValidationError> {
    let bits = uint_bits(kind)?;
    if value > max_for_bits(bits) {
        return Err(range_error(kind, value));
    }
    Ok(value)
}

/// Check a JSON-style number: must be whole, non-negative and in range
pub fn check_number(kind: EncryptedType, value: f64) -> Result<U256, ValidationError> {
    uint_bits(kind)?;
    if !value.is_finite() || value.fract() != 0.0 || value < 0.0 {
        return Err(range_error(kind, value));
    }
    // f64 holds integers exactly only up to 2^53; anything past u128 is
    // out of range for every kind that could be given as a float
    if value >= u128::MAX as f64 {
        return Err(range_error(kind, value));
    }
    check_uint(kind, U256::from(value as u128))
}

/// Parse an integer given as text (decimal or `0x` hex)
///
/// Negative numbers and fractions are range errors, not format errors:
/// they are numbers, just not ones the kind can hold.
pub fn parse_uint(kind: EncryptedType, text: &str) -> Result<U256, ValidationError> {
    uint_bits(kind)?;
    let text = text.trim();

    if let Some(hex) = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        if hex.is_empty() || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ValidationError::Format(format!("Invalid hex integer: {}", text)));
        }
        let value = U256::from_str_radix(hex, 16).map_err(|_| range_error(kind, text))?;
        return check_uint(kind, value);
    }

    let unsigned = text.strip_prefix('-');
    let digits = unsigned.unwrap_or(text);
    let (whole, fraction) = match digits.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (digits, None),
    };

    let is_digits = |s: &str| !s.is_empty() && s.chars().all(|c| c.is_ascii_digit());
    if !is_digits(whole) || fraction.is_some_and(|f| !is_digits(f)) {
        return Err(ValidationError::Format(format!("Not a number: {}", text)));
    }

    let has_fraction = fraction.is_some_and(|f| f.chars().any(|c| c != '0'));
    let value = U256::from_str_radix(whole, 10).map_err(|_| range_error(kind, text))?;
    if has_fraction || (unsigned.is_some() && !value.is_zero()) {
        return Err(range_error(kind, text));
    }

    check_uint(kind, value)
}

/// Parse a 20-byte address written as `0x` followed by exactly 40 hex characters
pub fn parse_address(text: &str) -> Result<Address, ValidationError> {
    let invalid = || ValidationError::Format(format!("Invalid address: {}", text));

    let hex_part = text.strip_prefix("0x").ok_or_else(invalid)?;
    if hex_part.len() != 40 {
        return Err(invalid());
    }
    let bytes: [u8; 20] = hex::decode(hex_part)
        .map_err(|_| invalid())?
        .try_into()
        .map_err(|_| invalid())?;
    Ok(Address::from(bytes))
}

/// Parse raw bytes given as `0x`-prefixed hex
pub fn parse_bytes(text: &str) -> Result<Vec<u8>, ValidationError> {
    let hex_part = text
        .strip_prefix("0x")
        .ok_or_else(|| ValidationError::Type(format!("Bytes must be 0x-prefixed hex: {}", text)))?;
    hex::decode(hex_part).map_err(|e| ValidationError::Type(format!("Bytes must be hex: {}", e)))
}
