//! Address parsing and the zero-address sentinel.

use std::str::FromStr;

use alloy_primitives::Address;

use crate::PrimitiveError;

/// Extension methods for [Address].
pub trait AddressExt {
    /// Whether this is the zero address, used throughout as "absent/unset".
    fn is_unset(&self) -> bool;

    /// Lowercase hex without the `0x` prefix, as used in reverse ENS names.
    fn to_plain_hex(&self) -> String;
}

impl AddressExt for Address {
    fn is_unset(&self) -> bool {
        *self == Address::ZERO
    }

    fn to_plain_hex(&self) -> String {
        hex::encode(self.as_slice())
    }
}

/// Parses an address string.
///
/// Single-case input (all lowercase or all uppercase hex digits) is accepted as is. Mixed-case
/// input must carry a valid EIP-55 checksum.
pub fn parse_address(value: &str) -> Result<Address, PrimitiveError> {
    let trimmed = value.trim();
    let digits = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);

    if digits.len() != 40 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(PrimitiveError::InvalidAddress(value.to_string()));
    }

    let has_lower = digits.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = digits.chars().any(|c| c.is_ascii_uppercase());

    if has_lower && has_upper {
        let prefixed = format!("0x{digits}");
        Address::parse_checksummed(&prefixed, None)
            .map_err(|_| PrimitiveError::InvalidChecksum(value.to_string()))
    } else {
        Address::from_str(digits).map_err(|_| PrimitiveError::InvalidAddress(value.to_string()))
    }
}
