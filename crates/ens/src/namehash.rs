use alloy_primitives::B256;
use safe_primitives::hash;

/// Computes the ENS node of an already normalized name.
///
/// `namehash("") = 0x00..00` and `namehash(label.rest) = keccak(namehash(rest) ++ keccak(label))`.
pub fn namehash(name: &str) -> B256 {
    if name.is_empty() {
        return B256::ZERO;
    }

    let (label, remainder) = name.split_once('.').unwrap_or((name, ""));

    let mut preimage = [0u8; 64];
    preimage[..32].copy_from_slice(namehash(remainder).as_slice());
    preimage[32..].copy_from_slice(hash(label).as_slice());

    hash(preimage)
}
