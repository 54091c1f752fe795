use alloy_primitives::{eip191_hash_message, keccak256, B256};

/// Hashes `bytes` with keccak-256, the native hash of the target chain.
pub fn hash<T: AsRef<[u8]>>(bytes: T) -> B256 {
    keccak256(bytes)
}

/// Digest signed by devices that only support `eth_sign`:
/// `keccak256("\x19Ethereum Signed Message:\n32" ++ hash)`.
pub fn eth_sign_digest(hash: B256) -> B256 {
    eip191_hash_message(hash)
}

#[cfg(test)]
mod test {
    use super::*;
    use alloy_primitives::{b256, hex};

    #[test]
    fn empty_input() {
        assert_eq!(
            hash(b""),
            b256!("c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470")
        );
    }

    #[test]
    fn known_preimage() {
        assert_eq!(
            hash("gnosis-safe"),
            b256!("162be7f136f104c8cc5ce333cdb2ef94fa8270f4ca186ba6083634b8b93efa82")
        );
    }

    #[test]
    fn eth_sign_prefix() {
        let message = b256!("cf52e1c42dc9860829c6aeddf4e0ed3f92101e78bed888d62afa4f0ffb410bd6");

        let mut preimage = b"\x19Ethereum Signed Message:\n32".to_vec();
        preimage.extend_from_slice(&hex::decode(
            "cf52e1c42dc9860829c6aeddf4e0ed3f92101e78bed888d62afa4f0ffb410bd6",
        )
        .unwrap());

        assert_eq!(eth_sign_digest(message), hash(preimage));
    }
}
