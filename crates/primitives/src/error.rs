use alloy_primitives::Address;

#[derive(Debug, thiserror::Error)]
pub enum PrimitiveError {
    #[error("Invalid address '{0}'")]
    InvalidAddress(String),

    #[error("Address '{0}' has an invalid checksum")]
    InvalidChecksum(String),

    #[error("Invalid signature length: expected 65 bytes, got {0}")]
    InvalidSignatureLength(usize),

    #[error("Unsupported signature type byte {0}")]
    UnsupportedSignatureType(u8),

    #[error("Signature of kind {0:?} can not be recovered locally")]
    NotRecoverable(crate::SignatureKind),

    #[error("Signature recovery failed")]
    RecoveryFailed,

    #[error("Signature has a malleable (high) s value")]
    HighS,

    #[error("Recovered signer {recovered} does not match expected signer {expected}")]
    SignerMismatch { expected: Address, recovered: Address },
}
