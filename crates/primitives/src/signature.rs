pub use alloy_primitives::PrimitiveSignature as EcdsaSignature;
use alloy_primitives::{Address, B256, U256};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use crate::{eth_sign_digest, PrimitiveError};

/// The order of the secp256k1 curve, divided by two. Signatures that should be checked according
/// to EIP-2 should have an S value less than or equal to this.
///
/// `57896044618658097711785492504343953926418782139537452191302581570759080747168`
const SECP256K1N_HALF: U256 = U256::from_be_bytes([
    0x7F, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF,
    0x5D, 0x57, 0x6E, 0x73, 0x57, 0xA4, 0x50, 0x1D, 0xDF, 0xE9, 0x2F, 0x46, 0x68, 0x1B, 0x20, 0xA0,
]);

/// Offset added to `v` by the Safe contracts to mark a signature over the `eth_sign` digest.
pub const ETH_SIGN_V_OFFSET: u8 = 4;

/// Length of an encoded `r || s || v` signature.
pub const SIGNATURE_LENGTH: usize = 65;

/// How the Safe contracts interpret a signature, derived from its type byte `v`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignatureKind {
    /// `v == 0`: EIP-1271 contract signature.
    Contract,
    /// `v == 1`: hash approved on-chain by the owner.
    ApprovedHash,
    /// `v ∈ {27, 28}`: ECDSA over the safe transaction hash.
    Ecdsa,
    /// `v ∈ {31, 32}`: ECDSA over the `eth_sign` digest of the safe transaction hash.
    EthSign,
}

/// A signature attached to a Safe transaction.
///
/// For [SignatureKind::Ecdsa] and [SignatureKind::EthSign] `v` holds the canonical ECDSA recovery
/// byte (27 or 28); the `eth_sign` offset is only applied when encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SafeSignature {
    pub r: B256,
    pub s: B256,
    pub v: u8,
    pub kind: SignatureKind,
}

impl SafeSignature {
    /// Decodes a 65 byte `r || s || v` signature in the Safe contract encoding.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PrimitiveError> {
        if bytes.len() != SIGNATURE_LENGTH {
            return Err(PrimitiveError::InvalidSignatureLength(bytes.len()));
        }

        let r = B256::from_slice(&bytes[0..32]);
        let s = B256::from_slice(&bytes[32..64]);
        let (v, kind) = match bytes[64] {
            0 => (0, SignatureKind::Contract),
            1 => (1, SignatureKind::ApprovedHash),
            v @ (27 | 28) => (v, SignatureKind::Ecdsa),
            v @ (31 | 32) => (v - ETH_SIGN_V_OFFSET, SignatureKind::EthSign),
            other => return Err(PrimitiveError::UnsupportedSignatureType(other)),
        };

        Ok(Self { r, s, v, kind })
    }

    /// Builds an ECDSA signature over the safe transaction hash.
    ///
    /// Accepts recovery bytes in either the `{0, 1}` or the `{27, 28}` convention.
    pub fn ecdsa(r: B256, s: B256, v: u8) -> Result<Self, PrimitiveError> {
        let v = normalize_recovery_byte(v)?;
        Ok(Self { r, s, v, kind: SignatureKind::Ecdsa })
    }

    /// Builds a signature over the `eth_sign` digest from its canonical ECDSA parts.
    pub fn eth_sign(r: B256, s: B256, v: u8) -> Result<Self, PrimitiveError> {
        let v = normalize_recovery_byte(v)?;
        Ok(Self { r, s, v, kind: SignatureKind::EthSign })
    }

    /// Encodes the signature as the Safe contracts expect it.
    pub fn to_bytes(&self) -> [u8; SIGNATURE_LENGTH] {
        let mut bytes = [0u8; SIGNATURE_LENGTH];
        bytes[0..32].copy_from_slice(self.r.as_slice());
        bytes[32..64].copy_from_slice(self.s.as_slice());
        bytes[64] = match self.kind {
            SignatureKind::EthSign => self.v + ETH_SIGN_V_OFFSET,
            _ => self.v,
        };
        bytes
    }

    /// 0x-prefixed hex of [Self::to_bytes].
    pub fn to_hex(&self) -> String {
        crate::utils::hex_encode(self.to_bytes())
    }

    /// Whether the signature is an ECDSA signature that can be recovered off-chain.
    ///
    /// Mirrors the contract rule that treats any type byte above 26 as ECDSA.
    pub fn is_ecdsa(&self) -> bool {
        self.to_bytes()[64] > 26
    }

    /// The message the ECDSA signature was produced over for a given safe transaction hash.
    pub fn signed_digest(&self, safe_tx_hash: B256) -> Result<B256, PrimitiveError> {
        match self.kind {
            SignatureKind::Ecdsa => Ok(safe_tx_hash),
            SignatureKind::EthSign => Ok(eth_sign_digest(safe_tx_hash)),
            kind => Err(PrimitiveError::NotRecoverable(kind)),
        }
    }

    /// The canonical ECDSA form of this signature.
    pub fn to_ecdsa(&self) -> Result<EcdsaSignature, PrimitiveError> {
        match self.kind {
            SignatureKind::Ecdsa | SignatureKind::EthSign => Ok(EcdsaSignature::new(
                U256::from_be_bytes(self.r.0),
                U256::from_be_bytes(self.s.0),
                self.v == 28,
            )),
            kind => Err(PrimitiveError::NotRecoverable(kind)),
        }
    }

    /// Recovers the owner that produced this signature for `safe_tx_hash`, enforcing EIP-2.
    pub fn recover(&self, safe_tx_hash: B256) -> Result<Address, PrimitiveError> {
        let digest = self.signed_digest(safe_tx_hash)?;
        recover_signer(&self.to_ecdsa()?, digest)
    }

    /// Recovers the signer and requires it to be `expected`.
    pub fn verify(&self, safe_tx_hash: B256, expected: Address) -> Result<(), PrimitiveError> {
        let recovered = self.recover(safe_tx_hash)?;
        if recovered != expected {
            return Err(PrimitiveError::SignerMismatch { expected, recovered });
        }

        Ok(())
    }
}

fn normalize_recovery_byte(v: u8) -> Result<u8, PrimitiveError> {
    match v {
        0 | 1 => Ok(v + 27),
        27 | 28 => Ok(v),
        other => Err(PrimitiveError::UnsupportedSignatureType(other)),
    }
}

impl Serialize for SafeSignature {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for SafeSignature {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        let bytes = crate::utils::hex_decode(&s).map_err(de::Error::custom)?;
        Self::from_bytes(&bytes).map_err(de::Error::custom)
    }
}

/// Recover signer from message hash, _without ensuring that the signature has a low `s`
/// value_.
///
/// Using this for signature validation will succeed, even if the signature is malleable or not
/// compliant with EIP-2. This is provided for compatibility with old signatures which have
/// large `s` values.
pub fn recover_signer_unchecked(
    signature: &EcdsaSignature,
    hash: B256,
) -> Result<Address, PrimitiveError> {
    signature.recover_address_from_prehash(&hash).map_err(|_| PrimitiveError::RecoveryFailed)
}

/// Recover signer address from message hash. This ensures that the signature S value is
/// not greater than `secp256k1n / 2`, as specified in
/// [EIP-2](https://eips.ethereum.org/EIPS/eip-2).
pub fn recover_signer(signature: &EcdsaSignature, hash: B256) -> Result<Address, PrimitiveError> {
    if signature.s() > SECP256K1N_HALF {
        return Err(PrimitiveError::HighS);
    }

    recover_signer_unchecked(signature, hash)
}
