//! Owner key signers.
//!
//! Every key type maps to one [OwnerSigner] variant through [OwnerSigner::for_key]. The rest of the
//! crate only deals with the resulting [SignOutcome].

use alloy_primitives::Address;
use safe_primitives::{PrimitiveError, SafeSignature};
use tracing::{debug, info};

use crate::{
    hasher,
    keys::{KeyInfo, KeyType},
    transaction_data::{SafeTxHash, Transaction},
    Error,
};

pub mod ledger;
pub mod local;
pub mod wallet_connect;

pub use ledger::{normalize_device_signature, DeviceResponse, HardwareTransport, LedgerSigner};
pub use local::{LocalSigner, MemoryKeyStore, SecureKeyStore};
pub use wallet_connect::{
    ExecutionEvents, ExecutionHandle, ExecutionRequest, WalletConnectSigner, WalletSession,
};

#[derive(Debug, thiserror::Error)]
pub enum SignerError {
    #[error("Key store error: {0}")]
    KeyStore(String),

    #[error("{0}")]
    Device(String),

    #[error("Wallet session error: {0}")]
    Session(String),

    #[error("No {0} backend is available")]
    BackendUnavailable(&'static str),

    #[error(transparent)]
    Local(#[from] alloy_signer::Error),

    #[error(transparent)]
    Signature(#[from] PrimitiveError),
}

/// The signing backends available to the caller.
#[derive(Clone, Copy, Default)]
pub struct Backends<'a> {
    pub key_store: Option<&'a dyn SecureKeyStore>,
    pub hardware: Option<&'a dyn HardwareTransport>,
    pub session: Option<&'a dyn WalletSession>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignOutcome {
    Signed(SafeSignature),
    /// The user declined in the remote wallet.
    Declined,
}

pub enum OwnerSigner<'a> {
    Local(LocalSigner<'a>),
    Ledger(LedgerSigner<'a>),
    WalletConnect(WalletConnectSigner<'a>),
}

impl<'a> OwnerSigner<'a> {
    pub fn for_key(key: &KeyInfo, backends: &Backends<'a>) -> Result<Self, SignerError> {
        let signer = match &key.key_type {
            KeyType::DeviceGenerated | KeyType::DeviceImported => {
                let store = backends.key_store.ok_or(SignerError::BackendUnavailable("key store"))?;
                OwnerSigner::Local(LocalSigner::new(key.address, store))
            }
            KeyType::Ledger { device_id, derivation_path } => {
                let transport =
                    backends.hardware.ok_or(SignerError::BackendUnavailable("hardware"))?;
                OwnerSigner::Ledger(LedgerSigner::new(
                    device_id.as_str(),
                    derivation_path.as_str(),
                    transport,
                ))
            }
            KeyType::WalletConnect { session_topic } => {
                let session =
                    backends.session.ok_or(SignerError::BackendUnavailable("wallet session"))?;
                OwnerSigner::WalletConnect(WalletConnectSigner::new(session_topic.as_str(), session))
            }
        };

        Ok(signer)
    }

    pub async fn sign(
        &self,
        tx: &Transaction,
        hash: SafeTxHash,
    ) -> Result<SignOutcome, SignerError> {
        match self {
            OwnerSigner::Local(signer) => signer.sign(hash).map(SignOutcome::Signed),
            OwnerSigner::Ledger(signer) => signer.sign(hash).await.map(SignOutcome::Signed),
            OwnerSigner::WalletConnect(signer) => {
                match signer.sign(hasher::eip712_typed_data(tx)).await? {
                    Some(signature) => Ok(SignOutcome::Signed(signature)),
                    None => {
                        info!(safe_tx_hash = %hash, "signature declined in wallet");
                        Ok(SignOutcome::Declined)
                    }
                }
            }
        }
    }
}

/// Recovers the signer of `signature` and requires it to be `expected`.
pub fn verify_signature(
    hash: SafeTxHash,
    signature: &SafeSignature,
    expected: Address,
) -> Result<(), Error> {
    signature.verify(hash, expected)?;
    debug!(safe_tx_hash = %hash, signer = %expected, "signature verified");
    Ok(())
}
