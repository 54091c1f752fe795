use std::collections::HashMap;

use alloy_primitives::{Address, B256};
use alloy_signer::SignerSync;
use alloy_signer_local::PrivateKeySigner;
use safe_primitives::SafeSignature;

use super::SignerError;

/// Hands out private keys for local signing. A key lives only as long as one signing call.
#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
pub trait SecureKeyStore: Send + Sync {
    fn signer_for(&self, address: Address) -> Result<PrivateKeySigner, SignerError>;
}

/// A [SecureKeyStore] over keys held in memory, e.g. imported from the environment.
#[derive(Debug, Clone, Default)]
pub struct MemoryKeyStore {
    signers: HashMap<Address, PrivateKeySigner>,
}

impl MemoryKeyStore {
    pub fn insert(&mut self, signer: PrivateKeySigner) -> Address {
        let address = signer.address();
        self.signers.insert(address, signer);
        address
    }
}

impl SecureKeyStore for MemoryKeyStore {
    fn signer_for(&self, address: Address) -> Result<PrivateKeySigner, SignerError> {
        self.signers
            .get(&address)
            .cloned()
            .ok_or_else(|| SignerError::KeyStore(format!("No private key for {address}")))
    }
}

/// Signs with a key materialized from the store for this call only.
pub struct LocalSigner<'a> {
    address: Address,
    store: &'a dyn SecureKeyStore,
}

impl<'a> LocalSigner<'a> {
    pub fn new(address: Address, store: &'a dyn SecureKeyStore) -> Self {
        Self { address, store }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn sign(&self, hash: B256) -> Result<SafeSignature, SignerError> {
        let signer = self.store.signer_for(self.address)?;
        if signer.address() != self.address {
            return Err(SignerError::KeyStore(format!(
                "Key store returned {} for {}",
                signer.address(),
                self.address
            )));
        }

        let signature = signer.sign_hash_sync(&hash)?;
        Ok(SafeSignature::from_bytes(&signature.as_bytes())?)
    }
}
