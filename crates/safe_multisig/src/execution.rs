//! Execution eligibility.

use crate::{
    details::{SafeInfo, TransactionDetails},
    keys::{KeyInfo, KeyRegistry},
};

/// Keys allowed to execute: every owner key, plus every WalletConnect key whether or not it owns
/// the Safe.
pub fn execution_keys(safe: &SafeInfo, keys: &(impl KeyRegistry + ?Sized)) -> Vec<KeyInfo> {
    let mut execution_keys = keys.keys_for_addresses(&safe.owners);

    for key in keys.all_keys() {
        if key.key_type.is_wallet_connect() && !execution_keys.contains(&key) {
            execution_keys.push(key);
        }
    }

    execution_keys
}

/// Whether the transaction is next in line and has enough ECDSA confirmations.
pub fn is_executable(details: &TransactionDetails, safe: &SafeInfo) -> bool {
    let Some(info) = details.multisig_info() else {
        return false;
    };

    safe.nonce == info.nonce
        && info.ecdsa_confirmations().count() as u64 >= info.confirmations_required
}

pub fn can_execute(
    details: &TransactionDetails,
    safe: &SafeInfo,
    keys: &(impl KeyRegistry + ?Sized),
) -> bool {
    is_executable(details, safe) && !execution_keys(safe, keys).is_empty()
}
