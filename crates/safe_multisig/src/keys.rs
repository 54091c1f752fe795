use std::path::Path;

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};

use crate::Error;

/// How an owner key signs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum KeyType {
    DeviceGenerated,
    DeviceImported,
    Ledger { device_id: String, derivation_path: String },
    WalletConnect { session_topic: String },
}

impl KeyType {
    pub fn is_wallet_connect(&self) -> bool {
        matches!(self, KeyType::WalletConnect { .. })
    }
}

/// An owner key known to this device. Never carries secret material.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyInfo {
    pub name: String,
    pub address: Address,
    pub key_type: KeyType,
}

/// Read-only view of the owner keys held by the user.
#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
pub trait KeyRegistry: Send + Sync {
    fn keys_for_addresses(&self, addresses: &[Address]) -> Vec<KeyInfo>;

    fn all_keys(&self) -> Vec<KeyInfo>;
}

/// A [KeyRegistry] over a fixed list of keys.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StaticKeyRegistry {
    keys: Vec<KeyInfo>,
}

impl StaticKeyRegistry {
    pub fn new(keys: Vec<KeyInfo>) -> Self {
        Self { keys }
    }

    pub fn from_json(json: &str) -> Result<Self, Error> {
        serde_json::from_str(json)
            .map_err(|err| Error::InvalidInput(format!("Invalid key registry: {err}")))
    }

    /// Loads a registry file, a missing file is an empty registry.
    pub fn load(path: &Path) -> Result<Self, Error> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let json = std::fs::read_to_string(path).map_err(|err| {
            Error::InvalidInput(format!("Failed to read {}: {err}", path.display()))
        })?;
        Self::from_json(&json)
    }
}

impl KeyRegistry for StaticKeyRegistry {
    fn keys_for_addresses(&self, addresses: &[Address]) -> Vec<KeyInfo> {
        self.keys.iter().filter(|key| addresses.contains(&key.address)).cloned().collect()
    }

    fn all_keys(&self) -> Vec<KeyInfo> {
        self.keys.clone()
    }
}
