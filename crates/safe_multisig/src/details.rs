//! Transaction payloads of the Safe client gateway.

use alloy_primitives::{Address, Bytes, B256, U256};
use safe_primitives::{PrimitiveError, SafeSignature};
use serde::{Deserialize, Serialize};

use crate::{serialization, transaction_data::OperationType, version::SafeVersion, Error};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TxStatus {
    AwaitingConfirmations,
    AwaitingYourConfirmation,
    AwaitingExecution,
    Pending,
    WillBeReplaced,
    Success,
    Failed,
    Cancelled,
    /// A status this client does not know. Nothing can be done with such a transaction.
    #[serde(other)]
    Unknown,
}

impl TxStatus {
    pub fn is_awaiting_confirmations(&self) -> bool {
        matches!(self, TxStatus::AwaitingConfirmations | TxStatus::AwaitingYourConfirmation)
    }

    /// Outcome of an execution on chain.
    pub fn is_terminal(&self) -> bool {
        matches!(self, TxStatus::Success | TxStatus::Failed | TxStatus::Cancelled)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum TxInfo {
    #[serde(rename_all = "camelCase")]
    Custom {
        #[serde(default, with = "serialization::option_address_info")]
        to: Option<Address>,
        #[serde(default)]
        is_cancellation: bool,
    },
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TxData {
    #[serde(default)]
    pub hex_data: Option<Bytes>,
    #[serde(with = "serialization::address_info")]
    pub to: Address,
    #[serde(default, with = "serialization::decimal_u256")]
    pub value: U256,
    pub operation: OperationType,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Confirmation {
    #[serde(with = "serialization::address_info")]
    pub signer: Address,
    pub signature: Bytes,
    #[serde(default)]
    pub submitted_at: Option<u64>,
}

impl Confirmation {
    /// Whether the signature is an ECDSA signature, which the contracts recognise by a type byte
    /// above 26.
    pub fn is_ecdsa(&self) -> bool {
        self.signature.last().is_some_and(|v| *v > 26)
    }

    pub fn safe_signature(&self) -> Result<SafeSignature, PrimitiveError> {
        SafeSignature::from_bytes(&self.signature)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MultisigExecutionInfo {
    #[serde(default)]
    pub submitted_at: Option<u64>,
    #[serde(with = "serialization::decimal_u256")]
    pub nonce: U256,
    #[serde(default, with = "serialization::decimal_u256")]
    pub safe_tx_gas: U256,
    #[serde(default, with = "serialization::decimal_u256")]
    pub base_gas: U256,
    #[serde(default, with = "serialization::decimal_u256")]
    pub gas_price: U256,
    #[serde(default)]
    pub gas_token: Address,
    #[serde(default, with = "serialization::address_info")]
    pub refund_receiver: Address,
    pub safe_tx_hash: B256,
    #[serde(default, with = "serialization::option_address_info")]
    pub executor: Option<Address>,
    #[serde(with = "serialization::address_info_list")]
    pub signers: Vec<Address>,
    pub confirmations_required: u64,
    #[serde(default, with = "serialization::unique_confirmations")]
    pub confirmations: Vec<Confirmation>,
    #[serde(default, with = "serialization::address_info_list")]
    pub rejectors: Vec<Address>,
}

impl MultisigExecutionInfo {
    pub fn needs_more_signatures(&self) -> bool {
        (self.confirmations.len() as u64) < self.confirmations_required
    }

    pub fn has_confirmed(&self, address: Address) -> bool {
        self.confirmations.iter().any(|confirmation| confirmation.signer == address)
    }

    pub fn has_rejected(&self, address: Address) -> bool {
        self.rejectors.contains(&address)
    }

    /// Whether a rejection of this transaction has collected signatures.
    pub fn is_rejected(&self) -> bool {
        !self.rejectors.is_empty()
    }

    pub fn ecdsa_confirmations(&self) -> impl Iterator<Item = &Confirmation> {
        self.confirmations.iter().filter(|confirmation| confirmation.is_ecdsa())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleExecutionInfo {
    #[serde(with = "serialization::address_info")]
    pub address: Address,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DetailedExecutionInfo {
    Multisig(MultisigExecutionInfo),
    Module(ModuleExecutionInfo),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionDetails {
    pub safe_address: Address,
    pub tx_id: String,
    #[serde(default)]
    pub executed_at: Option<u64>,
    pub tx_status: TxStatus,
    pub tx_info: TxInfo,
    #[serde(default)]
    pub tx_data: Option<TxData>,
    #[serde(default)]
    pub detailed_execution_info: Option<DetailedExecutionInfo>,
    #[serde(default)]
    pub tx_hash: Option<B256>,
}

impl TransactionDetails {
    /// Whether the gateway marks this transaction as a rejection of another one.
    pub fn is_rejection(&self) -> bool {
        matches!(self.tx_info, TxInfo::Custom { is_cancellation: true, .. })
    }

    pub fn multisig_info(&self) -> Option<&MultisigExecutionInfo> {
        match &self.detailed_execution_info {
            Some(DetailedExecutionInfo::Multisig(info)) => Some(info),
            _ => None,
        }
    }

    pub fn ecdsa_confirmations(&self) -> Vec<&Confirmation> {
        self.multisig_info().map(|info| info.ecdsa_confirmations().collect()).unwrap_or_default()
    }
}

/// State of a Safe, from the gateway or read on chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SafeInfo {
    #[serde(with = "serialization::address_info")]
    pub address: Address,
    #[serde(with = "serialization::decimal_u64")]
    pub chain_id: u64,
    #[serde(with = "serialization::decimal_u256")]
    pub nonce: U256,
    pub threshold: u64,
    #[serde(with = "serialization::address_info_list")]
    pub owners: Vec<Address>,
    #[serde(default)]
    pub version: Option<String>,
}

impl SafeInfo {
    pub fn is_owner(&self, address: Address) -> bool {
        self.owners.contains(&address)
    }

    pub fn safe_version(&self) -> Result<SafeVersion, Error> {
        let version = self.version.as_deref().ok_or_else(|| {
            Error::Unsupported(format!("Safe {} runs an unknown master copy", self.address))
        })?;
        SafeVersion::parse(version)
    }
}
