use alloy_primitives::{Address, Bytes, B256, U256};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{details::TransactionDetails, hasher, version::SafeVersion, Error};

/// The safe transaction hash every owner signs.
pub type SafeTxHash = B256;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
#[repr(u8)]
pub enum OperationType {
    #[default]
    Call = 0,
    DelegateCall = 1,
}

impl TryFrom<u8> for OperationType {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(OperationType::Call),
            1 => Ok(OperationType::DelegateCall),
            other => Err(Error::InvalidInput(format!("Unknown operation {other}"))),
        }
    }
}

impl From<OperationType> for u8 {
    fn from(operation: OperationType) -> Self {
        operation as u8
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SafeTransactionData {
    pub to: Address,
    pub value: U256,
    pub data: Bytes,
    pub operation: OperationType,
    pub safe_tx_gas: U256,
    pub base_gas: U256,
    pub gas_price: U256,
    pub gas_token: Address,
    pub refund_receiver: Address,
    pub nonce: U256,
}

/// A pending Safe transaction together with everything its hash depends on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    pub safe: Address,
    pub chain_id: u64,
    pub safe_version: SafeVersion,
    pub safe_tx: SafeTransactionData,
}

impl Transaction {
    pub fn new(
        safe: Address,
        chain_id: u64,
        safe_version: SafeVersion,
        safe_tx: SafeTransactionData,
    ) -> Self {
        Self { safe, chain_id, safe_version, safe_tx }
    }

    /// Assembles the transaction from client gateway details.
    pub fn from_details(
        details: &TransactionDetails,
        chain_id: u64,
        safe_version: SafeVersion,
    ) -> Result<Self, Error> {
        let tx_data = details
            .tx_data
            .as_ref()
            .ok_or_else(|| Error::InvalidInput(format!("Transaction {} has no data", details.tx_id)))?;
        let info = details.multisig_info().ok_or_else(|| {
            Error::InvalidInput(format!("Transaction {} is not a multisig transaction", details.tx_id))
        })?;

        let safe_tx = SafeTransactionData {
            to: tx_data.to,
            value: tx_data.value,
            data: tx_data.hex_data.clone().unwrap_or_default(),
            operation: tx_data.operation,
            safe_tx_gas: info.safe_tx_gas,
            base_gas: info.base_gas,
            gas_price: info.gas_price,
            gas_token: info.gas_token,
            refund_receiver: info.refund_receiver,
            nonce: info.nonce,
        };

        Ok(Self::new(details.safe_address, chain_id, safe_version, safe_tx))
    }

    /// The null self-call that invalidates whatever transaction occupies `nonce`.
    pub fn rejection(safe: Address, chain_id: u64, safe_version: SafeVersion, nonce: U256) -> Self {
        let safe_tx = SafeTransactionData { to: safe, nonce, ..Default::default() };
        Self::new(safe, chain_id, safe_version, safe_tx)
    }

    /// Whether the encoded call is the rejection convention: a zero value, empty call to the
    /// Safe itself without any gas refund.
    pub fn is_null_self_call(&self) -> bool {
        let tx = &self.safe_tx;
        tx.to == self.safe
            && tx.value.is_zero()
            && tx.data.is_empty()
            && tx.operation == OperationType::Call
            && tx.safe_tx_gas.is_zero()
            && tx.base_gas.is_zero()
            && tx.gas_price.is_zero()
            && tx.gas_token == Address::ZERO
            && tx.refund_receiver == Address::ZERO
    }

    pub fn safe_tx_hash(&self) -> SafeTxHash {
        hasher::compute_safe_tx_hash(self, &self.safe_version, self.chain_id)
    }
}

/// Calldata for `execTransaction` on a Safe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutableSafeTransaction {
    pub safe_address: Address,
    pub input_data: Bytes,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EIP712Field {
    #[serde(rename = "type")]
    pub field_type: String,
    pub name: String,
}

impl EIP712Field {
    pub fn new(field_type: &str, name: &str) -> Self {
        Self { field_type: field_type.to_string(), name: name.to_string() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EIP712TxTypes {
    #[serde(rename = "EIP712Domain")]
    pub eip712_domain: Vec<EIP712Field>,
    #[serde(rename = "SafeTx")]
    pub safe_tx: Vec<EIP712Field>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EIP712Domain {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chain_id: Option<u64>,
    pub verifying_contract: Address,
}

/// `eth_signTypedData_v4` payload of a safe transaction.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EIP712TypedData {
    pub types: EIP712TxTypes,
    pub primary_type: String,
    pub domain: EIP712Domain,
    pub message: Map<String, Value>,
}

#[cfg(test)]
mod test {
    use super::*;
    use alloy_primitives::address;

    const SAFE: Address = address!("1230B3d59858296A31053C1b8562Ecf89A2f888b");

    #[test]
    fn operation_from_wire() {
        assert_eq!(serde_json::from_str::<OperationType>("1").unwrap(), OperationType::DelegateCall);
        assert_eq!(serde_json::to_string(&OperationType::Call).unwrap(), "0");
        assert!(serde_json::from_str::<OperationType>("2").is_err());
    }

    #[test]
    fn rejection_is_null_self_call() {
        let rejection = Transaction::rejection(SAFE, 1, SafeVersion::V1_3_0, U256::from(5));
        assert!(rejection.is_null_self_call());
        assert_eq!(rejection.safe_tx.nonce, U256::from(5));
    }

    #[test]
    fn any_payload_breaks_the_convention() {
        let rejection = Transaction::rejection(SAFE, 1, SafeVersion::V1_3_0, U256::from(5));

        let mut with_value = rejection.clone();
        with_value.safe_tx.value = U256::from(1);
        assert!(!with_value.is_null_self_call());

        let mut with_data = rejection.clone();
        with_data.safe_tx.data = Bytes::from_static(&[0x00]);
        assert!(!with_data.is_null_self_call());

        let mut elsewhere = rejection.clone();
        elsewhere.safe_tx.to = address!("71590d5D9D6AD1ab6a1f8e6bD3f3E3E9E2a8A1C0");
        assert!(!elsewhere.is_null_self_call());

        let mut delegate = rejection;
        delegate.safe_tx.operation = OperationType::DelegateCall;
        assert!(!delegate.is_null_self_call());
    }
}
