//! EIP-712 hashing of Safe transactions.

use alloy_primitives::{Address, B256, U256};
use alloy_sol_types::{sol, Eip712Domain, SolStruct};
use serde_json::{json, Map, Value};

use crate::{
    transaction_data::{
        EIP712Domain, EIP712Field, EIP712TxTypes, EIP712TypedData, SafeTransactionData, SafeTxHash,
        Transaction,
    },
    version::{HashLayout, SafeVersion},
};

sol! {
    struct SafeTx {
        address to;
        uint256 value;
        bytes data;
        uint8 operation;
        uint256 safeTxGas;
        uint256 baseGas;
        uint256 gasPrice;
        address gasToken;
        address refundReceiver;
        uint256 nonce;
    }
}

mod legacy {
    alloy_sol_types::sol! {
        struct SafeTx {
            address to;
            uint256 value;
            bytes data;
            uint8 operation;
            uint256 safeTxGas;
            uint256 dataGas;
            uint256 gasPrice;
            address gasToken;
            address refundReceiver;
            uint256 nonce;
        }
    }
}

impl From<&SafeTransactionData> for SafeTx {
    fn from(tx: &SafeTransactionData) -> Self {
        SafeTx {
            to: tx.to,
            value: tx.value,
            data: tx.data.clone(),
            operation: tx.operation.into(),
            safeTxGas: tx.safe_tx_gas,
            baseGas: tx.base_gas,
            gasPrice: tx.gas_price,
            gasToken: tx.gas_token,
            refundReceiver: tx.refund_receiver,
            nonce: tx.nonce,
        }
    }
}

impl From<&SafeTransactionData> for legacy::SafeTx {
    fn from(tx: &SafeTransactionData) -> Self {
        legacy::SafeTx {
            to: tx.to,
            value: tx.value,
            data: tx.data.clone(),
            operation: tx.operation.into(),
            safeTxGas: tx.safe_tx_gas,
            dataGas: tx.base_gas,
            gasPrice: tx.gas_price,
            gasToken: tx.gas_token,
            refundReceiver: tx.refund_receiver,
            nonce: tx.nonce,
        }
    }
}

/// The EIP-712 domain of a Safe. Only 1.3.0 and later bind the domain to the chain.
pub fn domain(safe: Address, version: &SafeVersion, chain_id: u64) -> Eip712Domain {
    let chain_id = version.layout().includes_chain_id().then(|| U256::from(chain_id));
    Eip712Domain::new(None, None, chain_id, Some(safe), None)
}

pub fn domain_separator(safe: Address, version: &SafeVersion, chain_id: u64) -> B256 {
    domain(safe, version, chain_id).hash_struct()
}

/// Computes `keccak256(0x19 ‖ 0x01 ‖ domainSeparator ‖ hashStruct(SafeTx))` with the encoding of
/// the given Safe version.
pub fn compute_safe_tx_hash(tx: &Transaction, version: &SafeVersion, chain_id: u64) -> SafeTxHash {
    let domain = domain(tx.safe, version, chain_id);

    match version.layout() {
        HashLayout::Legacy => legacy::SafeTx::from(&tx.safe_tx).eip712_signing_hash(&domain),
        HashLayout::BaseGas | HashLayout::ChainBound => {
            SafeTx::from(&tx.safe_tx).eip712_signing_hash(&domain)
        }
    }
}

pub fn get_eip712_tx_types(layout: HashLayout) -> EIP712TxTypes {
    let eip712_domain = if layout.includes_chain_id() {
        eip712_domain()
    } else {
        eip712_domain_before_v130()
    };

    EIP712TxTypes {
        eip712_domain,
        safe_tx: vec![
            EIP712Field::new("address", "to"),
            EIP712Field::new("uint256", "value"),
            EIP712Field::new("bytes", "data"),
            EIP712Field::new("uint8", "operation"),
            EIP712Field::new("uint256", "safeTxGas"),
            EIP712Field::new("uint256", layout.gas_field()),
            EIP712Field::new("uint256", "gasPrice"),
            EIP712Field::new("address", "gasToken"),
            EIP712Field::new("address", "refundReceiver"),
            EIP712Field::new("uint256", "nonce"),
        ],
    }
}

fn eip712_domain_before_v130() -> Vec<EIP712Field> {
    vec![EIP712Field::new("address", "verifyingContract")]
}

fn eip712_domain() -> Vec<EIP712Field> {
    vec![EIP712Field::new("uint256", "chainId"), EIP712Field::new("address", "verifyingContract")]
}

/// The typed data a remote wallet signs for `tx`, matching [compute_safe_tx_hash].
pub fn eip712_typed_data(tx: &Transaction) -> EIP712TypedData {
    let layout = tx.safe_version.layout();
    let safe_tx = &tx.safe_tx;

    let mut message = Map::new();
    message.insert("to".into(), json!(safe_tx.to.to_checksum(None)));
    message.insert("value".into(), json!(safe_tx.value.to_string()));
    message.insert("data".into(), json!(safe_tx.data.to_string()));
    message.insert("operation".into(), json!(u8::from(safe_tx.operation)));
    message.insert("safeTxGas".into(), json!(safe_tx.safe_tx_gas.to_string()));
    message.insert(layout.gas_field().into(), json!(safe_tx.base_gas.to_string()));
    message.insert("gasPrice".into(), json!(safe_tx.gas_price.to_string()));
    message.insert("gasToken".into(), json!(safe_tx.gas_token.to_checksum(None)));
    message.insert("refundReceiver".into(), json!(safe_tx.refund_receiver.to_checksum(None)));
    message.insert("nonce".into(), Value::String(safe_tx.nonce.to_string()));

    EIP712TypedData {
        types: get_eip712_tx_types(layout),
        primary_type: "SafeTx".to_string(),
        domain: EIP712Domain {
            chain_id: layout.includes_chain_id().then_some(tx.chain_id),
            verifying_contract: tx.safe,
        },
        message,
    }
}

#[cfg(test)]
pub(crate) mod test {
    use super::*;
    use crate::transaction_data::OperationType;
    use alloy_primitives::{address, b256, hex, Bytes};
    use safe_primitives::hash;

    pub(crate) const SAFE: Address = address!("1230B3d59858296A31053C1b8562Ecf89A2f888b");
    const TOKEN: Address = address!("71590d5D9D6AD1ab6a1f8e6bD3f3E3E9E2a8A1C0");

    /// `transfer(0x7159..a1c0, 1000)` from the Safe at nonce 5.
    pub(crate) fn transfer(version: SafeVersion, chain_id: u64) -> Transaction {
        Transaction::new(
            SAFE,
            chain_id,
            version,
            SafeTransactionData {
                to: TOKEN,
                data: Bytes::from(hex!("a9059cbb00000000000000000000000071590d5d9d6ad1ab6a1f8e6bd3f3e3e9e2a8a1c000000000000000000000000000000000000000000000000000000000000003e8")),
                nonce: U256::from(5),
                ..Default::default()
            },
        )
    }

    #[test]
    fn type_hashes() {
        let tx = transfer(SafeVersion::V1_3_0, 1);

        assert_eq!(
            SafeTx::from(&tx.safe_tx).eip712_type_hash(),
            b256!("bb8310d486368db6bd6f849402fdd73ad53d316b5a4b2644ad6efe0f941286d8")
        );
        assert_eq!(
            legacy::SafeTx::from(&tx.safe_tx).eip712_type_hash(),
            b256!("14d461bc7412367e924637b363c7bf29b8f47e2f84869f4426e5633d8af47b20")
        );
        assert_eq!(
            hash("EIP712Domain(uint256 chainId,address verifyingContract)"),
            b256!("47e79534a245952e8b16893a336b85a3d9ea9fa8c573f3d803afb92a79469218")
        );
        assert_eq!(
            hash("EIP712Domain(address verifyingContract)"),
            b256!("035aff83d86937d35b32e04f0ddc6ff469290eef2f1b692d8a815c89404d4749")
        );
    }

    #[test]
    fn domain_separator_encoding() {
        let mut preimage = hash("EIP712Domain(uint256 chainId,address verifyingContract)").to_vec();
        preimage.extend_from_slice(&U256::from(1).to_be_bytes::<32>());
        preimage.extend_from_slice(SAFE.into_word().as_slice());
        assert_eq!(domain_separator(SAFE, &SafeVersion::V1_3_0, 1), hash(preimage));

        let mut preimage = hash("EIP712Domain(address verifyingContract)").to_vec();
        preimage.extend_from_slice(SAFE.into_word().as_slice());
        assert_eq!(domain_separator(SAFE, &SafeVersion::new(1, 1, 1), 1), hash(preimage));
    }

    #[test]
    fn v1_3_0_is_chain_bound() {
        assert_eq!(
            transfer(SafeVersion::V1_3_0, 1).safe_tx_hash(),
            b256!("ae4eb236285fcdf8ed9fbf4311d7b26673be6f824eb51f2a290580cf048bcffd")
        );
        assert_eq!(
            transfer(SafeVersion::V1_3_0, 100).safe_tx_hash(),
            b256!("2b7160213c6351f2844e84195d0b2183eadcb9fe97732eb387c91d83f225ebd2")
        );
        assert_eq!(
            transfer(SafeVersion::parse("1.3.0+L2").unwrap(), 1).safe_tx_hash(),
            transfer(SafeVersion::V1_3_0, 1).safe_tx_hash()
        );
    }

    #[test]
    fn pre_v1_3_0_ignores_chain() {
        let expected = b256!("8e4f5adf5b9394692966184ad2e1c0c42d81e142d037030cc83f5c0912af8c93");

        assert_eq!(transfer(SafeVersion::new(1, 1, 1), 1).safe_tx_hash(), expected);
        assert_eq!(transfer(SafeVersion::new(1, 1, 1), 100).safe_tx_hash(), expected);
        assert_eq!(transfer(SafeVersion::V1_0_0, 1).safe_tx_hash(), expected);
    }

    #[test]
    fn legacy_uses_data_gas() {
        assert_eq!(
            transfer(SafeVersion::new(0, 1, 0), 1).safe_tx_hash(),
            b256!("35d48018c7cda1795c08075f2e84d99bad40ca41882c86b20874e4db0239c4c6")
        );
    }

    #[test]
    fn rejection_hash() {
        let rejection = Transaction::rejection(SAFE, 1, SafeVersion::V1_3_0, U256::from(5));
        assert_eq!(
            rejection.safe_tx_hash(),
            b256!("09d1c66697bdd61d036aeade4c5aad80666853affa2e414a2dd5449f639c16e1")
        );
    }

    #[test]
    fn gas_and_delegate_call_fields() {
        let tx = Transaction::new(
            SAFE,
            1,
            SafeVersion::V1_3_0,
            SafeTransactionData {
                to: TOKEN,
                value: U256::from(1_000_000_000_000_000_000u128),
                operation: OperationType::DelegateCall,
                safe_tx_gas: U256::from(50_000),
                base_gas: U256::from(21_000),
                gas_price: U256::from(1_000_000_000u64),
                nonce: U256::from(7),
                ..Default::default()
            },
        );

        assert_eq!(
            tx.safe_tx_hash(),
            b256!("0f3093ff4520fad1b4a2d6847c7c9f1edd145d968659f0009a6d11b81d4267c9")
        );
    }

    #[test]
    fn hashing_is_deterministic() {
        let tx = transfer(SafeVersion::V1_3_0, 1);
        assert_eq!(compute_safe_tx_hash(&tx, &tx.safe_version, 1), tx.safe_tx_hash());
        assert_eq!(tx.safe_tx_hash(), tx.clone().safe_tx_hash());
    }

    #[test]
    fn typed_data_follows_layout() {
        let typed = eip712_typed_data(&transfer(SafeVersion::V1_3_0, 100));
        let json = serde_json::to_value(&typed).unwrap();

        assert_eq!(json["primaryType"], "SafeTx");
        assert_eq!(json["domain"]["chainId"], 100);
        assert_eq!(json["domain"]["verifyingContract"], "0x1230B3d59858296A31053C1b8562Ecf89A2f888b");
        assert_eq!(json["types"]["EIP712Domain"].as_array().unwrap().len(), 2);
        assert_eq!(json["types"]["SafeTx"][5]["name"], "baseGas");
        assert_eq!(json["message"]["nonce"], "5");
        assert_eq!(json["message"]["operation"], 0);

        let legacy = serde_json::to_value(eip712_typed_data(&transfer(SafeVersion::new(0, 1, 0), 1)))
            .unwrap();
        assert!(legacy["domain"].get("chainId").is_none());
        assert_eq!(legacy["types"]["EIP712Domain"].as_array().unwrap().len(), 1);
        assert_eq!(legacy["types"]["SafeTx"][5]["name"], "dataGas");
        assert_eq!(legacy["message"]["dataGas"], "0");
    }
}
