use alloy_primitives::{Address, Bytes, B256};
use async_trait::async_trait;
use safe_primitives::{SafeSignature, PrimitiveError};
use tokio::sync::oneshot;

use super::SignerError;
use crate::transaction_data::{EIP712TypedData, ExecutableSafeTransaction};

/// An `execTransaction` relayed to a paired wallet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionRequest {
    pub from: Address,
    pub chain_id: u64,
    pub rpc_url: String,
    pub transaction: ExecutableSafeTransaction,
    pub confirmations: usize,
    pub threshold: u64,
}

/// Wallet side of an [ExecutionHandle].
#[derive(Debug)]
pub struct ExecutionEvents {
    pub sent: oneshot::Sender<()>,
    pub result: oneshot::Sender<Result<B256, String>>,
}

/// Events of a relayed execution: the wallet sent the transaction, then it was mined (or not).
#[derive(Debug)]
pub struct ExecutionHandle {
    pub sent: oneshot::Receiver<()>,
    pub result: oneshot::Receiver<Result<B256, String>>,
}

impl ExecutionHandle {
    pub fn channel() -> (ExecutionEvents, ExecutionHandle) {
        let (sent_tx, sent_rx) = oneshot::channel();
        let (result_tx, result_rx) = oneshot::channel();
        (
            ExecutionEvents { sent: sent_tx, result: result_tx },
            ExecutionHandle { sent: sent_rx, result: result_rx },
        )
    }
}

/// An established session with an external wallet.
#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
#[async_trait]
pub trait WalletSession: Send + Sync {
    /// Requests `eth_signTypedData_v4`. `None` means the user declined in the wallet.
    async fn sign(
        &self,
        session_topic: &str,
        typed_data: EIP712TypedData,
    ) -> Result<Option<Bytes>, SignerError>;

    async fn execute(
        &self,
        session_topic: &str,
        request: ExecutionRequest,
    ) -> Result<ExecutionHandle, SignerError>;
}

/// Reads a wallet signature, which may use either recovery byte convention.
pub fn parse_wallet_signature(raw: &[u8]) -> Result<SafeSignature, SignerError> {
    let raw: &[u8; 65] =
        raw.try_into().map_err(|_| PrimitiveError::InvalidSignatureLength(raw.len()))?;
    Ok(SafeSignature::ecdsa(
        B256::from_slice(&raw[..32]),
        B256::from_slice(&raw[32..64]),
        raw[64],
    )?)
}

pub struct WalletConnectSigner<'a> {
    session_topic: String,
    session: &'a dyn WalletSession,
}

impl<'a> WalletConnectSigner<'a> {
    pub fn new(session_topic: impl Into<String>, session: &'a dyn WalletSession) -> Self {
        Self { session_topic: session_topic.into(), session }
    }

    pub async fn sign(
        &self,
        typed_data: EIP712TypedData,
    ) -> Result<Option<SafeSignature>, SignerError> {
        match self.session.sign(&self.session_topic, typed_data).await? {
            Some(raw) => parse_wallet_signature(&raw).map(Some),
            None => Ok(None),
        }
    }
}
