//! Confirmation and execution of a single transaction.
//!
//! A [SigningFlow] allows one request at a time. [SigningFlow::begin] hands out a [SigningGuard]
//! that owns the slot and the cancellation token of that request. Only a signature that recovers
//! to the selected key is ever submitted.

use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::Duration,
};

use alloy_primitives::B256;
use safe_primitives::SafeSignature;
use tokio_util::sync::{CancellationToken, WaitForCancellationFuture};
use tracing::{debug, info, warn};

use crate::{
    calls,
    consts::DEFAULT_SETTLE_DELAY,
    details::{SafeInfo, TransactionDetails},
    execution,
    gateway::{ClientGateway, GatewayError, TxRef},
    keys::{KeyInfo, KeyType},
    signer::{
        verify_signature, Backends, ExecutionHandle, ExecutionRequest, OwnerSigner, SignOutcome,
        SignerError, WalletSession,
    },
    transaction_data::{SafeTxHash, Transaction},
    Error,
};

#[derive(Debug, thiserror::Error)]
pub enum SigningError {
    #[error("Another signing request is in progress")]
    AlreadyInProgress,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SigningConfig {
    /// Pause after a confirmation was accepted, before the caller reloads the transaction.
    pub settle_delay: Duration,
}

impl Default for SigningConfig {
    fn default() -> Self {
        Self { settle_delay: DEFAULT_SETTLE_DELAY }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SigningOutcome {
    Confirmed(SafeSignature),
    Declined,
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionOutcome {
    /// Hash of the mined `execTransaction`.
    Executed(B256),
    Cancelled,
}

/// Exclusive right to run one request on a [SigningFlow].
///
/// Dropping the guard frees the flow for the next request.
#[derive(Debug)]
pub struct SigningGuard {
    token: CancellationToken,
    slot: Arc<AtomicBool>,
}

impl SigningGuard {
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    pub fn cancelled(&self) -> WaitForCancellationFuture<'_> {
        self.token.cancelled()
    }

    /// A token that cancels this request, e.g. to hand to a shutdown handler.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.token.clone()
    }
}

impl Drop for SigningGuard {
    fn drop(&mut self) {
        self.slot.store(false, Ordering::Release);
    }
}

pub struct SigningFlow<G> {
    gateway: G,
    config: SigningConfig,
    in_flight: Arc<AtomicBool>,
}

impl<G: ClientGateway> SigningFlow<G> {
    pub fn new(gateway: G) -> Self {
        Self::with_config(gateway, SigningConfig::default())
    }

    pub fn with_config(gateway: G, config: SigningConfig) -> Self {
        Self { gateway, config, in_flight: Arc::new(AtomicBool::new(false)) }
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn begin(&self) -> Result<SigningGuard, SigningError> {
        self.begin_with_token(CancellationToken::new())
    }

    /// Like [Self::begin], the request is also cancelled with `parent`.
    pub fn begin_child(&self, parent: &CancellationToken) -> Result<SigningGuard, SigningError> {
        self.begin_with_token(parent.child_token())
    }

    fn begin_with_token(&self, token: CancellationToken) -> Result<SigningGuard, SigningError> {
        self.in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| SigningError::AlreadyInProgress)?;

        Ok(SigningGuard { token, slot: self.in_flight.clone() })
    }

    /// Fetches the transaction and the current state of its Safe.
    pub async fn load(
        &self,
        tx: TxRef,
        chain_id: u64,
    ) -> Result<(TransactionDetails, SafeInfo), Error> {
        let details = self.gateway.transaction_details(tx, chain_id).await?;
        let safe = self.gateway.safe_info(details.safe_address, chain_id).await?;
        Ok((details, safe))
    }

    /// Signs the transaction with `key` and submits the confirmation.
    pub async fn confirm(
        &self,
        details: &TransactionDetails,
        safe: &SafeInfo,
        key: &KeyInfo,
        backends: &Backends<'_>,
        guard: &SigningGuard,
    ) -> Result<SigningOutcome, Error> {
        let (tx, hash) = checked_transaction(details, safe)?;
        let signer = OwnerSigner::for_key(key, backends)?;

        let outcome = tokio::select! {
            biased;
            _ = guard.cancelled() => {
                debug!(safe_tx_hash = %hash, "signing cancelled");
                return Ok(SigningOutcome::Cancelled);
            }
            outcome = signer.sign(&tx, hash) => outcome?,
        };

        let signature = match outcome {
            SignOutcome::Signed(signature) => signature,
            SignOutcome::Declined => return Ok(SigningOutcome::Declined),
        };

        verify_signature(hash, &signature, key.address)?;

        if guard.is_cancelled() {
            debug!(safe_tx_hash = %hash, "cancelled before submission");
            return Ok(SigningOutcome::Cancelled);
        }

        match self.gateway.confirm(hash, signature, safe.chain_id).await {
            Ok(()) => {}
            Err(GatewayError::Cancelled) => return Ok(SigningOutcome::Cancelled),
            Err(err) => return Err(err.into()),
        }

        info!(safe_tx_hash = %hash, signer = %key.address, "confirmation submitted");
        tokio::time::sleep(self.config.settle_delay).await;

        Ok(SigningOutcome::Confirmed(signature))
    }

    /// Relays `execTransaction` to the wallet behind a WalletConnect key.
    pub async fn execute(
        &self,
        details: &TransactionDetails,
        safe: &SafeInfo,
        key: &KeyInfo,
        session: &dyn WalletSession,
        rpc_url: &str,
        guard: &SigningGuard,
    ) -> Result<ExecutionOutcome, Error> {
        let KeyType::WalletConnect { session_topic } = &key.key_type else {
            return Err(Error::Unsupported(format!(
                "Key {} can not execute, connect a wallet instead",
                key.name
            )));
        };

        if !execution::is_executable(details, safe) {
            return Err(Error::InvalidInput(format!(
                "Transaction {} is not ready for execution",
                details.tx_id
            )));
        }

        let (tx, hash) = checked_transaction(details, safe)?;
        let confirmations_required =
            details.multisig_info().map_or(safe.threshold, |info| info.confirmations_required);
        let confirmations = details.ecdsa_confirmations();
        let signatures = calls::pack_signatures(confirmations.iter().copied());

        let request = ExecutionRequest {
            from: key.address,
            chain_id: safe.chain_id,
            rpc_url: rpc_url.to_string(),
            transaction: calls::exec_transaction(&tx.safe_tx, &signatures, safe.address),
            confirmations: confirmations.len(),
            threshold: confirmations_required,
        };

        let ExecutionHandle { sent, result } = tokio::select! {
            biased;
            _ = guard.cancelled() => return Ok(ExecutionOutcome::Cancelled),
            handle = session.execute(session_topic, request) => handle?,
        };

        tokio::select! {
            biased;
            _ = guard.cancelled() => return Ok(ExecutionOutcome::Cancelled),
            sent = sent => sent.map_err(|_| closed_session())?,
        }
        info!(safe_tx_hash = %hash, "execution sent by wallet");

        let tx_hash = tokio::select! {
            biased;
            _ = guard.cancelled() => return Ok(ExecutionOutcome::Cancelled),
            result = result => result.map_err(|_| closed_session())?.map_err(SignerError::Session)?,
        };
        info!(safe_tx_hash = %hash, %tx_hash, "transaction executed");

        Ok(ExecutionOutcome::Executed(tx_hash))
    }
}

fn closed_session() -> SignerError {
    SignerError::Session("Wallet closed the session before the execution finished".to_string())
}

/// Rebuilds the transaction and requires its hash to match what the gateway reports.
fn checked_transaction(
    details: &TransactionDetails,
    safe: &SafeInfo,
) -> Result<(Transaction, SafeTxHash), Error> {
    if details.safe_address != safe.address {
        return Err(Error::InvalidInput(format!(
            "Transaction {} does not belong to Safe {}",
            details.tx_id, safe.address
        )));
    }

    let info = details.multisig_info().ok_or_else(|| {
        Error::InvalidInput(format!("Transaction {} is not a multisig transaction", details.tx_id))
    })?;

    let tx = Transaction::from_details(details, safe.chain_id, safe.safe_version()?)?;
    let computed = tx.safe_tx_hash();
    if computed != info.safe_tx_hash {
        warn!(%computed, expected = %info.safe_tx_hash, "safe transaction hash mismatch");
        return Err(Error::HashMismatch { computed, expected: info.safe_tx_hash });
    }

    Ok((tx, computed))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        details::{self, DetailedExecutionInfo, TxStatus},
        execution::test::{confirmed_by, key, safe, OWNER_A, OWNER_B, OWNER_C},
        gateway::MockClientGateway,
        signer::{
            local::test::key_store, wallet_connect::MockWalletSession, DeviceResponse,
            HardwareTransport,
        },
    };
    use alloy_primitives::{address, b256, hex, Address, Bytes};
    use async_trait::async_trait;
    use reqwest::StatusCode;
    use tokio::sync::Notify;

    const SAFE_TX_HASH: B256 =
        b256!("ae4eb236285fcdf8ed9fbf4311d7b26673be6f824eb51f2a290580cf048bcffd");
    const SIGNATURE: [u8; 65] = hex!("cd0fbd943bbc849679f811a0efac0ceda87dc963927fc1f2b114e9030b4999386682fb2fc8f121231544da364de0e1632c4a484e8ab45a4e844f0735b96dedb71b");
    const OUTSIDER: Address = address!("00000000000000000000000000000000000000aa");

    fn local_key() -> KeyInfo {
        key(OWNER_A, KeyType::DeviceImported)
    }

    fn wallet_key(address: Address) -> KeyInfo {
        key(address, KeyType::WalletConnect { session_topic: "topic-1".to_string() })
    }

    #[test]
    fn one_request_at_a_time() {
        let flow = SigningFlow::new(MockClientGateway::new());

        let guard = flow.begin().unwrap();
        assert!(matches!(flow.begin(), Err(SigningError::AlreadyInProgress)));

        drop(guard);
        assert!(flow.begin().is_ok());
    }

    #[test]
    fn parent_cancels_request() {
        let flow = SigningFlow::new(MockClientGateway::new());
        let shutdown = CancellationToken::new();

        let guard = flow.begin_child(&shutdown).unwrap();
        assert!(!guard.is_cancelled());

        shutdown.cancel();
        assert!(guard.is_cancelled());
    }

    #[tokio::test(start_paused = true)]
    async fn confirms_with_local_key() {
        let mut gateway = MockClientGateway::new();
        gateway
            .expect_confirm()
            .withf(|hash, signature, chain_id| {
                *hash == SAFE_TX_HASH && signature.to_bytes() == SIGNATURE && *chain_id == 1
            })
            .times(1)
            .returning(|_, _, _| Ok(()));

        let flow = SigningFlow::new(gateway);
        let store = key_store();
        let backends = Backends { key_store: Some(&store), ..Default::default() };
        let guard = flow.begin().unwrap();

        let started = tokio::time::Instant::now();
        let outcome = flow
            .confirm(&details::test::details(), &safe(5), &local_key(), &backends, &guard)
            .await
            .unwrap();

        assert!(matches!(outcome, SigningOutcome::Confirmed(signature) if signature.to_bytes() == SIGNATURE));
        assert!(started.elapsed() >= DEFAULT_SETTLE_DELAY);
    }

    #[tokio::test]
    async fn cancelled_request_submits_nothing() {
        let flow = SigningFlow::new(MockClientGateway::new());
        let store = key_store();
        let backends = Backends { key_store: Some(&store), ..Default::default() };

        let guard = flow.begin().unwrap();
        guard.cancel();

        let outcome = flow
            .confirm(&details::test::details(), &safe(5), &local_key(), &backends, &guard)
            .await
            .unwrap();
        assert_eq!(outcome, SigningOutcome::Cancelled);
    }

    /// A device that takes the request and never answers.
    #[derive(Default)]
    struct UnresponsiveDevice {
        asked: Notify,
    }

    #[async_trait]
    impl HardwareTransport for UnresponsiveDevice {
        async fn sign(&self, _hash: B256, _path: &str, _device_id: &str) -> DeviceResponse {
            self.asked.notify_one();
            std::future::pending().await
        }
    }

    #[tokio::test]
    async fn cancels_pending_device_signature() {
        let flow = SigningFlow::new(MockClientGateway::new());
        let device = UnresponsiveDevice::default();
        let backends = Backends { hardware: Some(&device), ..Default::default() };
        let ledger = key(
            OWNER_A,
            KeyType::Ledger {
                device_id: "nano-x".to_string(),
                derivation_path: "m/44'/60'/0'/0/0".to_string(),
            },
        );

        let guard = flow.begin().unwrap();
        let token = guard.cancellation_token();
        let details = details::test::details();
        let safe = safe(5);

        let (outcome, _) = tokio::join!(
            flow.confirm(&details, &safe, &ledger, &backends, &guard),
            async {
                device.asked.notified().await;
                token.cancel();
            }
        );
        assert_eq!(outcome.unwrap(), SigningOutcome::Cancelled);

        assert!(matches!(flow.begin(), Err(SigningError::AlreadyInProgress)));
        drop(guard);
        assert!(flow.begin().is_ok());
    }

    #[tokio::test]
    async fn hash_mismatch_is_refused() {
        let mut details = details::test::details();
        let Some(DetailedExecutionInfo::Multisig(info)) = details.detailed_execution_info.as_mut()
        else {
            unreachable!()
        };
        info.safe_tx_hash = B256::repeat_byte(0x01);

        let flow = SigningFlow::new(MockClientGateway::new());
        let store = key_store();
        let backends = Backends { key_store: Some(&store), ..Default::default() };
        let guard = flow.begin().unwrap();

        let result = flow
            .confirm(&details, &safe(5), &local_key(), &backends, &guard)
            .await;
        assert!(matches!(
            result,
            Err(Error::HashMismatch { computed, .. }) if computed == SAFE_TX_HASH
        ));
    }

    #[tokio::test]
    async fn declined_in_wallet() {
        let mut session = MockWalletSession::new();
        session.expect_sign().times(1).returning(|_, _| Ok(None));

        let flow = SigningFlow::new(MockClientGateway::new());
        let backends = Backends { session: Some(&session), ..Default::default() };
        let guard = flow.begin().unwrap();

        let outcome = flow
            .confirm(&details::test::details(), &safe(5), &wallet_key(OWNER_A), &backends, &guard)
            .await
            .unwrap();
        assert_eq!(outcome, SigningOutcome::Declined);
    }

    #[tokio::test]
    async fn signature_from_another_key_is_not_submitted() {
        let mut session = MockWalletSession::new();
        session.expect_sign().returning(|_, _| Ok(Some(Bytes::copy_from_slice(&SIGNATURE))));

        let flow = SigningFlow::new(MockClientGateway::new());
        let backends = Backends { session: Some(&session), ..Default::default() };
        let guard = flow.begin().unwrap();

        let result = flow
            .confirm(&details::test::details(), &safe(5), &wallet_key(OWNER_B), &backends, &guard)
            .await;
        assert!(matches!(
            result,
            Err(Error::Verification { expected, recovered }) if expected == OWNER_B && recovered == OWNER_A
        ));
    }

    #[tokio::test]
    async fn gateway_cancellation_is_not_an_error() {
        let mut gateway = MockClientGateway::new();
        gateway.expect_confirm().returning(|_, _, _| Err(GatewayError::Cancelled));

        let flow = SigningFlow::new(gateway);
        let store = key_store();
        let backends = Backends { key_store: Some(&store), ..Default::default() };
        let guard = flow.begin().unwrap();

        let outcome = flow
            .confirm(&details::test::details(), &safe(5), &local_key(), &backends, &guard)
            .await
            .unwrap();
        assert_eq!(outcome, SigningOutcome::Cancelled);
    }

    #[tokio::test]
    async fn loads_details_and_safe() {
        let mut gateway = MockClientGateway::new();
        gateway
            .expect_transaction_details()
            .withf(|tx, chain_id| *tx == TxRef::SafeTxHash(SAFE_TX_HASH) && *chain_id == 1)
            .returning(|_, _| Ok(details::test::details()));
        gateway.expect_safe_info().returning(|_, _| Ok(safe(5)));

        let flow = SigningFlow::new(gateway);
        let (details, safe_info) = flow.load(TxRef::SafeTxHash(SAFE_TX_HASH), 1).await.unwrap();
        assert_eq!(details.safe_address, safe_info.address);
    }

    #[tokio::test]
    async fn missing_transaction() {
        let mut gateway = MockClientGateway::new();
        gateway.expect_transaction_details().returning(|_, _| {
            Err(GatewayError::Status { status: StatusCode::NOT_FOUND, body: String::new() })
        });

        let flow = SigningFlow::new(gateway);
        let result = flow.load(TxRef::Id("multisig_0x01".to_string()), 1).await;
        assert!(matches!(result, Err(Error::Network(err)) if err.is_not_found()));
    }

    fn ready_to_execute() -> TransactionDetails {
        let mut details = confirmed_by(&[OWNER_C, OWNER_B]);
        details.tx_status = TxStatus::AwaitingExecution;
        details
    }

    #[tokio::test]
    async fn executes_through_wallet() {
        let details = ready_to_execute();
        let tx = Transaction::from_details(&details, 1, safe(5).safe_version().unwrap()).unwrap();
        let signatures = [vec![0x11; 64], vec![27]].concat().repeat(2);
        let expected = calls::exec_transaction(&tx.safe_tx, &signatures, safe(5).address);

        let mut session = MockWalletSession::new();
        session
            .expect_execute()
            .withf(move |topic, request| {
                topic == "topic-1"
                    && request.from == OUTSIDER
                    && request.transaction == expected
                    && request.confirmations == 2
                    && request.threshold == 2
            })
            .times(1)
            .returning(|_, _| {
                let (events, handle) = ExecutionHandle::channel();
                events.sent.send(()).unwrap();
                events.result.send(Ok(B256::repeat_byte(0x42))).unwrap();
                Ok(handle)
            });

        let flow = SigningFlow::new(MockClientGateway::new());
        let guard = flow.begin().unwrap();
        let outcome = flow
            .execute(&details, &safe(5), &wallet_key(OUTSIDER), &session, "http://localhost:8545", &guard)
            .await
            .unwrap();

        assert_eq!(outcome, ExecutionOutcome::Executed(B256::repeat_byte(0x42)));
    }

    #[tokio::test]
    async fn execution_reports_threshold_of_the_transaction() {
        let details = ready_to_execute();
        let mut safe = safe(5);
        safe.threshold = 3;

        let mut session = MockWalletSession::new();
        session
            .expect_execute()
            .withf(|_, request| request.confirmations == 2 && request.threshold == 2)
            .times(1)
            .returning(|_, _| {
                let (events, handle) = ExecutionHandle::channel();
                events.sent.send(()).unwrap();
                events.result.send(Ok(B256::repeat_byte(0x42))).unwrap();
                Ok(handle)
            });

        let flow = SigningFlow::new(MockClientGateway::new());
        let guard = flow.begin().unwrap();
        let outcome = flow
            .execute(&details, &safe, &wallet_key(OUTSIDER), &session, "", &guard)
            .await
            .unwrap();
        assert_eq!(outcome, ExecutionOutcome::Executed(B256::repeat_byte(0x42)));
    }

    #[tokio::test]
    async fn execution_requires_wallet_key() {
        let flow = SigningFlow::new(MockClientGateway::new());
        let session = MockWalletSession::new();
        let guard = flow.begin().unwrap();

        let result = flow
            .execute(&ready_to_execute(), &safe(5), &local_key(), &session, "", &guard)
            .await;
        assert!(matches!(result, Err(Error::Unsupported(_))));
    }

    #[tokio::test]
    async fn execution_waits_for_its_nonce() {
        let flow = SigningFlow::new(MockClientGateway::new());
        let session = MockWalletSession::new();
        let guard = flow.begin().unwrap();

        let result = flow
            .execute(&ready_to_execute(), &safe(4), &wallet_key(OWNER_A), &session, "", &guard)
            .await;
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }

    #[tokio::test]
    async fn wallet_dropping_the_request() {
        let mut session = MockWalletSession::new();
        session.expect_execute().returning(|_, _| {
            let (events, handle) = ExecutionHandle::channel();
            drop(events);
            Ok(handle)
        });

        let flow = SigningFlow::new(MockClientGateway::new());
        let guard = flow.begin().unwrap();

        let result = flow
            .execute(&ready_to_execute(), &safe(5), &wallet_key(OWNER_A), &session, "", &guard)
            .await;
        assert!(matches!(result, Err(Error::Signer(SignerError::Session(_)))));
    }

    #[tokio::test]
    async fn failed_execution_reports_wallet_message() {
        let mut session = MockWalletSession::new();
        session.expect_execute().returning(|_, _| {
            let (events, handle) = ExecutionHandle::channel();
            events.sent.send(()).unwrap();
            events.result.send(Err("insufficient funds for gas".to_string())).unwrap();
            Ok(handle)
        });

        let flow = SigningFlow::new(MockClientGateway::new());
        let guard = flow.begin().unwrap();

        let result = flow
            .execute(&ready_to_execute(), &safe(5), &wallet_key(OWNER_A), &session, "", &guard)
            .await;
        assert!(matches!(
            result,
            Err(Error::Signer(SignerError::Session(message))) if message == "insufficient funds for gas"
        ));
    }
}
