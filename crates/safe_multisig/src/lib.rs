use tokio_util::sync::CancellationToken;
use tracing::debug;

pub mod calls;
pub mod consts;
pub mod details;
pub mod execution;
pub mod flow;
pub mod gateway;
pub mod hasher;
pub mod keys;
pub mod signer;
pub mod status;
pub mod transaction_data;
pub mod version;

mod contracts;
mod error;
mod serialization;

pub use details::{SafeInfo, TransactionDetails, TxStatus};
pub use error::Error;
pub use flow::{ExecutionOutcome, SigningConfig, SigningError, SigningFlow, SigningOutcome};
pub use gateway::{ClientGateway, GatewayError, HttpGateway, TxRef};
pub use hasher::compute_safe_tx_hash;
pub use keys::{KeyInfo, KeyRegistry, KeyType, StaticKeyRegistry};
pub use signer::{Backends, OwnerSigner, SignOutcome, SignerError};
pub use status::{classify, ConfirmationState, TransactionActions};
pub use transaction_data::{SafeTransactionData, SafeTxHash, Transaction};
pub use version::SafeVersion;

use consts::get_gateway_url;

/// A transaction together with everything derived from it for the current user.
#[derive(Debug, Clone)]
pub struct TransactionStatus {
    pub details: TransactionDetails,
    pub safe: SafeInfo,
    pub state: ConfirmationState,
    pub actions: TransactionActions,
    pub can_execute: bool,
}

/// Entry point for one chain, backed by a client gateway.
pub struct SafeClient<G = HttpGateway> {
    chain_id: u64,
    flow: SigningFlow<G>,
}

impl SafeClient {
    pub fn new(chain_id: u64) -> Result<Self, Error> {
        let gateway_url = get_gateway_url(chain_id)?;
        Self::with_gateway_url(chain_id, &gateway_url)
    }

    pub fn with_gateway_url(chain_id: u64, gateway_url: &str) -> Result<Self, Error> {
        Ok(Self::with_gateway(chain_id, HttpGateway::new(gateway_url)?))
    }
}

impl<G: ClientGateway> SafeClient<G> {
    pub fn with_gateway(chain_id: u64, gateway: G) -> Self {
        Self::with_flow(chain_id, SigningFlow::new(gateway))
    }

    pub fn with_flow(chain_id: u64, flow: SigningFlow<G>) -> Self {
        Self { chain_id, flow }
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    pub fn flow(&self) -> &SigningFlow<G> {
        &self.flow
    }

    pub async fn status(
        &self,
        tx: TxRef,
        keys: &(impl KeyRegistry + ?Sized),
    ) -> Result<TransactionStatus, Error> {
        let (details, safe) = self.flow.load(tx, self.chain_id).await?;

        let state = status::classify(&details, keys);
        let actions = status::available_actions(&details, &safe, keys);
        let can_execute = execution::can_execute(&details, &safe, keys);
        debug!(tx_id = %details.tx_id, ?state, "classified transaction");

        Ok(TransactionStatus { details, safe, state, actions, can_execute })
    }

    /// Confirms `tx` with the first of the user's keys that has not confirmed yet.
    pub async fn confirm_transaction(
        &self,
        tx: TxRef,
        keys: &(impl KeyRegistry + ?Sized),
        backends: &Backends<'_>,
        shutdown: &CancellationToken,
    ) -> Result<SigningOutcome, Error> {
        let guard = self.flow.begin_child(shutdown)?;
        let (details, safe) = self.flow.load(tx, self.chain_id).await?;

        if !status::needs_your_confirmation(&details, keys) {
            return Err(Error::InvalidInput(format!(
                "Transaction {} does not need a confirmation from your keys",
                details.tx_id
            )));
        }

        let info = details.multisig_info().ok_or_else(|| {
            Error::InvalidInput(format!("Transaction {} is not a multisig transaction", details.tx_id))
        })?;
        let key = status::signer_keys(info, keys)
            .into_iter()
            .next()
            .ok_or_else(|| Error::NotFound("No signing key for this transaction".to_string()))?;
        debug!(key = %key.name, signer = %key.address, "selected signing key");

        self.flow.confirm(&details, &safe, &key, backends, &guard).await
    }
}
