//! Read-only contract calls against a node.

use std::marker::PhantomData;

use alloy_network::TransactionBuilder;
use alloy_primitives::{Address, Bytes};
use alloy_provider::Provider;
use alloy_rpc_types::TransactionRequest;
use alloy_sol_types::SolCall;
use alloy_transport::Transport;
use async_trait::async_trait;
use tracing::trace;

#[derive(Debug, thiserror::Error)]
pub enum CallError {
    #[error("RPC call failed: {0}")]
    Rpc(String),

    #[error("Failed to decode call result: {0}")]
    Decode(#[from] alloy_sol_types::Error),
}

/// Something that can execute an `eth_call` against the latest block.
#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
#[async_trait]
pub trait CallTransport: Send + Sync {
    async fn call(&self, to: Address, input: Bytes) -> Result<Bytes, CallError>;
}

/// Make a contract call and decode the response.
pub async fn call_and_decode<C: SolCall>(
    transport: &(impl CallTransport + ?Sized),
    call: C,
    to: Address,
) -> Result<C::Return, CallError> {
    let input = Bytes::from(call.abi_encode());

    trace!(target: "rpc", %to, selector = %Bytes::copy_from_slice(&C::SELECTOR), "eth_call");

    let data = transport.call(to, input).await?;
    let data = C::abi_decode_returns(data.as_ref(), true)?;

    Ok(data)
}

/// [CallTransport] backed by an alloy [Provider].
#[derive(Debug, Clone)]
pub struct ProviderTransport<P, T> {
    provider: P,
    _transport: PhantomData<fn() -> T>,
}

impl<P, T> ProviderTransport<P, T> {
    pub fn new(provider: P) -> Self {
        Self { provider, _transport: PhantomData }
    }
}

#[async_trait]
impl<P, T> CallTransport for ProviderTransport<P, T>
where
    P: Provider<T> + Send + Sync,
    T: Transport + Clone,
{
    async fn call(&self, to: Address, input: Bytes) -> Result<Bytes, CallError> {
        let mut req = TransactionRequest::default().to(to);
        req.set_input(input);

        self.provider.call(&req).await.map_err(|err| CallError::Rpc(err.to_string()))
    }
}
