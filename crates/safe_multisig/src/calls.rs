use alloy_primitives::{Address, Bytes, B256, U256};
use alloy_sol_types::SolCall;
use safe_primitives::rpc::{call_and_decode, CallTransport};
use tracing::debug;

use crate::{
    contracts::safe::Safe,
    details::{Confirmation, SafeInfo},
    transaction_data::{ExecutableSafeTransaction, SafeTransactionData},
    Error,
};

pub fn exec_transaction(
    safe_tx: &SafeTransactionData,
    signatures: &[u8],
    safe: Address,
) -> ExecutableSafeTransaction {
    let call = Safe::execTransactionCall::new((
        safe_tx.to,
        safe_tx.value,
        safe_tx.data.clone(),
        safe_tx.operation.into(),
        safe_tx.safe_tx_gas,
        safe_tx.base_gas,
        safe_tx.gas_price,
        safe_tx.gas_token,
        safe_tx.refund_receiver,
        Bytes::copy_from_slice(signatures),
    ));

    ExecutableSafeTransaction { safe_address: safe, input_data: call.abi_encode().into() }
}

/// Concatenates signatures in ascending signer order, as `checkSignatures` requires.
pub fn pack_signatures<'a>(confirmations: impl IntoIterator<Item = &'a Confirmation>) -> Bytes {
    let mut confirmations: Vec<_> = confirmations.into_iter().collect();
    confirmations.sort_by_key(|confirmation| confirmation.signer);

    confirmations
        .into_iter()
        .flat_map(|confirmation| confirmation.signature.iter().copied())
        .collect::<Vec<u8>>()
        .into()
}

pub async fn get_nonce(safe: Address, transport: &(impl CallTransport + ?Sized)) -> Result<U256, Error> {
    let call = Safe::nonceCall::new(());

    let Safe::nonceReturn { _0: nonce } = call_and_decode(transport, call, safe).await?;

    Ok(nonce)
}

pub async fn get_owners(
    safe: Address,
    transport: &(impl CallTransport + ?Sized),
) -> Result<Vec<Address>, Error> {
    let call = Safe::getOwnersCall::new(());

    let Safe::getOwnersReturn { _0: owners } = call_and_decode(transport, call, safe).await?;

    Ok(owners)
}

pub async fn get_threshold(
    safe: Address,
    transport: &(impl CallTransport + ?Sized),
) -> Result<U256, Error> {
    let call = Safe::getThresholdCall::new(());

    let Safe::getThresholdReturn { _0: threshold } = call_and_decode(transport, call, safe).await?;

    Ok(threshold)
}

/// Asks the Safe itself for the hash of `safe_tx`.
pub async fn get_transaction_hash(
    safe_tx: &SafeTransactionData,
    safe: Address,
    transport: &(impl CallTransport + ?Sized),
) -> Result<B256, Error> {
    let call = Safe::getTransactionHashCall::new((
        safe_tx.to,
        safe_tx.value,
        safe_tx.data.clone(),
        safe_tx.operation.into(),
        safe_tx.safe_tx_gas,
        safe_tx.base_gas,
        safe_tx.gas_price,
        safe_tx.gas_token,
        safe_tx.refund_receiver,
        safe_tx.nonce,
    ));

    let Safe::getTransactionHashReturn { _0: tx_hash } =
        call_and_decode(transport, call, safe).await?;

    Ok(tx_hash)
}

pub async fn get_version(
    safe: Address,
    transport: &(impl CallTransport + ?Sized),
) -> Result<String, Error> {
    let call = Safe::VERSIONCall::new(());

    let Safe::VERSIONReturn { _0: version } = call_and_decode(transport, call, safe).await?;

    Ok(version)
}

pub async fn is_owner(
    address: Address,
    safe: Address,
    transport: &(impl CallTransport + ?Sized),
) -> Result<bool, Error> {
    let call = Safe::isOwnerCall::new((address,));

    let Safe::isOwnerReturn { _0: is_owner } = call_and_decode(transport, call, safe).await?;

    Ok(is_owner)
}

/// Reads the Safe state straight from the chain.
pub async fn load_safe_info(
    safe: Address,
    chain_id: u64,
    transport: &(impl CallTransport + ?Sized),
) -> Result<SafeInfo, Error> {
    let (version, nonce, threshold, owners) = tokio::try_join!(
        get_version(safe, transport),
        get_nonce(safe, transport),
        get_threshold(safe, transport),
        get_owners(safe, transport),
    )?;

    let threshold = u64::try_from(threshold)
        .map_err(|_| Error::InvalidInput(format!("Threshold {threshold} out of range")))?;

    debug!(%safe, %version, %nonce, threshold, owners = owners.len(), "loaded safe on chain");

    Ok(SafeInfo { address: safe, chain_id, nonce, threshold, owners, version: Some(version) })
}
