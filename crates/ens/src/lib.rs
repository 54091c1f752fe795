//! Ethereum Name Service resolution over a read-only call transport.

use alloy_primitives::{address, Address, FixedBytes, B256};
use safe_primitives::{
    rpc::{call_and_decode, CallTransport},
    AddressExt,
};
use tracing::debug;

pub mod contracts;
pub mod error;
pub mod namehash;
pub mod normalize;

pub use error::EnsError;
pub use namehash::namehash;
pub use normalize::{decode, normalize};

use contracts::{ENSRegistry, ENSResolver, ADDR_INTERFACE_ID};

/// The ENS registry deployed on mainnet and the major testnets.
pub const MAINNET_REGISTRY: Address = address!("00000000000C2E074eC69A0dFb2997BA6C7d2e1e");

const REVERSE_SUFFIX: &str = "addr.reverse";

/// Resolves names against one ENS registry.
#[derive(Debug, Clone)]
pub struct Ens<T> {
    registry: Address,
    transport: T,
}

impl<T: CallTransport> Ens<T> {
    pub fn new(registry: Address, transport: T) -> Self {
        Self { registry, transport }
    }

    pub fn mainnet(transport: T) -> Self {
        Self::new(MAINNET_REGISTRY, transport)
    }

    pub fn registry(&self) -> Address {
        self.registry
    }

    /// Resolves `name` to the address its resolver reports.
    pub async fn resolve_address(&self, name: &str) -> Result<Address, EnsError> {
        let node = namehash(&normalize(name)?);

        let resolver = self.resolver(node).await?;
        if resolver.is_unset() {
            return Err(EnsError::NameNotRegistered(name.to_string()));
        }

        let call = ENSResolver::supportsInterfaceCall {
            interfaceID: FixedBytes(ADDR_INTERFACE_ID),
        };
        let ENSResolver::supportsInterfaceReturn { _0: supported } =
            call_and_decode(&self.transport, call, resolver).await?;
        if !supported {
            return Err(EnsError::UnsupportedResolver(name.to_string()));
        }

        let ENSResolver::addrReturn { _0: resolved } =
            call_and_decode(&self.transport, ENSResolver::addrCall { node }, resolver).await?;
        if resolved.is_unset() {
            return Err(EnsError::AddressNotFound(name.to_string()));
        }

        debug!(target: "ens", name, %resolved, "resolved name");
        Ok(resolved)
    }

    /// Looks up the primary name of `address`.
    ///
    /// Only names that resolve back to `address` are returned. Every failure along the way yields
    /// `None`.
    pub async fn resolve_name(&self, address: Address) -> Option<String> {
        match self.reverse_lookup(address).await {
            Ok(name) => name,
            Err(err) => {
                debug!(target: "ens", %address, %err, "reverse resolution failed");
                None
            }
        }
    }

    async fn reverse_lookup(&self, address: Address) -> Result<Option<String>, EnsError> {
        let reverse_name = format!("{}.{REVERSE_SUFFIX}", address.to_plain_hex());
        let node = namehash(&normalize(&reverse_name)?);

        let resolver = self.resolver(node).await?;
        if resolver.is_unset() {
            debug!(target: "ens", %address, "no reverse resolver");
            return Ok(None);
        }

        let ENSResolver::nameReturn { _0: ascii_name } =
            call_and_decode(&self.transport, ENSResolver::nameCall { node }, resolver).await?;
        let name = decode(&ascii_name)?;

        let forward = self.resolve_address(&name).await?;
        if forward != address {
            debug!(target: "ens", %address, %forward, name, "reverse record does not round-trip");
            return Ok(None);
        }

        Ok(Some(name))
    }

    async fn resolver(&self, node: B256) -> Result<Address, EnsError> {
        let ENSRegistry::resolverReturn { _0: resolver } =
            call_and_decode(&self.transport, ENSRegistry::resolverCall { node }, self.registry)
                .await?;
        Ok(resolver)
    }
}
