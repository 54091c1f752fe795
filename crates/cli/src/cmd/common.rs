use std::path::PathBuf;

use alloy_provider::{ProviderBuilder, RootProvider};
use alloy_transport::BoxTransport;
use clap::Args;
use eyre::{OptionExt, WrapErr};
use safe_multisig::{consts, SafeClient, StaticKeyRegistry};
use safe_primitives::rpc::ProviderTransport;
use tracing::debug;

use crate::utils::{default_data_dir, KEYS_FILE};

pub type NodeTransport = ProviderTransport<RootProvider<BoxTransport>, BoxTransport>;

#[derive(Debug, Clone, Args)]
pub struct GatewayOpts {
    #[arg(long, value_name = "CHAIN_ID", default_value = "1", help = "The chain the Safe is deployed on.")]
    pub chain_id: u64,

    #[arg(
        long,
        value_name = "URL",
        env = "SAFE_GATEWAY_URL",
        help = "Override the Safe client gateway."
    )]
    pub gateway_url: Option<String>,
}

impl GatewayOpts {
    pub fn client(&self) -> eyre::Result<SafeClient> {
        let client = match &self.gateway_url {
            Some(url) => SafeClient::with_gateway_url(self.chain_id, url)?,
            None => SafeClient::new(self.chain_id)?,
        };
        debug!(chain_id = self.chain_id, chain = ?consts::chain_name(self.chain_id), "using client gateway");
        Ok(client)
    }
}

#[derive(Debug, Clone, Args)]
pub struct RpcOpts {
    #[arg(long, value_name = "URL", env = "ETH_RPC_URL", help = "The RPC endpoint.")]
    pub rpc_url: String,
}

impl RpcOpts {
    pub async fn transport(&self) -> eyre::Result<NodeTransport> {
        let provider = ProviderBuilder::new()
            .on_builtin(&self.rpc_url)
            .await
            .wrap_err_with(|| format!("Failed to connect to {}", self.rpc_url))?;
        Ok(ProviderTransport::new(provider))
    }
}

#[derive(Debug, Clone, Args)]
pub struct KeyOpts {
    #[arg(
        long,
        value_name = "DIR",
        help = "Directory holding the key registry. Defaults to ~/.safe-signer."
    )]
    pub data_dir: Option<PathBuf>,
}

impl KeyOpts {
    pub fn keys_path(&self) -> eyre::Result<PathBuf> {
        let data_dir = match &self.data_dir {
            Some(dir) => dir.clone(),
            None => default_data_dir().ok_or_eyre("Could not determine the home directory")?,
        };
        Ok(data_dir.join(KEYS_FILE))
    }

    pub fn registry(&self) -> eyre::Result<StaticKeyRegistry> {
        let path = self.keys_path()?;
        debug!(path = %path.display(), "loading key registry");
        Ok(StaticKeyRegistry::load(&path)?)
    }
}
