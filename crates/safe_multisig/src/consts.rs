use std::time::Duration;

use chains::{gnosis, mainnet, polygon, sepolia};

use crate::Error;

/// Base URL of the Safe client gateway, shared by every supported chain.
pub const CLIENT_GATEWAY_URL: &str = "https://safe-client.safe.global";

/// How long to wait after submitting a confirmation before reloading, the gateway may lag.
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_millis(600);

pub mod chains {
    pub mod mainnet {
        pub const CHAIN_ID: u64 = 1;
        pub const NAME: &str = "mainnet";
    }

    pub mod sepolia {
        pub const CHAIN_ID: u64 = 11155111;
        pub const NAME: &str = "sepolia";
    }

    pub mod gnosis {
        pub const CHAIN_ID: u64 = 100;
        pub const NAME: &str = "gnosis";
    }

    pub mod polygon {
        pub const CHAIN_ID: u64 = 137;
        pub const NAME: &str = "polygon";
    }
}

/// Chain ids the client gateway serves.
pub const SUPPORTED_CHAINS: [u64; 4] =
    [mainnet::CHAIN_ID, sepolia::CHAIN_ID, gnosis::CHAIN_ID, polygon::CHAIN_ID];

pub fn chain_name(chain_id: u64) -> Option<&'static str> {
    match chain_id {
        mainnet::CHAIN_ID => Some(mainnet::NAME),
        sepolia::CHAIN_ID => Some(sepolia::NAME),
        gnosis::CHAIN_ID => Some(gnosis::NAME),
        polygon::CHAIN_ID => Some(polygon::NAME),
        _ => None,
    }
}

pub fn get_gateway_url(chain_id: u64) -> Result<String, Error> {
    if !SUPPORTED_CHAINS.contains(&chain_id) {
        return Err(Error::Unsupported(format!("Chain ID {chain_id} not supported")));
    }

    Ok(CLIENT_GATEWAY_URL.to_string())
}
