//! Client gateway access.

use std::fmt;

use alloy_primitives::{Address, B256};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use safe_primitives::SafeSignature;
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, trace};
use url::Url;

use crate::details::{SafeInfo, TransactionDetails};

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// The request was abandoned locally.
    #[error("Request cancelled")]
    Cancelled,

    #[error("Gateway returned {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Url(#[from] url::ParseError),
}

impl GatewayError {
    pub fn is_user_visible(&self) -> bool {
        !matches!(self, GatewayError::Cancelled)
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, GatewayError::Status { status, .. } if *status == StatusCode::NOT_FOUND)
    }
}

/// Identifies a transaction on the gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TxRef {
    Id(String),
    SafeTxHash(B256),
}

impl fmt::Display for TxRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TxRef::Id(id) => f.write_str(id),
            TxRef::SafeTxHash(hash) => write!(f, "{hash}"),
        }
    }
}

#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
#[async_trait]
pub trait ClientGateway: Send + Sync {
    async fn transaction_details(
        &self,
        tx: TxRef,
        chain_id: u64,
    ) -> Result<TransactionDetails, GatewayError>;

    async fn safe_info(&self, safe: Address, chain_id: u64) -> Result<SafeInfo, GatewayError>;

    async fn confirm(
        &self,
        safe_tx_hash: B256,
        signature: SafeSignature,
        chain_id: u64,
    ) -> Result<(), GatewayError>;
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ConfirmationBody {
    signed_safe_tx_hash: String,
}

/// [ClientGateway] over the Safe client gateway HTTP API.
#[derive(Debug, Clone)]
pub struct HttpGateway {
    client: Client,
    base_url: Url,
}

impl HttpGateway {
    pub fn new(base_url: &str) -> Result<Self, GatewayError> {
        let client = Client::builder().user_agent(safe_version::VERSION).build()?;
        Self::with_client(client, base_url)
    }

    pub fn with_client(client: Client, base_url: &str) -> Result<Self, GatewayError> {
        let mut base_url = Url::parse(base_url)?;
        // Endpoints are joined relative to the base, which drops a last segment without a slash.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Ok(Self { client, base_url })
    }

    fn url(&self, path: &str) -> Result<Url, GatewayError> {
        Ok(self.base_url.join(path)?)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, GatewayError> {
        let url = self.url(path)?;
        trace!(target: "gateway", %url, "GET");

        let response = self.client.get(url).send().await?;
        Ok(check_status(response).await?.json().await?)
    }
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, GatewayError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(GatewayError::Status { status, body })
}

#[async_trait]
impl ClientGateway for HttpGateway {
    async fn transaction_details(
        &self,
        tx: TxRef,
        chain_id: u64,
    ) -> Result<TransactionDetails, GatewayError> {
        self.get(&format!("v1/chains/{chain_id}/transactions/{tx}")).await
    }

    async fn safe_info(&self, safe: Address, chain_id: u64) -> Result<SafeInfo, GatewayError> {
        self.get(&format!("v1/chains/{chain_id}/safes/{safe}")).await
    }

    async fn confirm(
        &self,
        safe_tx_hash: B256,
        signature: SafeSignature,
        chain_id: u64,
    ) -> Result<(), GatewayError> {
        let url =
            self.url(&format!("v1/chains/{chain_id}/transactions/{safe_tx_hash}/confirmations"))?;
        let body = ConfirmationBody { signed_safe_tx_hash: signature.to_hex() };

        debug!(target: "gateway", %safe_tx_hash, chain_id, "submitting confirmation");

        let response = self.client.post(url).json(&body).send().await?;
        check_status(response).await?;

        Ok(())
    }
}
