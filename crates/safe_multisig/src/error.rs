use alloy_primitives::{Address, B256};
use safe_ens::EnsError;
use safe_primitives::{rpc::CallError, PrimitiveError};

use crate::{flow::SigningError, gateway::GatewayError, signer::SignerError};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unsupported: {0}")]
    Unsupported(String),

    #[error(transparent)]
    Signer(#[from] SignerError),

    #[error("Signature was produced by {recovered}, expected {expected}")]
    Verification { expected: Address, recovered: Address },

    #[error("Computed safe transaction hash {computed} does not match {expected}")]
    HashMismatch { computed: B256, expected: B256 },

    #[error(transparent)]
    Network(#[from] GatewayError),

    #[error(transparent)]
    Rpc(#[from] CallError),

    #[error(transparent)]
    Signing(#[from] SigningError),
}

impl Error {
    /// Whether the error should be reported to the user. Locally cancelled requests are not.
    pub fn is_user_visible(&self) -> bool {
        match self {
            Error::Network(err) => err.is_user_visible(),
            _ => true,
        }
    }
}

impl From<PrimitiveError> for Error {
    fn from(err: PrimitiveError) -> Self {
        match err {
            PrimitiveError::SignerMismatch { expected, recovered } => {
                Error::Verification { expected, recovered }
            }
            other => Error::InvalidInput(other.to_string()),
        }
    }
}

impl From<EnsError> for Error {
    fn from(err: EnsError) -> Self {
        match err {
            EnsError::InvalidCharacters(_) => Error::InvalidInput(err.to_string()),
            EnsError::NameNotRegistered(_) | EnsError::AddressNotFound(_) => {
                Error::NotFound(err.to_string())
            }
            EnsError::UnsupportedResolver(_) => Error::Unsupported(err.to_string()),
            EnsError::Transport(err) => Error::Rpc(err),
        }
    }
}
