use alloy_primitives::{Bytes, B256};
use async_trait::async_trait;
use safe_primitives::{signature::ETH_SIGN_V_OFFSET, SafeSignature, SignatureKind};
use tracing::debug;

use super::SignerError;

/// What a hardware device answered to a signing request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceResponse {
    pub signature: Option<Bytes>,
    pub error_message: Option<String>,
}

#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
#[async_trait]
pub trait HardwareTransport: Send + Sync {
    /// Asks the device to `eth_sign` the safe transaction hash.
    async fn sign(&self, hash: B256, derivation_path: &str, device_id: &str) -> DeviceResponse;
}

/// Converts a device signature to its canonical form.
///
/// Devices answer in the Safe `eth_sign` encoding, whose type byte is the ECDSA recovery byte
/// plus 4.
pub fn normalize_device_signature(raw: &[u8]) -> Result<SafeSignature, SignerError> {
    let signature = SafeSignature::from_bytes(raw)?;
    if signature.kind != SignatureKind::EthSign {
        return Err(SignerError::Device(format!(
            "Unexpected signature type byte {}, expected {} or {}",
            signature.to_bytes()[64],
            27 + ETH_SIGN_V_OFFSET,
            28 + ETH_SIGN_V_OFFSET
        )));
    }

    Ok(signature)
}

pub struct LedgerSigner<'a> {
    device_id: String,
    derivation_path: String,
    transport: &'a dyn HardwareTransport,
}

impl<'a> LedgerSigner<'a> {
    pub fn new(
        device_id: impl Into<String>,
        derivation_path: impl Into<String>,
        transport: &'a dyn HardwareTransport,
    ) -> Self {
        Self { device_id: device_id.into(), derivation_path: derivation_path.into(), transport }
    }

    pub async fn sign(&self, hash: B256) -> Result<SafeSignature, SignerError> {
        debug!(device_id = %self.device_id, path = %self.derivation_path, %hash, "requesting device signature");

        let response = self.transport.sign(hash, &self.derivation_path, &self.device_id).await;

        if let Some(message) = response.error_message {
            return Err(SignerError::Device(message));
        }

        let raw = response
            .signature
            .ok_or_else(|| SignerError::Device("Device returned no signature".to_string()))?;
        normalize_device_signature(&raw)
    }
}
