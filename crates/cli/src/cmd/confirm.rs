use std::{fmt, str::FromStr};

use alloy_signer_local::PrivateKeySigner;
use clap::Parser;
use colored::Colorize;
use eyre::WrapErr;
use safe_cli_runner::CliContext;
use safe_multisig::{
    signer::MemoryKeyStore, Backends, KeyInfo, KeyType, SigningOutcome, StaticKeyRegistry, TxRef,
};
use tracing::info;
use zeroize::Zeroizing;

use super::common::GatewayOpts;
use crate::utils::{parse_tx_ref, print_loading_until_async};

#[derive(Parser)]
#[clap(about = "Sign a pending multisig transaction and submit the confirmation.")]
pub struct ConfirmCommand {
    #[arg(
        value_name = "TX",
        value_parser = parse_tx_ref,
        help = "Safe transaction hash or client gateway transaction id."
    )]
    tx: TxRef,

    #[arg(
        long,
        value_name = "HEX",
        env = "SAFE_PRIVATE_KEY",
        hide_env_values = true,
        help = "Private key of the owner confirming the transaction."
    )]
    private_key: String,

    #[clap(flatten)]
    gateway: GatewayOpts,
}

impl fmt::Debug for ConfirmCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfirmCommand")
            .field("tx", &self.tx)
            .field("private_key", &"<redacted>")
            .field("gateway", &self.gateway)
            .finish()
    }
}

impl ConfirmCommand {
    pub async fn execute(self, ctx: CliContext) -> eyre::Result<()> {
        let Self { tx, private_key, gateway } = self;

        let signer = {
            let private_key = Zeroizing::new(private_key);
            PrivateKeySigner::from_str(private_key.trim()).wrap_err("Invalid private key")?
        };

        let mut store = MemoryKeyStore::default();
        let address = store.insert(signer);
        info!(%address, "imported owner key");

        let keys = StaticKeyRegistry::new(vec![KeyInfo {
            name: "imported".to_string(),
            address,
            key_type: KeyType::DeviceImported,
        }]);
        let backends = Backends { key_store: Some(&store), ..Default::default() };

        let client = gateway.client()?;
        let outcome = print_loading_until_async(
            "Confirming transaction",
            client.confirm_transaction(tx, &keys, &backends, &ctx.cancellation),
        )
        .await?;

        match outcome {
            SigningOutcome::Confirmed(signature) => {
                println!("{}", format!("Confirmed by {address}").bright_green());
                println!("{}", signature.to_hex());
            }
            SigningOutcome::Declined => println!("{}", "Signing was declined".yellow()),
            SigningOutcome::Cancelled => println!("{}", "Signing was cancelled".yellow()),
        }

        Ok(())
    }
}
