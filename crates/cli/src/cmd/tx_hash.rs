use alloy_primitives::{Address, Bytes, U256};
use clap::Parser;
use colored::Colorize;
use safe_cli_runner::CliContext;
use safe_multisig::{
    hasher, transaction_data::OperationType, SafeTransactionData, SafeVersion, Transaction,
};

use crate::utils::{parse_address_arg, parse_bytes_arg};

#[derive(Debug, Parser)]
#[clap(about = "Compute the safe transaction hash the owners sign.")]
pub struct TxHashCommand {
    #[arg(long, value_name = "ADDRESS", value_parser = parse_address_arg, help = "The Safe.")]
    safe: Address,

    #[arg(long, value_name = "CHAIN_ID", default_value = "1")]
    chain_id: u64,

    #[arg(
        long,
        value_name = "VERSION",
        default_value = "1.3.0",
        help = "Master copy version of the Safe, selects the hash encoding."
    )]
    safe_version: SafeVersion,

    #[arg(long, value_name = "NONCE", help = "The Safe nonce the transaction is proposed for.")]
    nonce: U256,

    #[arg(
        long,
        help = "Hash the rejection of whatever occupies the nonce instead.",
        conflicts_with_all = ["to", "value", "data", "operation"]
    )]
    rejection: bool,

    #[arg(long, value_name = "ADDRESS", value_parser = parse_address_arg, required_unless_present = "rejection")]
    to: Option<Address>,

    #[arg(long, value_name = "WEI", default_value = "0")]
    value: U256,

    #[arg(long, value_name = "HEX", default_value = "0x", value_parser = parse_bytes_arg)]
    data: Bytes,

    #[arg(long, value_name = "OPERATION", default_value = "0", help = "0 for call, 1 for delegatecall.")]
    operation: u8,

    #[arg(long, default_value = "0")]
    safe_tx_gas: U256,

    #[arg(long, default_value = "0")]
    base_gas: U256,

    #[arg(long, default_value = "0")]
    gas_price: U256,

    #[arg(long, value_name = "ADDRESS", value_parser = parse_address_arg)]
    gas_token: Option<Address>,

    #[arg(long, value_name = "ADDRESS", value_parser = parse_address_arg)]
    refund_receiver: Option<Address>,

    #[arg(long, help = "Also print the EIP-712 typed data a wallet would sign.")]
    typed_data: bool,
}

impl TxHashCommand {
    pub async fn execute(self, _ctx: CliContext) -> eyre::Result<()> {
        let tx = self.transaction()?;
        let hash = tx.safe_tx_hash();

        println!("{}", format!("Safe transaction hash ({} layout)", describe(&tx)).bright_cyan());
        println!("{hash}");

        if self.typed_data {
            let typed_data = hasher::eip712_typed_data(&tx);
            println!("{}", serde_json::to_string_pretty(&typed_data)?);
        }

        Ok(())
    }

    fn transaction(&self) -> eyre::Result<Transaction> {
        if self.rejection {
            return Ok(Transaction::rejection(
                self.safe,
                self.chain_id,
                self.safe_version.clone(),
                self.nonce,
            ));
        }

        let Some(to) = self.to else {
            eyre::bail!("--to is required unless --rejection is set");
        };
        let safe_tx = SafeTransactionData {
            to,
            value: self.value,
            data: self.data.clone(),
            operation: OperationType::try_from(self.operation)?,
            safe_tx_gas: self.safe_tx_gas,
            base_gas: self.base_gas,
            gas_price: self.gas_price,
            gas_token: self.gas_token.unwrap_or(Address::ZERO),
            refund_receiver: self.refund_receiver.unwrap_or(Address::ZERO),
            nonce: self.nonce,
        };

        Ok(Transaction::new(self.safe, self.chain_id, self.safe_version.clone(), safe_tx))
    }
}

fn describe(tx: &Transaction) -> String {
    if tx.safe_version.layout().includes_chain_id() {
        format!("v{}, chain {}", tx.safe_version, tx.chain_id)
    } else {
        format!("v{}", tx.safe_version)
    }
}
