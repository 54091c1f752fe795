use alloy_primitives::Address;
use clap::{Parser, Subcommand};
use colored::Colorize;
use safe_cli_runner::CliContext;
use safe_ens::Ens;

use super::common::RpcOpts;
use crate::utils::{parse_address_arg, print_loading_until_async};

#[derive(Debug, Subcommand)]
pub enum EnsCommands {
    #[command(name = "resolve")]
    Resolve(ResolveCommand),

    #[command(name = "lookup")]
    Lookup(LookupCommand),
}

#[derive(Debug, Parser)]
#[clap(about = "Resolve an ENS name to an address.")]
pub struct ResolveCommand {
    #[arg(value_name = "NAME")]
    name: String,

    #[clap(flatten)]
    rpc: RpcOpts,
}

impl ResolveCommand {
    pub async fn execute(self, _ctx: CliContext) -> eyre::Result<()> {
        let ens = Ens::mainnet(self.rpc.transport().await?);

        let address =
            print_loading_until_async("Resolving name", ens.resolve_address(&self.name)).await?;
        println!("{address}");

        Ok(())
    }
}

#[derive(Debug, Parser)]
#[clap(about = "Look up the primary ENS name of an address.")]
pub struct LookupCommand {
    #[arg(value_name = "ADDRESS", value_parser = parse_address_arg)]
    address: Address,

    #[clap(flatten)]
    rpc: RpcOpts,
}

impl LookupCommand {
    pub async fn execute(self, _ctx: CliContext) -> eyre::Result<()> {
        let ens = Ens::mainnet(self.rpc.transport().await?);

        match print_loading_until_async("Looking up name", ens.resolve_name(self.address)).await {
            Some(name) => println!("{name}"),
            None => println!("{}", format!("No primary name for {}", self.address).yellow()),
        }

        Ok(())
    }
}
