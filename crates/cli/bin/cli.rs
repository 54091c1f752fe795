use clap::{
    builder::{styling::AnsiColor, Styles},
    Parser, Subcommand,
};
use safe_cli::{
    cmd::{
        confirm::ConfirmCommand, ens::EnsCommands, namehash::NamehashCommand,
        status::StatusCommand, tx_hash::TxHashCommand,
    },
    utils::init_tracing,
};
use safe_cli_runner::CliRunner;
use safe_version::SHORT_VERSION;

#[derive(Debug, Parser)]
#[command(
    name = "safe-signer",
    about = "Hash, inspect and confirm Safe multisig transactions.",
    version = SHORT_VERSION.as_str(),
    term_width = 80,
    styles = get_color_style()
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(long, global = true, help = "Enable debug logging")]
    pub debug: bool,
}

impl Cli {
    pub fn run(self) -> eyre::Result<()> {
        init_tracing(self.debug)?;

        let runner = CliRunner::try_default_runtime()?;
        match self.command {
            Commands::TxHash(tx_hash) => runner.run_command_until_exit(|ctx| tx_hash.execute(ctx)),
            Commands::Namehash(namehash) => {
                runner.run_command_until_exit(|ctx| namehash.execute(ctx))
            }
            Commands::Ens(ens) => match ens {
                EnsCommands::Resolve(resolve) => {
                    runner.run_command_until_exit(|ctx| resolve.execute(ctx))
                }
                EnsCommands::Lookup(lookup) => {
                    runner.run_command_until_exit(|ctx| lookup.execute(ctx))
                }
            },
            Commands::Status(status) => runner.run_command_until_exit(|ctx| status.execute(ctx)),
            Commands::Confirm(confirm) => {
                runner.run_command_until_exit(|ctx| confirm.execute(ctx))
            }
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    #[command(name = "tx-hash")]
    TxHash(TxHashCommand),

    #[command(name = "namehash")]
    Namehash(NamehashCommand),

    #[command(name = "ens", subcommand)]
    Ens(EnsCommands),

    #[command(name = "status")]
    Status(StatusCommand),

    #[command(name = "confirm")]
    Confirm(ConfirmCommand),
}

fn get_color_style() -> Styles {
    Styles::styled()
        .usage(AnsiColor::Green.on_default().bold().underline())
        .header(AnsiColor::Yellow.on_default().bold().underline())
        .literal(AnsiColor::Green.on_default())
        .placeholder(AnsiColor::Green.on_default())
}
