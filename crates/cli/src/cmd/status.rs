use clap::Parser;
use colored::Colorize;
use safe_cli_runner::CliContext;
use safe_multisig::{
    status::{Action, TransactionActions},
    ConfirmationState, TransactionStatus, TxRef,
};

use super::common::{GatewayOpts, KeyOpts};
use crate::utils::{parse_tx_ref, print_loading_until_async};

#[derive(Debug, Parser)]
#[clap(about = "Show the confirmation state of a multisig transaction.")]
pub struct StatusCommand {
    #[arg(
        value_name = "TX",
        value_parser = parse_tx_ref,
        help = "Safe transaction hash or client gateway transaction id."
    )]
    tx: TxRef,

    #[clap(flatten)]
    gateway: GatewayOpts,

    #[clap(flatten)]
    keys: KeyOpts,
}

impl StatusCommand {
    pub async fn execute(self, _ctx: CliContext) -> eyre::Result<()> {
        let client = self.gateway.client()?;
        let keys = self.keys.registry()?;

        let status =
            print_loading_until_async("Fetching transaction", client.status(self.tx, &keys))
                .await?;
        print_status(&status);

        Ok(())
    }
}

fn print_status(status: &TransactionStatus) {
    let TransactionStatus { details, safe, state, actions, can_execute } = status;

    println!("{} {}", "Safe:".bright_cyan(), safe.address);
    println!("{} {}", "Transaction:".bright_cyan(), details.tx_id);
    println!("{} {}", "State:".bright_cyan(), describe_state(*state));

    if let Some(info) = details.multisig_info() {
        println!("{} {}", "Safe tx hash:".bright_cyan(), info.safe_tx_hash);
        println!("{} {} (Safe is at {})", "Nonce:".bright_cyan(), info.nonce, safe.nonce);
        println!(
            "{} {}/{}",
            "Confirmations:".bright_cyan(),
            info.confirmations.len(),
            info.confirmations_required
        );

        for signer in &info.signers {
            let mark = if info.has_confirmed(*signer) {
                "confirmed".green()
            } else if info.has_rejected(*signer) {
                "rejected".red()
            } else {
                "pending".yellow()
            };
            println!("  {signer} {mark}");
        }
    }

    print_actions(actions);
    if *can_execute {
        println!("{}", "One of your keys can execute this transaction.".bright_green());
    }
}

fn print_actions(actions: &TransactionActions) {
    let actions = [
        ("confirm", actions.confirm),
        ("reject", actions.reject),
        ("execute", actions.execute),
    ];
    let line: Vec<_> = actions
        .into_iter()
        .filter_map(|(name, action)| match action {
            Action::Hidden => None,
            Action::Disabled => Some(name.dimmed().to_string()),
            Action::Enabled => Some(name.bright_green().to_string()),
        })
        .collect();

    if !line.is_empty() {
        println!("{} {}", "Actions:".bright_cyan(), line.join(", "));
    }
}

pub fn describe_state(state: ConfirmationState) -> &'static str {
    match state {
        ConfirmationState::AwaitingConfirmations => "awaiting confirmations",
        ConfirmationState::AwaitingYourConfirmation => "awaiting your confirmation",
        ConfirmationState::AwaitingExecution => "awaiting execution",
        ConfirmationState::Rejected => "rejected",
        ConfirmationState::Success => "executed",
        ConfirmationState::Failed => "failed",
        ConfirmationState::Canceled => "cancelled",
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn accepts_hash_and_id() {
        let command = StatusCommand::try_parse_from([
            "status",
            "0xae4eb236285fcdf8ed9fbf4311d7b26673be6f824eb51f2a290580cf048bcffd",
            "--chain-id",
            "100",
        ])
        .unwrap();
        assert!(matches!(command.tx, TxRef::SafeTxHash(_)));
        assert_eq!(command.gateway.chain_id, 100);

        let command = StatusCommand::try_parse_from(["status", "multisig_0x12_0x34"]).unwrap();
        assert!(matches!(command.tx, TxRef::Id(_)));
        assert_eq!(command.gateway.chain_id, 1);
    }
}
