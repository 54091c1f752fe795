use clap::Parser;
use safe_cli_runner::CliContext;
use safe_ens::{namehash, normalize};

#[derive(Debug, Parser)]
#[clap(about = "Compute the ENS node of a name.")]
pub struct NamehashCommand {
    #[arg(value_name = "NAME", help = "The name, normalized before hashing.")]
    name: String,
}

impl NamehashCommand {
    pub async fn execute(self, _ctx: CliContext) -> eyre::Result<()> {
        let normalized = normalize(&self.name)?;
        println!("{}", namehash(&normalized));
        Ok(())
    }
}
