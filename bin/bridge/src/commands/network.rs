//! Network Subcommand

use crate::flags::GlobalArgs;
use clap::Parser;

/// The `network` Subcommand
///
/// Prints the network configuration the other subcommands resolve messages against.
///
/// # Usage
///
/// ```sh
/// arb-bridge network --network sepolia
/// ```
#[derive(Parser, Debug, Clone)]
pub(crate) struct NetworkCommand {}

impl NetworkCommand {
    /// Runs the subcommand.
    pub(crate) fn run(self, args: &GlobalArgs) -> anyhow::Result<()> {
        let network = args.network()?;
        println!("{}", serde_json::to_string_pretty(&network)?);
        Ok(())
    }
}
