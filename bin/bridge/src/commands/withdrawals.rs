//! Withdrawals Subcommand

use crate::flags::GlobalArgs;
use alloy_primitives::B256;
use anyhow::Context;
use arb_messages::{BlockRangeCache, BridgeProvider, L2TransactionReceipt, MessageHandle};
use clap::Parser;

/// The `withdrawals` Subcommand
///
/// Lists the withdrawals sent by an Arbitrum chain transaction, their status, and the first
/// parent chain block they can be executed at.
///
/// # Usage
///
/// ```sh
/// arb-bridge withdrawals <L2_TX> --l1-rpc <URL> --l2-rpc <URL> [--wait]
/// ```
#[derive(Parser, Debug, Clone)]
pub(crate) struct WithdrawalsCommand {
    /// Hash of the Arbitrum chain transaction.
    pub(crate) tx: B256,
    /// Waits for every withdrawal to be executable.
    #[arg(long)]
    pub(crate) wait: bool,
}

impl WithdrawalsCommand {
    /// Runs the subcommand.
    pub(crate) async fn run(self, args: &GlobalArgs) -> anyhow::Result<()> {
        let network = args.network()?;
        let l1 = args.l1_provider()?;
        let l2 = args.l2_provider()?;
        let receipt = l2
            .transaction_receipt(self.tx)
            .await?
            .with_context(|| format!("transaction {} not found", self.tx))?;
        let receipt = L2TransactionReceipt::from(receipt);

        let cache = BlockRangeCache::default();
        let events = receipt.get_l2_to_l1_events()?;
        let messages =
            receipt.get_l2_to_l1_messages(MessageHandle::reader(l1), l2, &network, &cache)?;
        for (event, message) in events.iter().zip(messages) {
            let status = if self.wait {
                message.wait_until_ready_to_execute(&args.poll_config()).await?
            } else {
                message.status().await?
            };
            let executable_at = message
                .get_first_executable_block()
                .await?
                .map_or_else(|| "-".to_string(), |block| block.to_string());
            println!(
                "withdrawal to {} value {} {} executable at {}",
                event.destination(),
                event.callvalue(),
                status,
                executable_at,
            );
        }
        Ok(())
    }
}
