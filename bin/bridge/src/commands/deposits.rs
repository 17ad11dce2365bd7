//! Deposits Subcommand

use crate::flags::GlobalArgs;
use alloy_primitives::B256;
use anyhow::Context;
use arb_messages::{BridgeProvider, L1TransactionReceipt};
use clap::Parser;

/// The `deposits` Subcommand
///
/// Lists the ETH deposits made by a parent chain transaction and whether they were credited.
///
/// # Usage
///
/// ```sh
/// arb-bridge deposits <L1_TX> --l1-rpc <URL> --l2-rpc <URL> [--wait]
/// ```
#[derive(Parser, Debug, Clone)]
pub(crate) struct DepositsCommand {
    /// Hash of the parent chain transaction.
    pub(crate) tx: B256,
    /// Waits for every deposit to be credited.
    #[arg(long)]
    pub(crate) wait: bool,
    /// Confirmations required on the Arbitrum chain.
    #[arg(long)]
    pub(crate) confirmations: Option<u64>,
}

impl DepositsCommand {
    /// Runs the subcommand.
    pub(crate) async fn run(self, args: &GlobalArgs) -> anyhow::Result<()> {
        let network = args.network()?;
        let l1 = args.l1_provider()?;
        let l2 = args.l2_provider()?;
        let receipt = l1
            .transaction_receipt(self.tx)
            .await?
            .with_context(|| format!("transaction {} not found", self.tx))?;
        let receipt = L1TransactionReceipt::from(receipt);

        if self.wait {
            let results = receipt
                .wait_for_eth_deposits(l2, &network, self.confirmations, &args.poll_config())
                .await?;
            for result in results {
                println!(
                    "deposit {} to {} value {} complete {}",
                    result.message.l2_deposit_tx_hash(),
                    result.message.to(),
                    result.message.value(),
                    result.complete,
                );
            }
            return Ok(());
        }

        for deposit in receipt.get_eth_deposits(l2, &network)? {
            println!(
                "deposit {} to {} value {} {}",
                deposit.l2_deposit_tx_hash(),
                deposit.to(),
                deposit.value(),
                deposit.status().await?,
            );
        }
        Ok(())
    }
}
