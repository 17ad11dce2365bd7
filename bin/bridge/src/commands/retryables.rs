//! Retryables Subcommand

use crate::flags::GlobalArgs;
use alloy_primitives::B256;
use anyhow::Context;
use arb_messages::{
    BridgeProvider, ChildMessages, L1ToL2MessageReader, L1TransactionReceipt, MessageError,
    MessageHandle,
};
use arb_primitives::L1ToL2MessageStatus;
use clap::Parser;

/// The `retryables` Subcommand
///
/// Lists the retryable tickets created by a parent chain transaction and their status on the
/// Arbitrum chain.
///
/// # Usage
///
/// ```sh
/// arb-bridge retryables <L1_TX> --l1-rpc <URL> --l2-rpc <URL> [--wait]
/// ```
#[derive(Parser, Debug, Clone)]
pub(crate) struct RetryablesCommand {
    /// Hash of the parent chain transaction.
    pub(crate) tx: B256,
    /// Waits for every nitro ticket to be resolved.
    #[arg(long)]
    pub(crate) wait: bool,
    /// Confirmations required on the Arbitrum chain.
    #[arg(long)]
    pub(crate) confirmations: Option<u64>,
}

impl RetryablesCommand {
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
                .wait_for_l2(
                    MessageHandle::reader(l2),
                    &network,
                    self.confirmations,
                    &args.poll_config(),
                )
                .await?;
            for result in results {
                println!(
                    "ticket {} {} redeem {}",
                    result.message.retryable_creation_id(),
                    result.status,
                    result
                        .l2_tx_receipt
                        .map_or_else(|| "-".to_string(), |r| r.transaction_hash.to_string()),
                );
            }
            return Ok(());
        }

        match receipt.child_messages(MessageHandle::reader(l2), &network)? {
            ChildMessages::Classic(messages) => {
                for message in messages {
                    println!(
                        "classic ticket {} {}",
                        message.retryable_creation_id(),
                        message.status().await?
                    );
                }
            }
            ChildMessages::Nitro(messages) => {
                for message in messages {
                    println!("{}", describe_ticket(&*message).await?);
                }
            }
        }
        Ok(())
    }
}

/// Formats the status of a nitro ticket.
///
/// Only live tickets have a timeout. `getTimeout` reverts once a ticket is redeemed, expired or
/// before it is created.
async fn describe_ticket<P: BridgeProvider + Clone>(
    message: &L1ToL2MessageReader<P>,
) -> Result<String, MessageError> {
    let status = message.status().await?;
    let timeout = match status {
        L1ToL2MessageStatus::FundsDepositedOnL2 => message.get_timeout().await?.to_string(),
        _ => "-".to_string(),
    };
    Ok(format!("ticket {} {status} timeout {timeout}", message.retryable_creation_id()))
}
