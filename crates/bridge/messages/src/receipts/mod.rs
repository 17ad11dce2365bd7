//! Receipt wrappers exposing the bridge messages a transaction created.

mod l1;
pub use l1::{ChildMessages, EthDepositWaitResult, L1TransactionReceipt, L1ToL2WaitResult, MessageEvents};

mod l2;
pub use l2::{L2TransactionReceipt, RedeemTransaction};

use crate::{BridgeProvider, ProviderError, TxReceipt};
use alloy_primitives::B256;

/// Looks up a receipt, optionally requiring `confirmations` blocks on top of it.
///
/// A receipt without enough confirmations is reported as absent. Without a confirmation
/// requirement, transport failures are also reported as absent so that callers keep polling.
pub(crate) async fn get_transaction_receipt<P>(
    provider: &P,
    hash: B256,
    confirmations: Option<u64>,
) -> Result<Option<TxReceipt>, ProviderError>
where
    P: BridgeProvider + ?Sized,
{
    let receipt = match provider.transaction_receipt(hash).await {
        Ok(receipt) => receipt,
        Err(err) if confirmations.is_none() && err.is_transport() => {
            tracing::debug!(target: "event_fetcher", tx = %hash, %err, "receipt lookup failed");
            return Ok(None);
        }
        Err(err) => return Err(err),
    };
    let Some(receipt) = receipt else { return Ok(None) };
    if let Some(confirmations) = confirmations {
        let head = provider.block_number().await?;
        if head.saturating_sub(receipt.block_number) < confirmations {
            return Ok(None);
        }
    }
    Ok(Some(receipt))
}
