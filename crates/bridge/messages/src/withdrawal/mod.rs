//! L2 -> L1 withdrawals.

mod classic;
pub use classic::{ClassicL2ToL1MessageReader, MessageBatchProofInfo};

mod nitro;
pub use nitro::{NitroL2ToL1MessageReader, SendProps};

mod query;
pub use query::{WithdrawalQuery, get_l2_to_l1_events};

use crate::{
    BlockRangeCache, BridgeProvider, BridgeSigner, MessageError, MessageHandle, PollConfig,
    TxOverrides, TxReceipt, contract::contract_call,
};
use alloy_primitives::{Address, U256};
use arb_bindings::{IArbSys, IOutbox};
use arb_primitives::{ArbitrumNetwork, L2ToL1MessageStatus};
use core::ops::Deref;
use std::sync::Arc;

/// The event recording a withdrawal, in the shape of the era it was sent in.
#[derive(Debug, Clone)]
pub enum WithdrawalEvent {
    /// A withdrawal sent before the nitro upgrade.
    Classic(IArbSys::L2ToL1Transaction),
    /// A withdrawal sent by nitro.
    Nitro(IArbSys::L2ToL1Tx),
}

impl WithdrawalEvent {
    /// The L2 sender.
    pub const fn caller(&self) -> Address {
        match self {
            Self::Classic(event) => event.caller,
            Self::Nitro(event) => event.caller,
        }
    }

    /// The parent chain destination.
    pub const fn destination(&self) -> Address {
        match self {
            Self::Classic(event) => event.destination,
            Self::Nitro(event) => event.destination,
        }
    }

    /// The value withdrawn.
    pub const fn callvalue(&self) -> U256 {
        match self {
            Self::Classic(event) => event.callvalue,
            Self::Nitro(event) => event.callvalue,
        }
    }

    /// Returns `true` for withdrawals sent before the nitro upgrade.
    pub const fn is_classic(&self) -> bool {
        matches!(self, Self::Classic(_))
    }
}

/// Read-only view of a withdrawal.
#[derive(Debug, Clone)]
pub enum L2ToL1MessageReader<P> {
    /// A withdrawal sent before the nitro upgrade.
    Classic(ClassicL2ToL1MessageReader<P>),
    /// A withdrawal sent by nitro.
    Nitro(NitroL2ToL1MessageReader<P>),
}

impl<P: BridgeProvider + Clone> L2ToL1MessageReader<P> {
    /// Creates the reader matching the era of `event`.
    pub fn from_event(
        l1_provider: P,
        l2_provider: P,
        network: &ArbitrumNetwork,
        event: WithdrawalEvent,
        cache: BlockRangeCache,
    ) -> Self {
        match event {
            WithdrawalEvent::Classic(event) => Self::Classic(ClassicL2ToL1MessageReader::new(
                l1_provider,
                l2_provider,
                network,
                event.batchNumber,
                event.indexInBatch,
            )),
            WithdrawalEvent::Nitro(event) => Self::Nitro(NitroL2ToL1MessageReader::new(
                l1_provider,
                l2_provider,
                network,
                event,
                cache,
            )),
        }
    }

    /// Returns the current status of the withdrawal.
    pub async fn status(&self) -> Result<L2ToL1MessageStatus, MessageError> {
        let status = match self {
            Self::Classic(reader) => reader.status().await?,
            Self::Nitro(reader) => reader.status().await?,
        };
        tracing::debug!(target: "l2_to_l1", %status, "resolved withdrawal");
        Ok(status)
    }

    /// Waits until the withdrawal can be executed, or was executed.
    pub async fn wait_until_ready_to_execute(
        &self,
        poll: &PollConfig,
    ) -> Result<L2ToL1MessageStatus, MessageError> {
        match self {
            Self::Classic(reader) => reader.wait_until_outbox_entry_created(poll).await,
            Self::Nitro(reader) => reader.wait_until_ready_to_execute(poll).await,
        }
    }

    /// Estimates the first parent chain block at which the withdrawal can be executed.
    ///
    /// Returns `None` for withdrawals that are already executable, and for classic ones.
    pub async fn get_first_executable_block(&self) -> Result<Option<u64>, MessageError> {
        match self {
            Self::Classic(reader) => Ok(reader.get_first_executable_block()),
            Self::Nitro(reader) => reader.get_first_executable_block().await,
        }
    }
}

/// A withdrawal bound to a signer on the parent chain.
#[derive(Debug, Clone, derive_more::Deref)]
pub struct L2ToL1MessageWriter<P> {
    #[deref]
    reader: L2ToL1MessageReader<P>,
    signer: Arc<dyn BridgeSigner>,
    outbox: Address,
}

impl<P: BridgeProvider + Clone> L2ToL1MessageWriter<P> {
    /// Binds `reader` to `signer`. Nitro withdrawals are executed through the outbox of
    /// `network`.
    pub fn new(
        reader: L2ToL1MessageReader<P>,
        signer: Arc<dyn BridgeSigner>,
        network: &ArbitrumNetwork,
    ) -> Self {
        Self { reader, signer, outbox: network.eth_bridge.outbox }
    }

    /// The underlying reader.
    pub const fn reader(&self) -> &L2ToL1MessageReader<P> {
        &self.reader
    }

    /// Executes the withdrawal on the parent chain.
    ///
    /// The withdrawal must be [`L2ToL1MessageStatus::Confirmed`].
    pub async fn execute(&self, overrides: &TxOverrides) -> Result<TxReceipt, MessageError> {
        let status = self.reader.status().await?;
        if status != L2ToL1MessageStatus::Confirmed {
            return Err(MessageError::UnexpectedWithdrawalStatus {
                expected: L2ToL1MessageStatus::Confirmed,
                actual: status,
            });
        }
        let tx = match &self.reader {
            L2ToL1MessageReader::Classic(reader) => {
                contract_call(reader.outbox_address()?, &reader.execute_call().await?)
            }
            L2ToL1MessageReader::Nitro(reader) => {
                let proof = reader.get_outbox_proof().await?;
                let event = reader.event();
                let call = IOutbox::executeTransactionCall {
                    proof,
                    index: event.position,
                    l2Sender: event.caller,
                    to: event.destination,
                    l2Block: event.arbBlockNum,
                    l1Block: event.ethBlockNum,
                    l2Timestamp: event.timestamp,
                    value: event.callvalue,
                    data: event.data.clone(),
                };
                contract_call(self.outbox, &call)
            }
        };
        let tx = overrides.apply(tx, self.signer.address());
        tracing::info!(target: "l2_to_l1", outbox = ?tx.to, from = ?tx.from, "executing withdrawal");
        Ok(self.signer.send_transaction(tx).await?)
    }
}

/// A withdrawal, read-only or bound to a signer on the parent chain.
#[derive(Debug, Clone)]
pub enum L2ToL1Message<P> {
    /// Status queries only.
    Reader(L2ToL1MessageReader<P>),
    /// Status queries and execution.
    Writer(L2ToL1MessageWriter<P>),
}

impl<P: BridgeProvider + Clone> L2ToL1Message<P> {
    /// Creates the message for `event`. The variant follows the capability of `parent`.
    pub fn from_event(
        parent: MessageHandle<P>,
        l2_provider: P,
        network: &ArbitrumNetwork,
        event: WithdrawalEvent,
        cache: BlockRangeCache,
    ) -> Self {
        match parent {
            MessageHandle::Reader(l1_provider) => Self::Reader(L2ToL1MessageReader::from_event(
                l1_provider,
                l2_provider,
                network,
                event,
                cache,
            )),
            MessageHandle::Writer { provider, signer } => {
                let reader =
                    L2ToL1MessageReader::from_event(provider, l2_provider, network, event, cache);
                Self::Writer(L2ToL1MessageWriter::new(reader, signer, network))
            }
        }
    }

    /// Returns the writer, if the message is bound to a signer.
    pub const fn writer(&self) -> Option<&L2ToL1MessageWriter<P>> {
        match self {
            Self::Reader(_) => None,
            Self::Writer(writer) => Some(writer),
        }
    }
}

impl<P: BridgeProvider + Clone> Deref for L2ToL1Message<P> {
    type Target = L2ToL1MessageReader<P>;

    fn deref(&self) -> &Self::Target {
        match self {
            Self::Reader(reader) => reader,
            Self::Writer(writer) => writer.reader(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        MockBridgeSigner,
        test_utils::{TestBridgeProvider, receipt},
    };
    use alloy_primitives::{B256, Bytes, address};
    use alloy_sol_types::SolCall;
    use arb_primitives::network_by_name;

    fn classic_event() -> IArbSys::L2ToL1Transaction {
        IArbSys::L2ToL1Transaction {
            caller: address!("0x00000000000000000000000000000000000000cc"),
            destination: address!("0x00000000000000000000000000000000000000dd"),
            uniqueId: U256::from(1u64),
            batchNumber: U256::from(classic::tests::BATCH),
            indexInBatch: U256::from(classic::tests::INDEX),
            arbBlockNum: U256::from(100u64),
            ethBlockNum: U256::from(50u64),
            timestamp: U256::from(1_000u64),
            callvalue: U256::from(3u64),
            data: Bytes::new(),
        }
    }

    #[test]
    fn test_dispatch_by_event_shape() {
        let network = network_by_name("arb1").unwrap();
        let provider = TestBridgeProvider::default();
        let classic = L2ToL1Message::from_event(
            MessageHandle::reader(provider.clone()),
            provider.clone(),
            network,
            WithdrawalEvent::Classic(classic_event()),
            BlockRangeCache::default(),
        );
        assert!(matches!(&*classic, L2ToL1MessageReader::Classic(r) if r.batch_number() == U256::from(40u64)));
        assert!(classic.writer().is_none());

        let nitro = WithdrawalEvent::Nitro(nitro::tests::withdrawal(3));
        assert!(!nitro.is_classic());
        assert_eq!(nitro.callvalue(), U256::from(7u64));
        let nitro = L2ToL1Message::from_event(
            MessageHandle::writer(provider.clone(), Arc::new(MockBridgeSigner::new())),
            provider,
            network,
            nitro,
            BlockRangeCache::default(),
        );
        assert!(matches!(&*nitro, L2ToL1MessageReader::Nitro(r) if r.position() == U256::from(3u64)));
        assert!(nitro.writer().is_some());
    }

    #[tokio::test]
    async fn test_execute_requires_confirmed() {
        let rollup = nitro::tests::Rollup::new();
        rollup.add_node(1, 100, 10, 200);
        rollup.set_nodes(1, 1);
        rollup.set_spent(true);

        let mut signer = MockBridgeSigner::new();
        signer.expect_send_transaction().never();
        let reader = L2ToL1MessageReader::from_event(
            rollup.l1.clone(),
            rollup.l2.clone(),
            &rollup.network,
            WithdrawalEvent::Nitro(nitro::tests::withdrawal(3)),
            BlockRangeCache::default(),
        );
        let writer = L2ToL1MessageWriter::new(reader, Arc::new(signer), &rollup.network);
        let err = writer.execute(&TxOverrides::default()).await.unwrap_err();
        assert!(matches!(
            err,
            MessageError::UnexpectedWithdrawalStatus {
                expected: L2ToL1MessageStatus::Confirmed,
                actual: L2ToL1MessageStatus::Executed,
            }
        ));
    }

    #[tokio::test]
    async fn test_execute_nitro_withdrawal() {
        let rollup = nitro::tests::Rollup::new();
        rollup.add_node(1, 100, 10, 200);
        rollup.set_nodes(1, 1);
        rollup.set_spent(false);
        rollup.l2.on_call::<arb_bindings::INodeInterface::constructOutboxProofCall>(
            arb_bindings::addresses::NODE_INTERFACE,
            &arb_bindings::INodeInterface::constructOutboxProofReturn {
                send: B256::ZERO,
                root: B256::ZERO,
                proof: vec![B256::repeat_byte(5)],
            },
        );

        let outbox = rollup.network.eth_bridge.outbox;
        let from = address!("0x1111111111111111111111111111111111111111");
        let mut signer = MockBridgeSigner::new();
        signer.expect_address().return_const(from);
        signer
            .expect_send_transaction()
            .withf(move |tx| {
                let call = tx
                    .input
                    .input()
                    .and_then(|input| IOutbox::executeTransactionCall::abi_decode(input).ok());
                tx.from == Some(from) &&
                    tx.to.and_then(|kind| kind.to().copied()) == Some(outbox) &&
                    call.is_some_and(|call| {
                        call.index == U256::from(3u64) && call.proof == vec![B256::repeat_byte(5)]
                    })
            })
            .times(1)
            .returning(|_| Ok(receipt(B256::repeat_byte(9), 1_001, true, vec![])));

        let message = L2ToL1Message::from_event(
            MessageHandle::writer(rollup.l1.clone(), Arc::new(signer)),
            rollup.l2.clone(),
            &rollup.network,
            WithdrawalEvent::Nitro(nitro::tests::withdrawal(3)),
            BlockRangeCache::default(),
        );
        let writer = message.writer().unwrap();
        let receipt = writer.execute(&TxOverrides::default()).await.unwrap();
        assert_eq!(receipt.transaction_hash, B256::repeat_byte(9));
    }

    #[tokio::test]
    async fn test_execute_classic_withdrawal() {
        let (l1, l2) = classic::tests::classic_chain(true, Some("NO_OUTBOX_ENTRY"), true);
        let network = network_by_name("arb1").unwrap();
        let outbox = network.classic_outbox_for_batch(U256::from(classic::tests::BATCH)).unwrap();

        let mut signer = MockBridgeSigner::new();
        signer.expect_address().return_const(Address::ZERO);
        signer
            .expect_send_transaction()
            .withf(move |tx| tx.to.and_then(|kind| kind.to().copied()) == Some(outbox))
            .times(1)
            .returning(|_| Ok(receipt(B256::repeat_byte(8), 5, true, vec![])));

        let reader = L2ToL1MessageReader::from_event(
            l1,
            l2,
            network,
            WithdrawalEvent::Classic(classic_event()),
            BlockRangeCache::default(),
        );
        assert_eq!(reader.status().await.unwrap(), L2ToL1MessageStatus::Confirmed);
        assert_eq!(reader.get_first_executable_block().await.unwrap(), None);
        let writer = L2ToL1MessageWriter::new(reader, Arc::new(signer), network);
        assert!(writer.execute(&TxOverrides::default()).await.is_ok());
    }
}
