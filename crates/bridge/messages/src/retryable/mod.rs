//! L1 -> L2 retryable tickets.

mod reader;
pub use reader::{L1ToL2MessageReader, RedeemResult};

mod writer;
pub use writer::L1ToL2MessageWriter;

mod classic;
pub use classic::ClassicL1ToL2MessageReader;

use crate::{BridgeProvider, MessageHandle};
use alloy_primitives::{Address, U256};
use arb_primitives::{ArbitrumNetwork, RetryableMessageParams};
use core::ops::Deref;

/// A nitro retryable ticket, read-only or bound to a signer.
#[derive(Debug, Clone)]
pub enum L1ToL2Message<P> {
    /// Status queries only.
    Reader(L1ToL2MessageReader<P>),
    /// Status queries and actions.
    Writer(L1ToL2MessageWriter<P>),
}

impl<P: BridgeProvider + Clone> L1ToL2Message<P> {
    /// Builds the ticket from the fields of its `MessageDelivered` and `InboxMessageDelivered`
    /// events. The variant follows the capability of `handle`.
    pub fn from_event_components(
        handle: MessageHandle<P>,
        network: &ArbitrumNetwork,
        sender: Address,
        message_number: U256,
        l1_base_fee: U256,
        params: RetryableMessageParams,
    ) -> Self {
        match handle {
            MessageHandle::Reader(provider) => Self::Reader(L1ToL2MessageReader::new(
                provider,
                network,
                sender,
                message_number,
                l1_base_fee,
                params,
            )),
            MessageHandle::Writer { provider, signer } => {
                let reader = L1ToL2MessageReader::new(
                    provider,
                    network,
                    sender,
                    message_number,
                    l1_base_fee,
                    params,
                );
                Self::Writer(L1ToL2MessageWriter::new(reader, signer))
            }
        }
    }

    /// Returns the writer, if the ticket is bound to a signer.
    pub const fn writer(&self) -> Option<&L1ToL2MessageWriter<P>> {
        match self {
            Self::Reader(_) => None,
            Self::Writer(writer) => Some(writer),
        }
    }
}

impl<P> Deref for L1ToL2Message<P>
where
    P: BridgeProvider + Clone,
{
    type Target = L1ToL2MessageReader<P>;

    fn deref(&self) -> &Self::Target {
        match self {
            Self::Reader(reader) => reader,
            Self::Writer(writer) => writer.reader(),
        }
    }
}
