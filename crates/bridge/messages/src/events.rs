//! Fetching and decoding of contract events.

use crate::{BridgeProvider, ProviderError};
use alloy_eips::BlockNumberOrTag;
use alloy_primitives::{Address, B256, Bytes};
use alloy_rpc_types_eth::{Filter, Log};
use alloy_sol_types::SolEvent;

/// A decoded event together with the metadata of the log it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedEvent<E> {
    /// The decoded event.
    pub event: E,
    /// The emitting contract.
    pub address: Address,
    /// The raw topics.
    pub topics: Vec<B256>,
    /// The raw data.
    pub data: Bytes,
    /// Number of the block the log was emitted in.
    pub block_number: u64,
    /// Hash of the block the log was emitted in.
    pub block_hash: B256,
    /// Hash of the emitting transaction.
    pub transaction_hash: B256,
    /// Index of the log in its block.
    pub log_index: u64,
}

impl<E> FetchedEvent<E> {
    /// Maps the decoded event, keeping the metadata.
    pub fn map<F, T>(self, f: F) -> FetchedEvent<T>
    where
        F: FnOnce(E) -> T,
    {
        FetchedEvent {
            event: f(self.event),
            address: self.address,
            topics: self.topics,
            data: self.data,
            block_number: self.block_number,
            block_hash: self.block_hash,
            transaction_hash: self.transaction_hash,
            log_index: self.log_index,
        }
    }
}

/// Decodes the logs in `logs` emitted as `E`, optionally only from `address`.
///
/// Logs of other events are skipped. A log carrying the signature of `E` that fails to decode is
/// an error.
pub fn parse_typed_logs<E: SolEvent>(
    logs: &[Log],
    address: Option<Address>,
) -> Result<Vec<E>, ProviderError> {
    logs.iter()
        .filter(|log| is_event::<E>(log, address))
        .map(|log| decode::<E>(log))
        .collect()
}

fn is_event<E: SolEvent>(log: &Log, address: Option<Address>) -> bool {
    log.topics().first() == Some(&E::SIGNATURE_HASH) &&
        address.is_none_or(|address| log.address() == address)
}

fn decode<E: SolEvent>(log: &Log) -> Result<E, ProviderError> {
    E::decode_log_data(log.data())
        .map_err(|e| ProviderError::Decode(format!("{}: {e}", E::SIGNATURE)))
}

/// Indexed argument filters of an event query.
///
/// Topics are addressed by position, `topic1` being the first indexed argument.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EventFilter {
    /// The emitting contract, any contract if `None`.
    pub address: Option<Address>,
    /// Filters on the indexed arguments.
    pub topics: [Option<B256>; 3],
    /// First block of the range.
    pub from_block: BlockNumberOrTag,
    /// Last block of the range.
    pub to_block: BlockNumberOrTag,
}

impl EventFilter {
    /// Creates a filter over a block range.
    pub fn new(from_block: impl Into<BlockNumberOrTag>, to_block: impl Into<BlockNumberOrTag>) -> Self {
        Self { from_block: from_block.into(), to_block: to_block.into(), ..Default::default() }
    }

    /// Only matches logs emitted by `address`.
    pub const fn address(mut self, address: Address) -> Self {
        self.address = Some(address);
        self
    }

    /// Filters on the indexed argument at `position` (1-based).
    pub fn topic(mut self, position: usize, value: impl Into<B256>) -> Self {
        if let Some(slot) = position.checked_sub(1).and_then(|i| self.topics.get_mut(i)) {
            *slot = Some(value.into());
        }
        self
    }

    /// Fills the topics not set yet from a positional list.
    ///
    /// Topics set by name win over positional ones.
    pub fn merge_topics(mut self, positional: &[Option<B256>]) -> Self {
        for (slot, topic) in self.topics.iter_mut().zip(positional) {
            if slot.is_none() {
                *slot = *topic;
            }
        }
        self
    }

    /// Builds the RPC filter for event `E`.
    pub fn to_rpc<E: SolEvent>(&self) -> Filter {
        let mut filter = Filter::new()
            .event_signature(E::SIGNATURE_HASH)
            .from_block(self.from_block)
            .to_block(self.to_block);
        if let Some(address) = self.address {
            filter = filter.address(address);
        }
        let [t1, t2, t3] = self.topics;
        if let Some(t) = t1 {
            filter = filter.topic1(t);
        }
        if let Some(t) = t2 {
            filter = filter.topic2(t);
        }
        if let Some(t) = t3 {
            filter = filter.topic3(t);
        }
        filter
    }
}

/// Fetches logs and decodes them into typed events.
#[derive(Debug, Clone)]
pub struct EventFetcher<P> {
    provider: P,
}

impl<P: BridgeProvider> EventFetcher<P> {
    /// Creates a fetcher over `provider`.
    pub const fn new(provider: P) -> Self {
        Self { provider }
    }

    /// Fetches every `E` matching `filter`.
    pub async fn get_events<E: SolEvent>(
        &self,
        filter: &EventFilter,
    ) -> Result<Vec<FetchedEvent<E>>, ProviderError> {
        let logs = self.provider.logs(&filter.to_rpc::<E>()).await?;
        tracing::trace!(
            target: "event_fetcher",
            event = E::SIGNATURE,
            from = %filter.from_block,
            to = %filter.to_block,
            count = logs.len(),
            "fetched logs"
        );
        logs.iter()
            .filter(|log| is_event::<E>(log, filter.address))
            .map(|log| {
                Ok(FetchedEvent {
                    event: decode::<E>(log)?,
                    address: log.address(),
                    topics: log.topics().to_vec(),
                    data: log.data().data.clone(),
                    block_number: log.block_number.unwrap_or_default(),
                    block_hash: log.block_hash.unwrap_or_default(),
                    transaction_hash: log.transaction_hash.unwrap_or_default(),
                    log_index: log.log_index.unwrap_or_default(),
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{TestBridgeProvider, event_log};
    use alloy_primitives::{U256, address, b256};
    use arb_bindings::{IArbRetryableTx, addresses::ARB_RETRYABLE_TX};

    fn lifetime_extended(ticket: B256, timeout: u64) -> IArbRetryableTx::LifetimeExtended {
        IArbRetryableTx::LifetimeExtended { ticketId: ticket, newTimeout: U256::from(timeout) }
    }

    #[test]
    fn test_merge_topics_prefers_named() {
        let named = b256!("0x00000000000000000000000000000000000000000000000000000000000000aa");
        let positional = b256!("0x00000000000000000000000000000000000000000000000000000000000000bb");
        let filter = EventFilter::new(0u64, 10u64)
            .topic(1, named)
            .merge_topics(&[Some(positional), Some(positional)]);
        assert_eq!(filter.topics, [Some(named), Some(positional), None]);
    }

    #[test]
    fn test_topic_position_out_of_range_is_ignored() {
        let filter = EventFilter::default().topic(0, B256::ZERO).topic(4, B256::ZERO);
        assert_eq!(filter.topics, [None; 3]);
    }

    #[test]
    fn test_parse_typed_logs_skips_other_events_and_addresses() {
        let ticket = B256::repeat_byte(1);
        let logs = vec![
            event_log(ARB_RETRYABLE_TX, &lifetime_extended(ticket, 10), 1, B256::ZERO),
            event_log(
                address!("0x0000000000000000000000000000000000000001"),
                &lifetime_extended(ticket, 20),
                1,
                B256::ZERO,
            ),
            event_log(ARB_RETRYABLE_TX, &IArbRetryableTx::Canceled { ticketId: ticket }, 1, B256::ZERO),
        ];
        let parsed =
            parse_typed_logs::<IArbRetryableTx::LifetimeExtended>(&logs, Some(ARB_RETRYABLE_TX))
                .unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].newTimeout, U256::from(10u64));
        assert_eq!(
            parse_typed_logs::<IArbRetryableTx::LifetimeExtended>(&logs, None).unwrap().len(),
            2
        );
    }

    #[tokio::test]
    async fn test_get_events_filters_by_ticket_and_range() {
        let ticket = B256::repeat_byte(1);
        let other = B256::repeat_byte(2);
        let provider = TestBridgeProvider::default();
        provider.add_log(event_log(ARB_RETRYABLE_TX, &lifetime_extended(ticket, 10), 5, B256::ZERO));
        provider.add_log(event_log(ARB_RETRYABLE_TX, &lifetime_extended(other, 11), 6, B256::ZERO));
        provider.add_log(event_log(ARB_RETRYABLE_TX, &lifetime_extended(ticket, 12), 50, B256::ZERO));

        let fetcher = EventFetcher::new(provider.clone());
        let filter = EventFilter::new(0u64, 10u64).address(ARB_RETRYABLE_TX).topic(1, ticket);
        let events =
            fetcher.get_events::<IArbRetryableTx::LifetimeExtended>(&filter).await.unwrap();

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].block_number, 5);
        assert_eq!(events[0].event.newTimeout, U256::from(10u64));
        assert_eq!(provider.log_queries(), 1);
    }
}
