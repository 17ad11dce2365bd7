//! Historical withdrawal queries.

use crate::{
    BridgeProvider, EventFetcher, EventFilter, FetchedEvent, MessageError, WithdrawalEvent,
};
use alloy_eips::BlockNumberOrTag;
use alloy_primitives::{Address, U256};
use arb_bindings::{IArbSys, addresses::ARB_SYS};
use arb_primitives::ArbitrumNetwork;

/// Filters of a historical withdrawal query.
///
/// `position` filters the batch number of classic withdrawals and the outbox position of
/// nitro ones. `hash` filters the unique id of classic withdrawals and the leaf hash of nitro
/// ones. `index_in_batch` only applies to classic withdrawals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WithdrawalQuery {
    /// First L2 block of the range.
    pub from_block: BlockNumberOrTag,
    /// Last L2 block of the range.
    pub to_block: BlockNumberOrTag,
    /// Batch number or outbox position.
    pub position: Option<U256>,
    /// The parent chain destination.
    pub destination: Option<Address>,
    /// Unique id or leaf hash.
    pub hash: Option<U256>,
    /// Index of a classic withdrawal in its batch.
    pub index_in_batch: Option<U256>,
}

impl WithdrawalQuery {
    /// Creates a query over a block range.
    pub fn new(from_block: impl Into<BlockNumberOrTag>, to_block: impl Into<BlockNumberOrTag>) -> Self {
        Self { from_block: from_block.into(), to_block: to_block.into(), ..Default::default() }
    }

    fn filter(&self, from_block: BlockNumberOrTag, to_block: BlockNumberOrTag) -> EventFilter {
        let mut filter = EventFilter::new(from_block, to_block).address(ARB_SYS);
        if let Some(destination) = self.destination {
            filter = filter.topic(1, destination.into_word());
        }
        if let Some(hash) = self.hash {
            filter = filter.topic(2, hash);
        }
        if let Some(position) = self.position {
            filter = filter.topic(3, position);
        }
        filter
    }
}

/// The part of `[from, to]` before the nitro genesis block, or `None` if it is empty.
///
/// Tags other than `earliest` are past the genesis block.
fn classic_range(
    from: BlockNumberOrTag,
    to: BlockNumberOrTag,
    nitro_genesis: u64,
) -> Option<(u64, u64)> {
    let last = nitro_genesis.checked_sub(1)?;
    let from = match from {
        BlockNumberOrTag::Earliest => 0,
        BlockNumberOrTag::Number(number) => number,
        _ => return None,
    };
    let to = match to {
        BlockNumberOrTag::Earliest => 0,
        BlockNumberOrTag::Number(number) => number.min(last),
        _ => last,
    };
    (from <= to).then_some((from, to))
}

/// The part of `[from, to]` from the nitro genesis block on, or `None` if it is empty.
fn nitro_range(
    from: BlockNumberOrTag,
    to: BlockNumberOrTag,
    nitro_genesis: u64,
) -> Option<(BlockNumberOrTag, BlockNumberOrTag)> {
    let from = match from {
        BlockNumberOrTag::Earliest => BlockNumberOrTag::Number(nitro_genesis),
        BlockNumberOrTag::Number(number) => BlockNumberOrTag::Number(number.max(nitro_genesis)),
        tag => tag,
    };
    let to = match to {
        BlockNumberOrTag::Earliest => BlockNumberOrTag::Number(0),
        tag => tag,
    };
    match (from, to) {
        (BlockNumberOrTag::Number(from), BlockNumberOrTag::Number(to)) if from > to => None,
        range => Some(range),
    }
}

/// Fetches the withdrawals sent over a range of L2 blocks.
///
/// The inclusive range is split at the nitro genesis block of `network` and each part is
/// queried with the event shape of its era. Empty parts are skipped.
pub async fn get_l2_to_l1_events<P>(
    l2_provider: &P,
    network: &ArbitrumNetwork,
    query: &WithdrawalQuery,
) -> Result<Vec<FetchedEvent<WithdrawalEvent>>, MessageError>
where
    P: BridgeProvider + Clone,
{
    let genesis = network.nitro_genesis_block;
    let fetcher = EventFetcher::new(l2_provider.clone());

    let classic = async {
        let Some((from, to)) = classic_range(query.from_block, query.to_block, genesis) else {
            return Ok(Vec::new());
        };
        let filter = query.filter(from.into(), to.into());
        let events = fetcher.get_events::<IArbSys::L2ToL1Transaction>(&filter).await?;
        let Some(index) = query.index_in_batch else {
            return Ok(events);
        };
        let indexed: Vec<_> =
            events.into_iter().filter(|e| e.event.indexInBatch == index).collect();
        if indexed.len() > 1 {
            return Err(MessageError::DuplicateClassicWithdrawal(indexed.len()));
        }
        Ok(indexed)
    };
    let nitro = async {
        let Some((from, to)) = nitro_range(query.from_block, query.to_block, genesis) else {
            return Ok(Vec::new());
        };
        Ok::<_, MessageError>(
            fetcher.get_events::<IArbSys::L2ToL1Tx>(&query.filter(from, to)).await?,
        )
    };
    let (classic, nitro) = tokio::try_join!(classic, nitro)?;

    tracing::debug!(
        target: "l2_to_l1",
        classic = classic.len(),
        nitro = nitro.len(),
        "fetched withdrawal events"
    );
    Ok(classic
        .into_iter()
        .map(|e| e.map(WithdrawalEvent::Classic))
        .chain(nitro.into_iter().map(|e| e.map(WithdrawalEvent::Nitro)))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{TestBridgeProvider, event_log};
    use alloy_primitives::{B256, Bytes, address};
    use arb_primitives::network_by_name;
    use rstest::rstest;

    const DESTINATION: Address = address!("0x00000000000000000000000000000000000000dd");
    const GENESIS: u64 = 22207817;

    fn classic(index: u64, destination: Address) -> IArbSys::L2ToL1Transaction {
        IArbSys::L2ToL1Transaction {
            caller: Address::ZERO,
            destination,
            uniqueId: U256::from(index + 100),
            batchNumber: U256::from(7u64),
            indexInBatch: U256::from(index),
            arbBlockNum: U256::ZERO,
            ethBlockNum: U256::ZERO,
            timestamp: U256::ZERO,
            callvalue: U256::ZERO,
            data: Bytes::new(),
        }
    }

    fn nitro(position: u64) -> IArbSys::L2ToL1Tx {
        IArbSys::L2ToL1Tx {
            caller: Address::ZERO,
            destination: DESTINATION,
            hash: U256::from(position + 1),
            position: U256::from(position),
            arbBlockNum: U256::ZERO,
            ethBlockNum: U256::ZERO,
            timestamp: U256::ZERO,
            callvalue: U256::ZERO,
            data: Bytes::new(),
        }
    }

    fn chain() -> TestBridgeProvider {
        let provider = TestBridgeProvider::new(42161, GENESIS + 1_000);
        provider.add_log(event_log(ARB_SYS, &classic(0, DESTINATION), GENESIS - 10, B256::ZERO));
        provider.add_log(event_log(ARB_SYS, &classic(1, DESTINATION), GENESIS - 10, B256::ZERO));
        provider.add_log(event_log(ARB_SYS, &classic(1, Address::ZERO), GENESIS - 5, B256::ZERO));
        provider.add_log(event_log(ARB_SYS, &nitro(0), GENESIS + 10, B256::ZERO));
        provider.add_log(event_log(ARB_SYS, &nitro(1), GENESIS + 20, B256::ZERO));
        provider
    }

    #[rstest]
    #[case::whole(BlockNumberOrTag::Earliest, BlockNumberOrTag::Latest, Some((0, GENESIS - 1)))]
    #[case::classic_only(5u64.into(), 9u64.into(), Some((5, 9)))]
    #[case::single_block(5u64.into(), 5u64.into(), Some((5, 5)))]
    #[case::last_classic_block((GENESIS - 1).into(), GENESIS.into(), Some((GENESIS - 1, GENESIS - 1)))]
    #[case::from_genesis(GENESIS.into(), BlockNumberOrTag::Latest, None)]
    #[case::from_tag(BlockNumberOrTag::Latest, BlockNumberOrTag::Latest, None)]
    #[case::reversed(9u64.into(), 5u64.into(), None)]
    fn test_classic_range(
        #[case] from: BlockNumberOrTag,
        #[case] to: BlockNumberOrTag,
        #[case] expected: Option<(u64, u64)>,
    ) {
        assert_eq!(classic_range(from, to, GENESIS), expected);
    }

    #[test]
    fn test_classic_range_without_classic_era() {
        assert_eq!(classic_range(BlockNumberOrTag::Earliest, BlockNumberOrTag::Latest, 0), None);
    }

    #[rstest]
    #[case::whole(
        BlockNumberOrTag::Earliest,
        BlockNumberOrTag::Latest,
        Some((GENESIS.into(), BlockNumberOrTag::Latest))
    )]
    #[case::single_block(
        (GENESIS + 5).into(),
        (GENESIS + 5).into(),
        Some(((GENESIS + 5).into(), (GENESIS + 5).into()))
    )]
    #[case::genesis_block(5u64.into(), GENESIS.into(), Some((GENESIS.into(), GENESIS.into())))]
    #[case::classic_only(5u64.into(), 9u64.into(), None)]
    #[case::to_earliest(BlockNumberOrTag::Earliest, BlockNumberOrTag::Earliest, None)]
    fn test_nitro_range(
        #[case] from: BlockNumberOrTag,
        #[case] to: BlockNumberOrTag,
        #[case] expected: Option<(BlockNumberOrTag, BlockNumberOrTag)>,
    ) {
        assert_eq!(nitro_range(from, to, GENESIS), expected);
    }

    #[tokio::test]
    async fn test_single_block_ranges() {
        let provider = chain();
        let network = network_by_name("arb1").unwrap();

        let query = WithdrawalQuery::new(GENESIS + 20, GENESIS + 20);
        let events = get_l2_to_l1_events(&provider, network, &query).await.unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].block_number, GENESIS + 20);
        assert_eq!(provider.log_queries(), 1);

        let query = WithdrawalQuery::new(GENESIS - 5, GENESIS - 5);
        let events = get_l2_to_l1_events(&provider, network, &query).await.unwrap();
        assert_eq!(events.len(), 1);
        assert!(events[0].event.is_classic());
        assert_eq!(provider.log_queries(), 2);
    }

    #[tokio::test]
    async fn test_whole_range_spans_both_eras() {
        let provider = chain();
        let network = network_by_name("arb1").unwrap();
        let query = WithdrawalQuery::new(BlockNumberOrTag::Earliest, BlockNumberOrTag::Latest);
        let events = get_l2_to_l1_events(&provider, network, &query).await.unwrap();
        assert_eq!(events.len(), 5);
        assert!(events[..3].iter().all(|e| e.event.is_classic()));
        assert!(events[3..].iter().all(|e| !e.event.is_classic()));
        assert_eq!(provider.log_queries(), 2);
    }

    #[tokio::test]
    async fn test_nitro_only_range_skips_classic_query() {
        let provider = chain();
        let network = network_by_name("arb1").unwrap();
        let query = WithdrawalQuery {
            position: Some(U256::from(1u64)),
            ..WithdrawalQuery::new(GENESIS, BlockNumberOrTag::Latest)
        };
        let events = get_l2_to_l1_events(&provider, network, &query).await.unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].block_number, GENESIS + 20);
        assert_eq!(provider.log_queries(), 1);
    }

    #[tokio::test]
    async fn test_classic_index_in_batch() {
        let provider = chain();
        let network = network_by_name("arb1").unwrap();
        let query = WithdrawalQuery {
            destination: Some(DESTINATION),
            index_in_batch: Some(U256::from(1u64)),
            ..WithdrawalQuery::new(0u64, GENESIS)
        };
        let events = get_l2_to_l1_events(&provider, network, &query).await.unwrap();
        assert_eq!(events.len(), 1);
        assert!(
            matches!(&events[0].event, WithdrawalEvent::Classic(e) if e.destination == DESTINATION)
        );
    }

    #[tokio::test]
    async fn test_duplicate_classic_withdrawal() {
        let provider = chain();
        let network = network_by_name("arb1").unwrap();
        let query = WithdrawalQuery {
            index_in_batch: Some(U256::from(1u64)),
            ..WithdrawalQuery::new(0u64, GENESIS)
        };
        let err = get_l2_to_l1_events(&provider, network, &query).await.unwrap_err();
        assert!(matches!(err, MessageError::DuplicateClassicWithdrawal(2)));
    }
}
