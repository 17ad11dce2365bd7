//! Withdrawals sent after the nitro upgrade.

use crate::{
    ArbBlock, BlockRangeCache, BridgeProvider, EventFetcher, EventFilter, MessageError,
    PollConfig, contract::read_contract, poll::poll_until, search,
};
use alloy_eips::{BlockId, BlockNumberOrTag};
use alloy_primitives::{B256, U256};
use arb_bindings::{
    IArbSys, INodeInterface, IOutbox, IRollupCore,
    addresses::{ARB_SYS, NODE_INTERFACE},
};
use arb_primitives::{
    ASSERTION_CONFIRMED_PADDING, ASSERTION_CREATED_PADDING, ArbitrumNetwork, L2ToL1MessageStatus,
    network_by_chain_id,
};
use std::sync::Arc;
use tokio::sync::{Mutex, OnceCell};

/// The outbox tree state a withdrawal can be proven against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SendProps {
    /// Number of leaves of the tree, once a node covering the withdrawal was created.
    pub send_root_size: Option<U256>,
    /// Root of the tree, once a node covering the withdrawal was created.
    pub send_root_hash: Option<B256>,
    /// `true` once the covering node is confirmed.
    pub send_root_confirmed: bool,
}

/// A nitro withdrawal, resolved against the rollup on the parent chain.
///
/// The outbox tree state is resolved lazily and kept once the covering node is confirmed.
/// Clones share that state.
#[derive(Debug, Clone)]
pub struct NitroL2ToL1MessageReader<P> {
    l1_provider: P,
    l2_provider: P,
    network: ArbitrumNetwork,
    event: IArbSys::L2ToL1Tx,
    send_props: Arc<Mutex<SendProps>>,
    parent_is_arbitrum: Arc<OnceCell<bool>>,
    cache: BlockRangeCache,
}

impl<P: BridgeProvider + Clone> NitroL2ToL1MessageReader<P> {
    /// Creates a reader for the withdrawal recorded by `event`.
    pub fn new(
        l1_provider: P,
        l2_provider: P,
        network: &ArbitrumNetwork,
        event: IArbSys::L2ToL1Tx,
        cache: BlockRangeCache,
    ) -> Self {
        Self {
            l1_provider,
            l2_provider,
            network: network.clone(),
            event,
            send_props: Arc::default(),
            parent_is_arbitrum: Arc::default(),
            cache,
        }
    }

    /// The withdrawal event.
    pub const fn event(&self) -> &IArbSys::L2ToL1Tx {
        &self.event
    }

    /// The position of the withdrawal in the outbox tree.
    pub const fn position(&self) -> U256 {
        self.event.position
    }

    /// Returns `true` if the withdrawal was executed on the parent chain.
    pub async fn has_executed(&self) -> Result<bool, MessageError> {
        let call = IOutbox::isSpentCall { index: self.event.position };
        Ok(read_contract(&self.l1_provider, self.network.eth_bridge.outbox, call).await?)
    }

    /// Returns the current status of the withdrawal.
    pub async fn status(&self) -> Result<L2ToL1MessageStatus, MessageError> {
        if !self.get_send_props().await?.send_root_confirmed {
            return Ok(L2ToL1MessageStatus::Unconfirmed);
        }
        Ok(if self.has_executed().await? {
            L2ToL1MessageStatus::Executed
        } else {
            L2ToL1MessageStatus::Confirmed
        })
    }

    /// Returns the merkle proof of the withdrawal against the latest known send root.
    pub async fn get_outbox_proof(&self) -> Result<Vec<B256>, MessageError> {
        let size = self
            .get_send_props()
            .await?
            .send_root_size
            .filter(|size| !size.is_zero())
            .ok_or(MessageError::NodeNotCreated)?;
        let call = INodeInterface::constructOutboxProofCall {
            size: size.saturating_to(),
            leaf: self.event.position.saturating_to(),
        };
        Ok(read_contract(&self.l2_provider, NODE_INTERFACE, call).await?.proof)
    }

    /// Resolves the outbox tree state covering the withdrawal.
    ///
    /// The latest confirmed node is checked first. If it does not cover the withdrawal, the
    /// latest created node is checked as well, which records the tree state without marking it
    /// confirmed.
    pub async fn get_send_props(&self) -> Result<SendProps, MessageError> {
        let mut props = self.send_props.lock().await;
        if props.send_root_confirmed {
            return Ok(*props);
        }

        let rollup = self.network.eth_bridge.rollup;
        let position = self.event.position;
        let confirmed =
            read_contract(&self.l1_provider, rollup, IRollupCore::latestConfirmedCall {}).await?;
        let block = self.block_from_node_num(confirmed).await?;
        if block.send_count_or_zero() > position {
            *props = SendProps {
                send_root_size: Some(block.send_count_or_zero()),
                send_root_hash: block.send_root,
                send_root_confirmed: true,
            };
            tracing::debug!(target: "l2_to_l1", %position, node = confirmed, "send root confirmed");
            return Ok(*props);
        }

        let latest =
            read_contract(&self.l1_provider, rollup, IRollupCore::latestNodeCreatedCall {}).await?;
        // The latest node equals the confirmed one at genesis and right after upgrades.
        if latest > confirmed {
            let block = self.block_from_node_num(latest).await?;
            if block.send_count_or_zero() > position {
                props.send_root_size = Some(block.send_count_or_zero());
                props.send_root_hash = block.send_root;
            }
        }
        Ok(*props)
    }

    /// Waits until the withdrawal can be executed, or was executed.
    pub async fn wait_until_ready_to_execute(
        &self,
        poll: &PollConfig,
    ) -> Result<L2ToL1MessageStatus, MessageError> {
        poll_until(poll, || async {
            let status = self.status().await?;
            Ok(matches!(status, L2ToL1MessageStatus::Confirmed | L2ToL1MessageStatus::Executed)
                .then_some(status))
        })
        .await
    }

    /// Estimates the first parent chain block at which the withdrawal can be executed.
    ///
    /// Returns `None` if the withdrawal is already executable or executed.
    pub async fn get_first_executable_block(&self) -> Result<Option<u64>, MessageError> {
        if self.status().await? != L2ToL1MessageStatus::Unconfirmed {
            return Ok(None);
        }

        let rollup = self.network.eth_bridge.rollup;
        let confirm_period = self.network.confirm_period_blocks;
        let latest = self.l1_provider.block_number().await?;
        let from = latest.saturating_sub(confirm_period + ASSERTION_CONFIRMED_PADDING);
        let filter = EventFilter::new(from, BlockNumberOrTag::Latest).address(rollup);
        let mut nodes = EventFetcher::new(self.l1_provider.clone())
            .get_events::<IRollupCore::NodeCreated>(&filter)
            .await?;
        nodes.sort_by_key(|node| node.event.nodeNum);

        let position = self.event.position;
        let last = self.block_from_node_log(nodes.last().map(|node| &node.event)).await?;
        if last.send_count_or_zero() <= position {
            // No created node covers the withdrawal, assume the next one will.
            return Ok(Some(
                latest + confirm_period + ASSERTION_CREATED_PADDING + ASSERTION_CONFIRMED_PADDING,
            ));
        }

        let nodes = &nodes;
        let index = search::partition_point(nodes.len(), move |i| async move {
            let block = self.block_from_node_log(Some(&nodes[i].event)).await?;
            Ok::<_, MessageError>(block.send_count_or_zero() <= position)
        })
        .await?;
        let earliest = nodes.get(index).ok_or(MessageError::NodeNotCreated)?.event.nodeNum;
        let node =
            read_contract(&self.l1_provider, rollup, IRollupCore::getNodeCall { nodeNum: earliest })
                .await?;
        tracing::debug!(target: "l2_to_l1", %position, node = earliest, deadline = node.deadlineBlock, "found covering node");
        Ok(Some(node.deadlineBlock + ASSERTION_CONFIRMED_PADDING))
    }

    /// Returns the L2 block asserted by rollup node `node`.
    async fn block_from_node_num(&self, node: u64) -> Result<ArbBlock, MessageError> {
        let rollup = self.network.eth_bridge.rollup;
        let created =
            read_contract(&self.l1_provider, rollup, IRollupCore::getNodeCall { nodeNum: node })
                .await?
                .createdAtBlock;
        let (from, to) = self.node_creation_range(created).await?;
        let filter = EventFilter::new(from, to).address(rollup).topic(1, U256::from(node));
        let logs = EventFetcher::new(self.l1_provider.clone())
            .get_events::<IRollupCore::NodeCreated>(&filter)
            .await?;
        if logs.len() > 1 {
            return Err(MessageError::MultipleNodeCreatedEvents { node, count: logs.len() });
        }
        self.block_from_node_log(logs.first().map(|log| &log.event)).await
    }

    /// Returns the L2 block asserted by a `NodeCreated` event, checking its send root.
    ///
    /// Without an event, the genesis block is returned.
    async fn block_from_node_log(
        &self,
        event: Option<&IRollupCore::NodeCreated>,
    ) -> Result<ArbBlock, MessageError> {
        let Some(event) = event else {
            tracing::warn!(target: "l2_to_l1", "no NodeCreated events found, defaulting to block 0");
            return self.l2_block(BlockId::number(0)).await;
        };
        let state = &event.assertion.afterState.globalState;
        let block = self.l2_block(BlockId::hash(state.block_hash())).await?;
        match block.send_root {
            Some(root) if root == state.send_root() => Ok(block),
            actual => Err(MessageError::SendRootMismatch {
                expected: state.send_root(),
                actual: actual.unwrap_or_default(),
            }),
        }
    }

    /// Returns the blocks of the parent chain that may hold the creation of a node created at
    /// `created_at`.
    ///
    /// `created_at` is a block number of the parent chain's own parent when the parent chain is
    /// an Arbitrum chain.
    async fn node_creation_range(&self, created_at: u64) -> Result<(u64, u64), MessageError> {
        if !self.parent_is_arbitrum().await? {
            return Ok((created_at, created_at));
        }
        let key = (self.network.parent_chain_id, created_at);
        match self.cache.get_or_try_insert_with(key, || self.child_block_range(created_at)).await {
            Ok(range) => Ok(range),
            Err(err) => {
                tracing::debug!(target: "l2_to_l1", created_at, %err, "no block range, using the creation block");
                Ok((created_at, created_at))
            }
        }
    }

    /// Maps a block of the grandparent chain to the parent chain blocks produced at it.
    async fn child_block_range(&self, parent_block: u64) -> Result<(u64, u64), MessageError> {
        let call = INodeInterface::l2BlockRangeForL1Call { blockNum: parent_block };
        match read_contract(&self.l1_provider, NODE_INTERFACE, call).await {
            Ok(range) => return Ok((range.firstBlock, range.lastBlock)),
            Err(err) => {
                tracing::debug!(target: "block_range_cache", parent_block, %err, "l2BlockRangeForL1 failed, searching");
            }
        }

        let head = self.l1_provider.block_number().await?;
        let min = network_by_chain_id(self.network.parent_chain_id)
            .map(|network| network.nitro_genesis_block)
            .unwrap_or_default();
        let parent_block_of = move |number: u64| async move {
            Ok::<_, MessageError>(
                self.l1_provider
                    .block(BlockId::number(number))
                    .await?
                    .and_then(|block| block.l1_block_number),
            )
        };
        let (first, next) = tokio::try_join!(
            search::first_block_for_parent_block(parent_block, false, min, head, parent_block_of),
            search::first_block_for_parent_block(parent_block + 1, true, min, head, parent_block_of),
        )?;
        match (first, next) {
            (Some(first), Some(next)) => Ok((first, next.saturating_sub(1))),
            (Some(first), None) => Ok((first, head)),
            (None, _) => Err(MessageError::BlockNotFound(BlockId::number(parent_block))),
        }
    }

    /// Returns `true` if the parent chain is itself an Arbitrum chain.
    async fn parent_is_arbitrum(&self) -> Result<bool, MessageError> {
        let is_arbitrum = self
            .parent_is_arbitrum
            .get_or_try_init(|| async {
                match read_contract(&self.l1_provider, ARB_SYS, IArbSys::arbOSVersionCall {}).await
                {
                    Ok(_) => Ok(true),
                    Err(err) if err.is_transport() => Err(err),
                    Err(_) => Ok(false),
                }
            })
            .await?;
        Ok(*is_arbitrum)
    }

    async fn l2_block(&self, id: BlockId) -> Result<ArbBlock, MessageError> {
        self.l2_provider.block(id).await?.ok_or(MessageError::BlockNotFound(id))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::{
        ProviderError,
        test_utils::{TestBridgeProvider, event_log},
    };
    use alloy_primitives::{Address, Bytes, address};
    use arb_bindings::{Assertion, ExecutionState, GlobalState, MachineStatus, Node};
    use arb_primitives::network_by_name;
    use proptest::prelude::*;
    use rstest::rstest;

    const L2_CHAIN_ID: u64 = 421614;
    const L1_HEAD: u64 = 1_000;

    pub(crate) fn withdrawal(position: u64) -> IArbSys::L2ToL1Tx {
        IArbSys::L2ToL1Tx {
            caller: address!("0x00000000000000000000000000000000000000cc"),
            destination: address!("0x00000000000000000000000000000000000000dd"),
            hash: U256::from(position + 1),
            position: U256::from(position),
            arbBlockNum: U256::from(50u64),
            ethBlockNum: U256::from(40u64),
            timestamp: U256::from(1_000u64),
            callvalue: U256::from(7u64),
            data: Bytes::new(),
        }
    }

    fn execution_state(block_hash: B256, send_root: B256) -> ExecutionState {
        ExecutionState {
            globalState: GlobalState { bytes32Vals: [block_hash, send_root], u64Vals: [0, 0] },
            machineStatus: MachineStatus::FINISHED,
        }
    }

    /// A parent chain and an L2 chain where rollup nodes assert L2 blocks.
    pub(crate) struct Rollup {
        pub(crate) network: ArbitrumNetwork,
        pub(crate) l1: TestBridgeProvider,
        pub(crate) l2: TestBridgeProvider,
    }

    impl Rollup {
        pub(crate) fn new() -> Self {
            let network = network_by_name("sepolia").unwrap().clone();
            let l1 = TestBridgeProvider::new(network.parent_chain_id, L1_HEAD);
            let l2 = TestBridgeProvider::new(L2_CHAIN_ID, 0);
            l2.add_block(ArbBlock {
                number: 0,
                hash: B256::repeat_byte(0xaa),
                send_root: Some(B256::ZERO),
                send_count: Some(U256::ZERO),
                ..Default::default()
            });
            Self { network, l1, l2 }
        }

        /// Adds node `num`, created at parent block `created_at`, asserting an L2 block with
        /// `send_count` leaves.
        pub(crate) fn add_node(&self, num: u64, created_at: u64, send_count: u64, deadline: u64) {
            let l2_number = num * 10;
            let hash = B256::with_last_byte(num as u8);
            let send_root = B256::left_padding_from(&send_count.to_be_bytes());
            self.l2.add_block(ArbBlock {
                number: l2_number,
                hash,
                send_root: Some(send_root),
                send_count: Some(U256::from(send_count)),
                ..Default::default()
            });
            let event = IRollupCore::NodeCreated {
                nodeNum: num,
                parentNodeHash: B256::ZERO,
                nodeHash: B256::ZERO,
                executionHash: B256::ZERO,
                assertion: Assertion {
                    beforeState: execution_state(B256::ZERO, B256::ZERO),
                    afterState: execution_state(hash, send_root),
                    numBlocks: 1,
                },
                afterInboxBatchAcc: B256::ZERO,
                wasmModuleRoot: B256::ZERO,
                inboxMaxCount: U256::ZERO,
            };
            let rollup = self.network.eth_bridge.rollup;
            self.l1.add_log(event_log(rollup, &event, created_at, B256::ZERO));
            self.l1.on_exact_call(
                rollup,
                &IRollupCore::getNodeCall { nodeNum: num },
                &Node { createdAtBlock: created_at, deadlineBlock: deadline, ..Default::default() },
            );
        }

        pub(crate) fn set_nodes(&self, confirmed: u64, latest: u64) {
            let rollup = self.network.eth_bridge.rollup;
            self.l1.on_call::<IRollupCore::latestConfirmedCall>(rollup, &confirmed);
            self.l1.on_call::<IRollupCore::latestNodeCreatedCall>(rollup, &latest);
        }

        pub(crate) fn set_spent(&self, spent: bool) {
            self.l1.on_call::<IOutbox::isSpentCall>(self.network.eth_bridge.outbox, &spent);
        }

        pub(crate) fn reader(&self, position: u64) -> NitroL2ToL1MessageReader<TestBridgeProvider> {
            NitroL2ToL1MessageReader::new(
                self.l1.clone(),
                self.l2.clone(),
                &self.network,
                withdrawal(position),
                BlockRangeCache::default(),
            )
        }
    }

    #[rstest]
    #[case::covered_and_spent(5, true, L2ToL1MessageStatus::Executed)]
    #[case::covered(5, false, L2ToL1MessageStatus::Confirmed)]
    #[case::boundary(10, false, L2ToL1MessageStatus::Unconfirmed)]
    #[case::beyond(20, false, L2ToL1MessageStatus::Unconfirmed)]
    #[tokio::test]
    async fn test_status(
        #[case] position: u64,
        #[case] spent: bool,
        #[case] expected: L2ToL1MessageStatus,
    ) {
        let rollup = Rollup::new();
        rollup.add_node(1, 100, 10, 200);
        rollup.set_nodes(1, 1);
        rollup.set_spent(spent);
        assert_eq!(rollup.reader(position).status().await.unwrap(), expected);
    }

    #[tokio::test]
    async fn test_unconfirmed_node_records_send_props() {
        let rollup = Rollup::new();
        rollup.add_node(1, 100, 10, 200);
        rollup.add_node(2, 150, 30, 250);
        rollup.set_nodes(1, 2);
        let reader = rollup.reader(15);

        let props = reader.get_send_props().await.unwrap();
        assert_eq!(props.send_root_size, Some(U256::from(30u64)));
        assert!(!props.send_root_confirmed);
        assert_eq!(reader.status().await.unwrap(), L2ToL1MessageStatus::Unconfirmed);
    }

    #[tokio::test]
    async fn test_confirmed_props_are_kept() {
        let rollup = Rollup::new();
        rollup.add_node(1, 100, 10, 200);
        rollup.set_nodes(1, 1);
        let reader = rollup.reader(3);
        assert!(reader.get_send_props().await.unwrap().send_root_confirmed);

        let queries = rollup.l1.log_queries();
        assert!(reader.clone().get_send_props().await.unwrap().send_root_confirmed);
        assert_eq!(rollup.l1.log_queries(), queries);
    }

    #[tokio::test]
    async fn test_send_root_mismatch() {
        let rollup = Rollup::new();
        rollup.add_node(1, 100, 10, 200);
        rollup.set_nodes(1, 1);
        rollup.l2.add_block(ArbBlock {
            number: 10,
            hash: B256::with_last_byte(1),
            send_root: Some(B256::repeat_byte(0xff)),
            send_count: Some(U256::from(10u64)),
            ..Default::default()
        });
        let err = rollup.reader(3).status().await.unwrap_err();
        assert!(matches!(err, MessageError::SendRootMismatch { .. }));
    }

    #[tokio::test]
    async fn test_outbox_proof_requires_node() {
        let rollup = Rollup::new();
        rollup.set_nodes(0, 0);
        rollup.l1.on_exact_call(
            rollup.network.eth_bridge.rollup,
            &IRollupCore::getNodeCall { nodeNum: 0 },
            &Node::default(),
        );
        let err = rollup.reader(3).get_outbox_proof().await.unwrap_err();
        assert!(matches!(err, MessageError::NodeNotCreated));
    }

    #[tokio::test]
    async fn test_outbox_proof() {
        let rollup = Rollup::new();
        rollup.add_node(1, 100, 10, 200);
        rollup.set_nodes(1, 1);
        let proof = vec![B256::repeat_byte(1), B256::repeat_byte(2)];
        rollup.l2.on_exact_call(
            NODE_INTERFACE,
            &INodeInterface::constructOutboxProofCall { size: 10, leaf: 3 },
            &INodeInterface::constructOutboxProofReturn {
                send: B256::ZERO,
                root: B256::ZERO,
                proof: proof.clone(),
            },
        );
        assert_eq!(rollup.reader(3).get_outbox_proof().await.unwrap(), proof);
    }

    #[tokio::test]
    async fn test_first_executable_block_without_covering_node() {
        let rollup = Rollup::new();
        rollup.add_node(1, 990, 10, 1_100);
        rollup.set_nodes(1, 1);
        let block = rollup.reader(10).get_first_executable_block().await.unwrap();
        let confirm = rollup.network.confirm_period_blocks;
        assert_eq!(
            block,
            Some(L1_HEAD + confirm + ASSERTION_CREATED_PADDING + ASSERTION_CONFIRMED_PADDING)
        );
    }

    #[tokio::test]
    async fn test_first_executable_block_picks_earliest_covering_node() {
        let rollup = Rollup::new();
        rollup.add_node(1, 985, 10, 1_010);
        rollup.add_node(2, 990, 20, 1_020);
        rollup.add_node(3, 995, 30, 1_030);
        rollup.set_nodes(1, 3);
        let reader = rollup.reader(15);
        assert_eq!(
            reader.get_first_executable_block().await.unwrap(),
            Some(1_020 + ASSERTION_CONFIRMED_PADDING)
        );
    }

    #[tokio::test]
    async fn test_first_executable_block_when_confirmed() {
        let rollup = Rollup::new();
        rollup.add_node(1, 985, 10, 1_010);
        rollup.set_nodes(1, 1);
        rollup.set_spent(false);
        assert_eq!(rollup.reader(5).get_first_executable_block().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_orbit_parent_maps_creation_block() {
        let rollup = Rollup::new();
        // Node 1 is created at grandparent block 100, which the parent produced as 400..=410.
        rollup.add_node(1, 405, 10, 500);
        rollup.l1.on_exact_call(
            rollup.network.eth_bridge.rollup,
            &IRollupCore::getNodeCall { nodeNum: 1 },
            &Node { createdAtBlock: 100, deadlineBlock: 500, ..Default::default() },
        );
        rollup.set_nodes(1, 1);
        rollup.set_spent(false);
        rollup.l1.on_call::<IArbSys::arbOSVersionCall>(ARB_SYS, &U256::from(51u64));
        rollup.l1.on_exact_call(
            NODE_INTERFACE,
            &INodeInterface::l2BlockRangeForL1Call { blockNum: 100 },
            &INodeInterface::l2BlockRangeForL1Return { firstBlock: 400, lastBlock: 410 },
        );

        let cache = BlockRangeCache::default();
        let reader = NitroL2ToL1MessageReader::new(
            rollup.l1.clone(),
            rollup.l2.clone(),
            &rollup.network,
            withdrawal(3),
            cache.clone(),
        );
        assert_eq!(reader.status().await.unwrap(), L2ToL1MessageStatus::Confirmed);
        assert_eq!(cache.get((rollup.network.parent_chain_id, 100)).await, Some((400, 410)));
    }

    #[tokio::test]
    async fn test_orbit_parent_falls_back_to_search() {
        let rollup = Rollup::new();
        rollup.l1.set_head(0);
        for number in 0..=60u64 {
            rollup.l1.add_block(ArbBlock {
                number,
                hash: B256::from(U256::from(number + 1)),
                l1_block_number: Some(number / 10),
                ..Default::default()
            });
        }
        rollup.add_node(1, 33, 10, 500);
        rollup.l1.on_exact_call(
            rollup.network.eth_bridge.rollup,
            &IRollupCore::getNodeCall { nodeNum: 1 },
            &Node { createdAtBlock: 3, deadlineBlock: 500, ..Default::default() },
        );
        rollup.set_nodes(1, 1);
        rollup.set_spent(true);
        rollup.l1.on_call::<IArbSys::arbOSVersionCall>(ARB_SYS, &U256::from(51u64));

        let cache = BlockRangeCache::default();
        let reader = NitroL2ToL1MessageReader::new(
            rollup.l1.clone(),
            rollup.l2.clone(),
            &rollup.network,
            withdrawal(3),
            cache.clone(),
        );
        assert_eq!(reader.status().await.unwrap(), L2ToL1MessageStatus::Executed);
        assert_eq!(cache.get((rollup.network.parent_chain_id, 3)).await, Some((30, 39)));
    }

    #[tokio::test]
    async fn test_transport_errors_propagate() {
        let rollup = Rollup::new();
        rollup.l1.on_call_error::<IRollupCore::latestConfirmedCall>(
            rollup.network.eth_bridge.rollup,
            ProviderError::Transport("connection reset".to_string()),
        );
        let err = rollup.reader(1).status().await.unwrap_err();
        assert!(matches!(err, MessageError::Provider(ProviderError::Transport(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_until_ready_to_execute_times_out() {
        let rollup = Rollup::new();
        rollup.add_node(1, 100, 10, 200);
        rollup.set_nodes(1, 1);
        let poll = PollConfig::default().with_timeout(core::time::Duration::from_secs(2));
        let err = rollup.reader(50).wait_until_ready_to_execute(&poll).await.unwrap_err();
        assert!(matches!(err, MessageError::Timeout(_)));
        assert_ne!(rollup.reader(50).event().caller, Address::ZERO);
    }

    proptest! {
        #[test]
        fn test_covering_node_matches_linear_scan(
            mut counts in proptest::collection::vec(1u64..50, 1..12),
            position in 0u64..700,
        ) {
            counts.sort_unstable();
            counts.dedup();
            let mut total = 0;
            let cumulative: Vec<u64> = counts.iter().map(|c| { total += c; total }).collect();

            let rollup = Rollup::new();
            for (i, count) in cumulative.iter().enumerate() {
                let num = i as u64 + 1;
                rollup.add_node(num, 990 + i as u64, *count, 2_000 + num);
            }
            rollup.set_nodes(0, cumulative.len() as u64);
            rollup.l1.on_exact_call(
                rollup.network.eth_bridge.rollup,
                &IRollupCore::getNodeCall { nodeNum: 0 },
                &Node::default(),
            );

            let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
            let block = runtime.block_on(rollup.reader(position).get_first_executable_block()).unwrap();

            let expected = match cumulative.iter().position(|count| *count > position) {
                Some(i) => 2_000 + i as u64 + 1 + ASSERTION_CONFIRMED_PADDING,
                None => L1_HEAD +
                    rollup.network.confirm_period_blocks +
                    ASSERTION_CREATED_PADDING +
                    ASSERTION_CONFIRMED_PADDING,
            };
            prop_assert_eq!(block, Some(expected));
        }
    }
}
