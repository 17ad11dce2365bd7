//! In-memory chain used to test the message readers.

use crate::{ArbBlock, BridgeProvider, ProviderError, TxReceipt};
use alloy_eips::{BlockId, BlockNumberOrTag};
use alloy_primitives::{Address, B256, Bytes, keccak256};
use alloy_rpc_types_eth::{Filter, Log, TransactionRequest};
use alloy_sol_types::{SolCall, SolEvent};
use async_trait::async_trait;
use std::{
    collections::HashMap,
    sync::{
        Arc, Mutex, MutexGuard, PoisonError,
        atomic::{AtomicUsize, Ordering},
    },
};

/// Builds a log for `event` emitted by `address` in `block_number`.
pub fn event_log<E: SolEvent>(
    address: Address,
    event: &E,
    block_number: u64,
    transaction_hash: B256,
) -> Log {
    Log {
        inner: alloy_primitives::Log { address, data: event.encode_log_data() },
        block_hash: Some(block_hash(block_number)),
        block_number: Some(block_number),
        transaction_hash: Some(transaction_hash),
        log_index: Some(0),
        ..Default::default()
    }
}

/// The hash [`TestBridgeProvider`] assigns to generated blocks.
pub fn block_hash(number: u64) -> B256 {
    keccak256(number.to_be_bytes())
}

/// Builds a receipt for `hash` included in `block_number`.
pub fn receipt(hash: B256, block_number: u64, status: bool, logs: Vec<Log>) -> TxReceipt {
    TxReceipt {
        transaction_hash: hash,
        block_hash: block_hash(block_number),
        block_number,
        status,
        logs,
        ..Default::default()
    }
}

#[derive(Debug, Default)]
struct ChainState {
    chain_id: u64,
    head: u64,
    /// `(genesis timestamp, seconds per block)` of generated blocks.
    block_time: Option<(u64, u64)>,
    blocks: HashMap<u64, ArbBlock>,
    receipts: HashMap<B256, TxReceipt>,
    logs: Vec<Log>,
    exact_calls: HashMap<(Address, Bytes), Result<Bytes, ProviderError>>,
    calls: HashMap<(Address, [u8; 4]), Result<Bytes, ProviderError>>,
    gas_estimate: u64,
    gas_price: u128,
}

impl ChainState {
    fn block(&self, number: u64) -> Option<ArbBlock> {
        if let Some(block) = self.blocks.get(&number) {
            return Some(block.clone());
        }
        let (genesis, block_time) = self.block_time?;
        (number <= self.head).then(|| ArbBlock {
            number,
            hash: block_hash(number),
            timestamp: genesis + number * block_time,
            ..Default::default()
        })
    }
}

/// A [`BridgeProvider`] answering from in-memory state.
///
/// Contract calls are answered by exact calldata first, then by selector. Query counters allow
/// asserting which code paths hit the chain.
#[derive(Debug, Clone, Default)]
pub struct TestBridgeProvider {
    state: Arc<Mutex<ChainState>>,
    log_queries: Arc<AtomicUsize>,
    receipt_queries: Arc<AtomicUsize>,
}

impl TestBridgeProvider {
    /// Creates a chain with the given id and head block.
    pub fn new(chain_id: u64, head: u64) -> Self {
        let provider = Self::default();
        {
            let mut state = provider.state();
            state.chain_id = chain_id;
            state.head = head;
        }
        provider
    }

    fn state(&self) -> MutexGuard<'_, ChainState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Generates every block up to the head with a fixed block time.
    pub fn with_block_time(self, genesis_timestamp: u64, seconds_per_block: u64) -> Self {
        self.state().block_time = Some((genesis_timestamp, seconds_per_block));
        self
    }

    /// Moves the head.
    pub fn set_head(&self, head: u64) {
        self.state().head = head;
    }

    /// Stores a block, overriding a generated one.
    pub fn add_block(&self, block: ArbBlock) {
        let mut state = self.state();
        state.head = state.head.max(block.number);
        state.blocks.insert(block.number, block);
    }

    /// Stores a receipt.
    pub fn add_receipt(&self, receipt: TxReceipt) {
        self.state().receipts.insert(receipt.transaction_hash, receipt);
    }

    /// Stores a log.
    pub fn add_log(&self, log: Log) {
        self.state().logs.push(log);
    }

    /// Answers every call to `address` with the selector of `C`.
    pub fn on_call<C: SolCall>(&self, address: Address, ret: &C::Return) {
        self.state().calls.insert((address, C::SELECTOR), Ok(C::abi_encode_returns(ret).into()));
    }

    /// Answers every call to `address` with the selector of `C` with raw `output`.
    pub fn on_call_output<C: SolCall>(&self, address: Address, output: Bytes) {
        self.state().calls.insert((address, C::SELECTOR), Ok(output));
    }

    /// Answers calls of exactly `call` on `address`.
    pub fn on_exact_call<C: SolCall>(&self, address: Address, call: &C, ret: &C::Return) {
        self.state()
            .exact_calls
            .insert((address, call.abi_encode().into()), Ok(C::abi_encode_returns(ret).into()));
    }

    /// Answers calls of exactly `call` on `address` with an error.
    pub fn on_exact_call_error<C: SolCall>(&self, address: Address, call: &C, err: ProviderError) {
        self.state().exact_calls.insert((address, call.abi_encode().into()), Err(err));
    }

    /// Fails every call to `address` with the selector of `C`.
    pub fn on_call_error<C: SolCall>(&self, address: Address, err: ProviderError) {
        self.state().calls.insert((address, C::SELECTOR), Err(err));
    }

    /// Sets the answers of gas estimation and gas price queries.
    pub fn set_gas(&self, estimate: u64, price: u128) {
        let mut state = self.state();
        state.gas_estimate = estimate;
        state.gas_price = price;
    }

    /// Number of log queries served.
    pub fn log_queries(&self) -> usize {
        self.log_queries.load(Ordering::SeqCst)
    }

    /// Number of receipt queries served.
    pub fn receipt_queries(&self) -> usize {
        self.receipt_queries.load(Ordering::SeqCst)
    }

    fn answer_call(&self, tx: &TransactionRequest) -> Result<Bytes, ProviderError> {
        let to = tx.to.and_then(|kind| kind.to().copied()).unwrap_or_default();
        let input = tx.input.input().cloned().unwrap_or_default();
        let state = self.state();
        if let Some(answer) = state.exact_calls.get(&(to, input.clone())) {
            return answer.clone();
        }
        let selector = input.get(..4).and_then(|s| <[u8; 4]>::try_from(s).ok()).unwrap_or_default();
        state.calls.get(&(to, selector)).cloned().unwrap_or_else(|| {
            Err(ProviderError::Reverted { message: "execution reverted".to_string(), data: None })
        })
    }
}

fn log_matches(filter: &Filter, log: &Log) -> bool {
    let number = log.block_number.unwrap_or_default();
    let in_range = filter.get_from_block().is_none_or(|from| number >= from) &&
        filter.get_to_block().is_none_or(|to| number <= to);
    let topics_match = filter.topics.iter().enumerate().all(|(i, topic)| {
        topic.is_empty() || log.topics().get(i).is_some_and(|t| topic.matches(t))
    });
    in_range && filter.address.matches(&log.address()) && topics_match
}

#[async_trait]
impl BridgeProvider for TestBridgeProvider {
    async fn chain_id(&self) -> Result<u64, ProviderError> {
        Ok(self.state().chain_id)
    }

    async fn block_number(&self) -> Result<u64, ProviderError> {
        Ok(self.state().head)
    }

    async fn block(&self, id: BlockId) -> Result<Option<ArbBlock>, ProviderError> {
        let state = self.state();
        Ok(match id {
            BlockId::Number(BlockNumberOrTag::Number(n)) => state.block(n),
            BlockId::Number(BlockNumberOrTag::Earliest) => state.block(0),
            BlockId::Number(_) => state.block(state.head),
            BlockId::Hash(hash) => state
                .blocks
                .values()
                .find(|b| b.hash == hash.block_hash)
                .cloned()
                .or_else(|| (0..=state.head).find_map(|n| state.block(n).filter(|b| b.hash == hash.block_hash))),
        })
    }

    async fn transaction_receipt(&self, hash: B256) -> Result<Option<TxReceipt>, ProviderError> {
        self.receipt_queries.fetch_add(1, Ordering::SeqCst);
        Ok(self.state().receipts.get(&hash).cloned())
    }

    async fn logs(&self, filter: &Filter) -> Result<Vec<Log>, ProviderError> {
        self.log_queries.fetch_add(1, Ordering::SeqCst);
        Ok(self.state().logs.iter().filter(|log| log_matches(filter, log)).cloned().collect())
    }

    async fn call(&self, tx: TransactionRequest) -> Result<Bytes, ProviderError> {
        self.answer_call(&tx)
    }

    async fn estimate_gas(&self, _tx: TransactionRequest) -> Result<u64, ProviderError> {
        Ok(self.state().gas_estimate)
    }

    async fn gas_price(&self) -> Result<u128, ProviderError> {
        Ok(self.state().gas_price)
    }
}
