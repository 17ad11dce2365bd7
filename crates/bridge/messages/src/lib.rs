#![doc = include_str!("../README.md")]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

mod errors;
pub use errors::{MessageError, ProviderError};

mod types;
pub use types::{ArbBlock, TxOverrides, TxReceipt};

mod traits;
pub use traits::{BridgeProvider, BridgeSigner};
#[cfg(test)]
pub use traits::MockBridgeSigner;

mod contract;
pub use contract::{contract_call, payable_contract_call, read_contract};

mod events;
pub use events::{EventFetcher, EventFilter, FetchedEvent, parse_typed_logs};

mod poll;
pub use poll::{DEFAULT_POLL_INTERVAL, PollConfig, poll_until};

mod cache;
pub use cache::{BlockRange, BlockRangeCache, BlockRangeKey, DEFAULT_BLOCK_RANGE_CACHE_SIZE};

pub mod search;

mod handle;
pub use handle::MessageHandle;

mod receipts;
pub use receipts::{
    ChildMessages, EthDepositWaitResult, L1ToL2WaitResult, L1TransactionReceipt,
    L2TransactionReceipt, MessageEvents, RedeemTransaction,
};

mod retryable;
pub use retryable::{
    ClassicL1ToL2MessageReader, L1ToL2Message, L1ToL2MessageReader, L1ToL2MessageWriter,
    RedeemResult,
};

mod deposit;
pub use deposit::EthDepositMessage;

mod withdrawal;
pub use withdrawal::{
    ClassicL2ToL1MessageReader, L2ToL1Message, L2ToL1MessageReader, L2ToL1MessageWriter,
    MessageBatchProofInfo, NitroL2ToL1MessageReader, SendProps, WithdrawalEvent, WithdrawalQuery,
    get_l2_to_l1_events,
};

mod gas;
pub use gas::{
    DEFAULT_GAS_PRICE_PERCENT_INCREASE, DEFAULT_SENDER_DEPOSIT,
    DEFAULT_SUBMISSION_FEE_PERCENT_INCREASE, GasEstimate, GasOverrides, L1ToL2MessageCreator,
    L1ToL2MessageGasEstimator, L1ToL2MessageParams, L1ToL2TransactionRequest, PercentIncrease,
    RetryableData, TicketRequest, percent_increase,
};

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
