#![doc = include_str!("../README.md")]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

mod alias;
pub use alias::{ADDRESS_ALIAS_OFFSET, apply_l1_to_l2_alias, undo_l1_to_l2_alias};

mod ids;
pub use ids::{
    DEPOSIT_TX_TYPE, SUBMIT_RETRYABLE_TX_TYPE, auto_redeem_id, classic_retryable_creation_id,
    deposit_tx_id, retryable_l2_tx_hash, submit_retryable_id,
};

mod params;
pub use params::{EthDepositData, InboxMessageKind, ParseError, RetryableMessageParams};

mod status;
pub use status::{EthDepositStatus, L1ToL2MessageStatus, L2ToL1MessageStatus};

mod network;
pub use network::{
    ArbitrumNetwork, EthBridge, NETWORKS, NetworkError, network_by_chain_id, network_by_name,
};

mod constants;
pub use constants::{
    ASSERTION_CONFIRMED_PADDING, ASSERTION_CREATED_PADDING, DEFAULT_DEPOSIT_TIMEOUT,
    DEFAULT_RETRYABLE_LIFETIME_SECONDS, SECONDS_PER_DAY,
};
