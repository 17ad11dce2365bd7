#![doc = include_str!("../README.md")]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

pub mod addresses;

mod bridge;
pub use bridge::{
    Assertion, ExecutionState, GlobalState, IBridge, IClassicOutbox, IInbox, IOutbox,
    IRollupCore, MachineStatus, Node,
};

mod precompiles;
pub use precompiles::{IArbRetryableTx, IArbSys, INodeInterface};
