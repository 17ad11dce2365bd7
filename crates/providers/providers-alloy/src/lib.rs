#![doc = include_str!("../README.md")]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

mod errors;
pub use errors::map_rpc_error;

mod provider;
pub use provider::AlloyBridgeProvider;

mod signer;
pub use signer::AlloySigner;
