//! Conversion of alloy transport errors.

use alloy_transport::{RpcError, TransportError};
use arb_messages::ProviderError;

/// JSON-RPC error code of reverted calls.
const EXECUTION_REVERTED_CODE: i64 = 3;

/// Maps an alloy transport error to a [`ProviderError`].
///
/// Error responses are reverts when the node says so, either through the error code, the
/// revert data, or the message. Any other error response is a transport failure.
pub fn map_rpc_error(err: TransportError) -> ProviderError {
    match err {
        RpcError::ErrorResp(payload) => {
            let data = payload.as_revert_data();
            if payload.code == EXECUTION_REVERTED_CODE ||
                data.is_some() ||
                payload.message.contains("revert")
            {
                ProviderError::Reverted { message: payload.message.to_string(), data }
            } else {
                ProviderError::Transport(payload.to_string())
            }
        }
        RpcError::DeserError { err, text } => {
            tracing::trace!(target: "alloy_provider", %text, "undecodable response");
            ProviderError::Decode(err.to_string())
        }
        err => ProviderError::Transport(err.to_string()),
    }
}
