//! Typed contract calls over a [`BridgeProvider`].

use crate::{BridgeProvider, ProviderError};
use alloy_primitives::{Address, Bytes, U256};
use alloy_rpc_types_eth::{TransactionInput, TransactionRequest};
use alloy_sol_types::SolCall;

/// Builds a transaction request invoking `call` on `address`.
pub fn contract_call<C: SolCall>(address: Address, call: &C) -> TransactionRequest {
    TransactionRequest::default()
        .to(address)
        .input(TransactionInput::new(Bytes::from(call.abi_encode())))
}

/// Builds a payable transaction request invoking `call` on `address`.
pub fn payable_contract_call<C: SolCall>(
    address: Address,
    call: &C,
    value: U256,
) -> TransactionRequest {
    contract_call(address, call).value(value)
}

/// Calls a view function and decodes its return value.
pub async fn read_contract<P, C>(
    provider: &P,
    address: Address,
    call: C,
) -> Result<C::Return, ProviderError>
where
    P: BridgeProvider + ?Sized,
    C: SolCall + Send,
{
    let output = provider.call(contract_call(address, &call)).await?;
    C::abi_decode_returns(&output).map_err(|e| ProviderError::Decode(e.to_string()))
}
