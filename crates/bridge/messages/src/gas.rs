//! Pricing and creation of retryable tickets.

use crate::{
    BridgeProvider, BridgeSigner, L1TransactionReceipt, MessageError, TxOverrides,
    contract::{contract_call, payable_contract_call, read_contract},
};
use alloy_eips::BlockId;
use alloy_primitives::{Address, Bytes, U256};
use alloy_rpc_types_eth::TransactionRequest;
use arb_bindings::{IInbox, INodeInterface, addresses::NODE_INTERFACE};
use arb_primitives::ArbitrumNetwork;
use std::sync::Arc;

/// Default increase applied to the estimated submission fee, in percent.
pub const DEFAULT_SUBMISSION_FEE_PERCENT_INCREASE: u64 = 300;

/// Default increase applied to the L2 gas price, in percent.
pub const DEFAULT_GAS_PRICE_PERCENT_INCREASE: u64 = 500;

/// Deposit the ticket sender is assumed to hold on top of the call value while estimating the
/// gas limit: one ether.
pub const DEFAULT_SENDER_DEPOSIT: U256 = U256::from_limbs([1_000_000_000_000_000_000, 0, 0, 0]);

/// Returns `num` increased by `increase` percent.
pub fn percent_increase(num: U256, increase: U256) -> U256 {
    num.saturating_add(num.saturating_mul(increase) / U256::from(100u64))
}

/// An estimate override: a fixed base replacing the estimate, and the increase applied to it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PercentIncrease {
    /// Used instead of the estimate when set.
    pub base: Option<U256>,
    /// Increase applied to the base, in percent.
    pub percent_increase: Option<U256>,
}

impl PercentIncrease {
    fn apply(&self, estimate: U256, default_increase: u64) -> U256 {
        percent_increase(
            self.base.unwrap_or(estimate),
            self.percent_increase.unwrap_or(U256::from(default_increase)),
        )
    }
}

/// Overrides of the ticket gas estimates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GasOverrides {
    /// The L2 gas limit of the ticket.
    pub gas_limit: PercentIncrease,
    /// Lower bound of the L2 gas limit.
    pub min_gas_limit: Option<U256>,
    /// The max submission fee.
    pub max_submission_fee: PercentIncrease,
    /// The max fee per gas.
    pub max_fee_per_gas: PercentIncrease,
    /// The deposit, used instead of the computed one when set.
    pub deposit: Option<U256>,
}

/// What a ticket is asked to do on L2.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct L1ToL2MessageParams {
    /// The L1 sender.
    pub from: Address,
    /// The L2 destination.
    pub to: Address,
    /// The value passed to the destination.
    pub l2_call_value: U256,
    /// Refund address of unused fees. Defaults to `from`.
    pub excess_fee_refund_address: Option<Address>,
    /// Refund address of the call value. Defaults to `from`.
    pub call_value_refund_address: Option<Address>,
    /// The calldata passed to the destination.
    pub data: Bytes,
}

impl L1ToL2MessageParams {
    fn excess_fee_refund_address(&self) -> Address {
        self.excess_fee_refund_address.unwrap_or(self.from)
    }

    fn call_value_refund_address(&self) -> Address {
        self.call_value_refund_address.unwrap_or(self.from)
    }
}

/// The gas parameters of a ticket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GasEstimate {
    /// The L2 gas limit.
    pub gas_limit: U256,
    /// The max fee paid for storing the ticket.
    pub max_submission_cost: U256,
    /// The max L2 fee per gas.
    pub max_fee_per_gas: U256,
    /// The L1 value covering the fees and the call value.
    pub deposit: U256,
}

/// The fully priced arguments of `Inbox.createRetryableTicket`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RetryableData {
    /// The L1 sender.
    pub from: Address,
    /// The L2 destination.
    pub to: Address,
    /// The value passed to the destination.
    pub l2_call_value: U256,
    /// The L1 value sent along.
    pub deposit: U256,
    /// The max submission fee.
    pub max_submission_cost: U256,
    /// Refund address of unused fees.
    pub excess_fee_refund_address: Address,
    /// Refund address of the call value.
    pub call_value_refund_address: Address,
    /// The L2 gas limit.
    pub gas_limit: U256,
    /// The max L2 fee per gas.
    pub max_fee_per_gas: U256,
    /// The calldata passed to the destination.
    pub data: Bytes,
}

impl RetryableData {
    /// The inbox call creating the ticket.
    pub fn create_call(&self) -> IInbox::createRetryableTicketCall {
        IInbox::createRetryableTicketCall {
            to: self.to,
            l2CallValue: self.l2_call_value,
            maxSubmissionCost: self.max_submission_cost,
            excessFeeRefundAddress: self.excess_fee_refund_address,
            callValueRefundAddress: self.call_value_refund_address,
            gasLimit: self.gas_limit,
            maxFeePerGas: self.max_fee_per_gas,
            data: self.data.clone(),
        }
    }
}

/// A ticket creation transaction, ready to be signed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct L1ToL2TransactionRequest {
    /// The L1 transaction.
    pub tx_request: TransactionRequest,
    /// The ticket arguments the transaction carries.
    pub retryable_data: RetryableData,
}

impl L1ToL2TransactionRequest {
    /// Returns `true` if the fees of the request still cover a fresh estimate.
    pub async fn is_valid<P: BridgeProvider + Clone>(
        &self,
        l1_provider: &P,
        l2_provider: &P,
        network: &ArbitrumNetwork,
    ) -> Result<bool, MessageError> {
        let data = &self.retryable_data;
        let params = L1ToL2MessageParams {
            from: data.from,
            to: data.to,
            l2_call_value: data.l2_call_value,
            excess_fee_refund_address: Some(data.excess_fee_refund_address),
            call_value_refund_address: Some(data.call_value_refund_address),
            data: data.data.clone(),
        };
        let estimate = L1ToL2MessageGasEstimator::new(l2_provider.clone())
            .estimate_all(l1_provider, network, &params, &GasOverrides::default())
            .await?;
        Ok(data.max_submission_cost >= estimate.max_submission_cost &&
            data.max_fee_per_gas >= estimate.max_fee_per_gas)
    }
}

/// A ticket to create: raw parameters still to be priced, or an already priced request.
#[derive(Debug, Clone, PartialEq)]
pub enum TicketRequest {
    /// Parameters priced at submission.
    Raw(L1ToL2MessageParams),
    /// A priced request submitted as is.
    Prepared(L1ToL2TransactionRequest),
}

/// Estimates the gas parameters of retryable tickets.
#[derive(Debug, Clone)]
pub struct L1ToL2MessageGasEstimator<P> {
    l2_provider: P,
}

impl<P: BridgeProvider> L1ToL2MessageGasEstimator<P> {
    /// Creates an estimator pricing tickets on the chain served by `l2_provider`.
    pub const fn new(l2_provider: P) -> Self {
        Self { l2_provider }
    }

    /// Estimates the max submission fee of a ticket carrying `data_length` bytes of calldata.
    pub async fn estimate_submission_fee<L: BridgeProvider + ?Sized>(
        &self,
        l1_provider: &L,
        network: &ArbitrumNetwork,
        l1_base_fee: U256,
        data_length: usize,
        options: &PercentIncrease,
    ) -> Result<U256, MessageError> {
        let estimate = match options.base {
            Some(base) => base,
            None => {
                let call = IInbox::calculateRetryableSubmissionFeeCall {
                    dataLength: U256::from(data_length),
                    baseFee: l1_base_fee,
                };
                read_contract(l1_provider, network.eth_bridge.inbox, call).await?
            }
        };
        Ok(options.apply(estimate, DEFAULT_SUBMISSION_FEE_PERCENT_INCREASE))
    }

    /// Estimates the max fee per gas from the L2 gas price.
    pub async fn estimate_max_fee_per_gas(
        &self,
        options: &PercentIncrease,
    ) -> Result<U256, MessageError> {
        let estimate = match options.base {
            Some(base) => base,
            None => U256::from(self.l2_provider.gas_price().await?),
        };
        Ok(options.apply(estimate, DEFAULT_GAS_PRICE_PERCENT_INCREASE))
    }

    /// Estimates the L2 gas used by executing the ticket.
    ///
    /// The sender is assumed to hold `sender_deposit` (one ether by default) on top of the call
    /// value.
    pub async fn estimate_retryable_ticket_gas_limit(
        &self,
        params: &L1ToL2MessageParams,
        sender_deposit: Option<U256>,
    ) -> Result<U256, MessageError> {
        let call = INodeInterface::estimateRetryableTicketCall {
            sender: params.from,
            deposit: sender_deposit
                .unwrap_or(DEFAULT_SENDER_DEPOSIT)
                .saturating_add(params.l2_call_value),
            to: params.to,
            l2CallValue: params.l2_call_value,
            excessFeeRefundAddress: params.excess_fee_refund_address(),
            callValueRefundAddress: params.call_value_refund_address(),
            data: params.data.clone(),
        };
        let gas = self.l2_provider.estimate_gas(contract_call(NODE_INTERFACE, &call)).await?;
        Ok(U256::from(gas))
    }

    /// Estimates every gas parameter of a ticket, pricing its submission at the current L1 base
    /// fee.
    pub async fn estimate_all<L: BridgeProvider + ?Sized>(
        &self,
        l1_provider: &L,
        network: &ArbitrumNetwork,
        params: &L1ToL2MessageParams,
        overrides: &GasOverrides,
    ) -> Result<GasEstimate, MessageError> {
        let latest = BlockId::latest();
        let block =
            l1_provider.block(latest).await?.ok_or(MessageError::BlockNotFound(latest))?;
        let l1_base_fee = block.base_fee_per_gas.ok_or(MessageError::MissingBaseFee(block.number))?;

        let gas_limit = async {
            let estimate = match overrides.gas_limit.base {
                Some(base) => base,
                None => self.estimate_retryable_ticket_gas_limit(params, None).await?,
            };
            let gas_limit = overrides.gas_limit.apply(estimate, 0);
            Ok::<_, MessageError>(gas_limit.max(overrides.min_gas_limit.unwrap_or_default()))
        };
        let (gas_limit, max_submission_cost, max_fee_per_gas) = tokio::try_join!(
            gas_limit,
            self.estimate_submission_fee(
                l1_provider,
                network,
                l1_base_fee,
                params.data.len(),
                &overrides.max_submission_fee,
            ),
            self.estimate_max_fee_per_gas(&overrides.max_fee_per_gas),
        )?;

        let deposit = overrides.deposit.unwrap_or_else(|| {
            gas_limit
                .saturating_mul(max_fee_per_gas)
                .saturating_add(max_submission_cost)
                .saturating_add(params.l2_call_value)
        });
        tracing::debug!(
            target: "gas",
            %gas_limit,
            %max_submission_cost,
            %max_fee_per_gas,
            %deposit,
            "estimated retryable ticket"
        );
        Ok(GasEstimate { gas_limit, max_submission_cost, max_fee_per_gas, deposit })
    }
}

/// Creates retryable tickets through the inbox.
#[derive(Debug, Clone)]
pub struct L1ToL2MessageCreator {
    signer: Arc<dyn BridgeSigner>,
}

impl L1ToL2MessageCreator {
    /// Creates tickets sent by `signer` on L1.
    pub fn new(signer: Arc<dyn BridgeSigner>) -> Self {
        Self { signer }
    }

    /// Prices `params` and builds the transaction creating the ticket.
    pub async fn get_ticket_creation_request<P: BridgeProvider + Clone>(
        params: &L1ToL2MessageParams,
        l1_provider: &P,
        l2_provider: &P,
        network: &ArbitrumNetwork,
        overrides: &GasOverrides,
    ) -> Result<L1ToL2TransactionRequest, MessageError> {
        let estimate = L1ToL2MessageGasEstimator::new(l2_provider.clone())
            .estimate_all(l1_provider, network, params, overrides)
            .await?;
        let retryable_data = RetryableData {
            from: params.from,
            to: params.to,
            l2_call_value: params.l2_call_value,
            deposit: estimate.deposit,
            max_submission_cost: estimate.max_submission_cost,
            excess_fee_refund_address: params.excess_fee_refund_address(),
            call_value_refund_address: params.call_value_refund_address(),
            gas_limit: estimate.gas_limit,
            max_fee_per_gas: estimate.max_fee_per_gas,
            data: params.data.clone(),
        };
        let tx_request = payable_contract_call(
            network.eth_bridge.inbox,
            &retryable_data.create_call(),
            estimate.deposit,
        )
        .from(params.from);
        Ok(L1ToL2TransactionRequest { tx_request, retryable_data })
    }

    /// Sends the transaction creating the ticket and returns its L1 receipt.
    pub async fn create_retryable_ticket<P: BridgeProvider + Clone>(
        &self,
        request: TicketRequest,
        l1_provider: &P,
        l2_provider: &P,
        network: &ArbitrumNetwork,
        gas_overrides: &GasOverrides,
        overrides: &TxOverrides,
    ) -> Result<L1TransactionReceipt, MessageError> {
        let request = match request {
            TicketRequest::Raw(params) => {
                Self::get_ticket_creation_request(
                    &params,
                    l1_provider,
                    l2_provider,
                    network,
                    gas_overrides,
                )
                .await?
            }
            TicketRequest::Prepared(request) => request,
        };
        let tx = overrides.apply(request.tx_request, self.signer.address());
        tracing::info!(
            target: "gas",
            to = %request.retryable_data.to,
            deposit = %request.retryable_data.deposit,
            "creating retryable ticket"
        );
        Ok(L1TransactionReceipt::from(self.signer.send_transaction(tx).await?))
    }
}
