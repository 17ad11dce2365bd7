//! Payloads carried by `InboxMessageDelivered` events.

use alloy_primitives::{Address, B256, Bytes, U256};
use thiserror::Error;

/// Size of a single ABI word.
const WORD: usize = 32;

/// Number of fixed words preceding the calldata in a retryable submission payload.
const RETRYABLE_HEADER_WORDS: usize = 9;

/// Errors raised while decoding inbox message payloads.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The payload is shorter than its fixed-size prefix.
    #[error("inbox message payload too short: expected at least {expected} bytes, got {actual}")]
    TooShort {
        /// The minimum expected length.
        expected: usize,
        /// The actual payload length.
        actual: usize,
    },
    /// The calldata length word does not fit in the payload.
    #[error("retryable calldata length {0} exceeds the payload")]
    CalldataLength(U256),
}

/// The kind byte attached to every message delivered to the bridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
#[repr(u8)]
pub enum InboxMessageKind {
    /// A signed L2 transaction forwarded through the delayed inbox.
    #[display("L2MessageType_signedTx")]
    L2MessageSignedTx = 4,
    /// A retryable ticket submission.
    #[display("L1MessageType_submitRetryableTx")]
    SubmitRetryableTx = 9,
    /// A plain ETH deposit.
    #[display("L1MessageType_ethDeposit")]
    EthDeposit = 12,
}

impl TryFrom<u8> for InboxMessageKind {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            4 => Ok(Self::L2MessageSignedTx),
            9 => Ok(Self::SubmitRetryableTx),
            12 => Ok(Self::EthDeposit),
            other => Err(other),
        }
    }
}

/// The parameters of a retryable ticket, as submitted to the inbox.
///
/// Parsed once from the `InboxMessageDelivered` payload and never mutated afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetryableMessageParams {
    /// The L2 destination of the ticket. The zero address denotes a contract creation.
    pub dest_address: Address,
    /// Call value forwarded to the destination on L2.
    pub l2_call_value: U256,
    /// Value sent along with the L1 submission.
    pub l1_value: U256,
    /// Maximum fee paid for submitting the ticket.
    pub max_submission_fee: U256,
    /// Receives the unused part of the fees.
    pub excess_fee_refund_address: Address,
    /// Receives the call value if the ticket is cancelled or expires.
    pub call_value_refund_address: Address,
    /// Gas limit of the L2 execution.
    pub gas_limit: U256,
    /// Maximum fee per gas of the L2 execution.
    pub max_fee_per_gas: U256,
    /// Calldata of the L2 execution.
    pub data: Bytes,
}

impl RetryableMessageParams {
    /// Decodes the payload of an `InboxMessageDelivered` event for a
    /// [`InboxMessageKind::SubmitRetryableTx`] message.
    ///
    /// The payload holds nine 32-byte words followed by the calldata. The calldata length is
    /// the ninth word and the calldata itself is read from the tail of the payload.
    pub fn decode(payload: &[u8]) -> Result<Self, ParseError> {
        let header = RETRYABLE_HEADER_WORDS * WORD;
        if payload.len() < header {
            return Err(ParseError::TooShort { expected: header, actual: payload.len() });
        }

        let word = |i: usize| U256::from_be_slice(&payload[i * WORD..(i + 1) * WORD]);
        let address = |i: usize| Address::from_word(B256::from_slice(&payload[i * WORD..(i + 1) * WORD]));

        let data_len = word(8);
        let data_start = usize::try_from(data_len)
            .ok()
            .filter(|len| header.checked_add(*len).is_some_and(|end| end <= payload.len()))
            .and_then(|len| payload.len().checked_sub(len))
            .ok_or(ParseError::CalldataLength(data_len))?;

        Ok(Self {
            dest_address: address(0),
            l2_call_value: word(1),
            l1_value: word(2),
            max_submission_fee: word(3),
            excess_fee_refund_address: address(4),
            call_value_refund_address: address(5),
            gas_limit: word(6),
            max_fee_per_gas: word(7),
            data: Bytes::copy_from_slice(&payload[data_start..]),
        })
    }

    /// Encodes the parameters the way the inbox emits them.
    pub fn encode(&self) -> Bytes {
        let mut out = Vec::with_capacity(RETRYABLE_HEADER_WORDS * WORD + self.data.len());
        out.extend_from_slice(self.dest_address.into_word().as_slice());
        out.extend_from_slice(&self.l2_call_value.to_be_bytes::<32>());
        out.extend_from_slice(&self.l1_value.to_be_bytes::<32>());
        out.extend_from_slice(&self.max_submission_fee.to_be_bytes::<32>());
        out.extend_from_slice(self.excess_fee_refund_address.into_word().as_slice());
        out.extend_from_slice(self.call_value_refund_address.into_word().as_slice());
        out.extend_from_slice(&self.gas_limit.to_be_bytes::<32>());
        out.extend_from_slice(&self.max_fee_per_gas.to_be_bytes::<32>());
        out.extend_from_slice(&U256::from(self.data.len()).to_be_bytes::<32>());
        out.extend_from_slice(&self.data);
        out.into()
    }
}

/// The payload of an [`InboxMessageKind::EthDeposit`] message.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EthDepositData {
    /// The L2 recipient.
    pub to: Address,
    /// The deposited amount in wei.
    pub value: U256,
}

impl EthDepositData {
    /// Size of the packed `(address, uint256)` payload.
    pub const LENGTH: usize = 20 + WORD;

    /// Decodes a packed `(address to, uint256 value)` payload.
    pub fn decode(payload: &[u8]) -> Result<Self, ParseError> {
        if payload.len() < Self::LENGTH {
            return Err(ParseError::TooShort { expected: Self::LENGTH, actual: payload.len() });
        }
        Ok(Self {
            to: Address::from_slice(&payload[..20]),
            value: U256::from_be_slice(&payload[20..Self::LENGTH]),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{address, bytes};
    use rstest::rstest;

    fn sample_params() -> RetryableMessageParams {
        RetryableMessageParams {
            dest_address: address!("0x6c2e2bb1fcd48c4a1e6dfbd8e7cd7c06e8ee7fe7"),
            l2_call_value: U256::from(1_000u64),
            l1_value: U256::from(2_000u64),
            max_submission_fee: U256::from(300u64),
            excess_fee_refund_address: address!("0x1111111111111111111111111111111111111111"),
            call_value_refund_address: address!("0x2222222222222222222222222222222222222222"),
            gas_limit: U256::from(100_000u64),
            max_fee_per_gas: U256::from(1_000_000_000u64),
            data: bytes!("deadbeefcafe"),
        }
    }

    #[test]
    fn test_decode_retryable_params() {
        let params = sample_params();
        let decoded = RetryableMessageParams::decode(&params.encode()).unwrap();
        assert_eq!(decoded, params);
    }

    #[test]
    fn test_decode_retryable_empty_calldata() {
        let params = RetryableMessageParams { data: Bytes::new(), ..sample_params() };
        let encoded = params.encode();
        assert_eq!(encoded.len(), 9 * 32);
        assert_eq!(RetryableMessageParams::decode(&encoded).unwrap().data, Bytes::new());
    }

    #[test]
    fn test_decode_retryable_too_short() {
        let err = RetryableMessageParams::decode(&[0u8; 100]).unwrap_err();
        assert_eq!(err, ParseError::TooShort { expected: 288, actual: 100 });
    }

    #[test]
    fn test_decode_retryable_calldata_length_overflow() {
        let mut encoded = sample_params().encode().to_vec();
        encoded[8 * 32 + 31] = 0xff;
        assert!(matches!(
            RetryableMessageParams::decode(&encoded),
            Err(ParseError::CalldataLength(_))
        ));
    }

    #[test]
    fn test_decode_retryable_calldata_length_near_usize_max() {
        let mut encoded = RetryableMessageParams { data: Bytes::new(), ..sample_params() }
            .encode()
            .to_vec();
        let len = U256::from(usize::MAX - 100);
        encoded[8 * 32..9 * 32].copy_from_slice(&len.to_be_bytes::<32>());
        assert_eq!(RetryableMessageParams::decode(&encoded), Err(ParseError::CalldataLength(len)));
    }

    #[test]
    fn test_decode_retryable_calldata_length_above_u64() {
        let mut encoded = sample_params().encode().to_vec();
        encoded[8 * 32] = 0x01;
        assert!(matches!(
            RetryableMessageParams::decode(&encoded),
            Err(ParseError::CalldataLength(_))
        ));
    }

    #[test]
    fn test_decode_eth_deposit() {
        let mut payload = address!("0x3333333333333333333333333333333333333333").to_vec();
        payload.extend_from_slice(&U256::from(42u64).to_be_bytes::<32>());
        let data = EthDepositData::decode(&payload).unwrap();
        assert_eq!(data.to, address!("0x3333333333333333333333333333333333333333"));
        assert_eq!(data.value, U256::from(42u64));
    }

    #[test]
    fn test_decode_eth_deposit_too_short() {
        assert!(EthDepositData::decode(&[0u8; 51]).is_err());
    }

    #[rstest]
    #[case(4, Some(InboxMessageKind::L2MessageSignedTx))]
    #[case(9, Some(InboxMessageKind::SubmitRetryableTx))]
    #[case(12, Some(InboxMessageKind::EthDeposit))]
    #[case(3, None)]
    fn test_inbox_message_kind(#[case] raw: u8, #[case] expected: Option<InboxMessageKind>) {
        assert_eq!(InboxMessageKind::try_from(raw).ok(), expected);
    }
}
