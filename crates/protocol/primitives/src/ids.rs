//! Deterministic identifiers of L1 -> L2 messages.
//!
//! Nitro identifies retryable submissions and ETH deposits by the hash of an EIP-2718 style
//! envelope: a single type byte followed by the RLP list of the message fields. The ids must
//! match the hashes ArbOS assigns to the resulting L2 transactions byte for byte, since they
//! are used to look up the receipts on L2.

use crate::RetryableMessageParams;
use alloy_primitives::{Address, B256, Bytes, U256, keccak256};
use alloy_rlp::{Encodable, Header};

/// Type byte of the `ArbitrumSubmitRetryableTx` envelope.
pub const SUBMIT_RETRYABLE_TX_TYPE: u8 = 0x69;

/// Type byte of the `ArbitrumDepositTx` envelope.
pub const DEPOSIT_TX_TYPE: u8 = 0x64;

/// Prepends `ty` to the RLP list of `fields`.
fn typed_envelope(ty: u8, fields: &[&dyn Encodable]) -> Vec<u8> {
    let payload_length = fields.iter().map(|f| f.length()).sum::<usize>();
    let header = Header { list: true, payload_length };
    let mut out = Vec::with_capacity(1 + header.length() + payload_length);
    out.push(ty);
    header.encode(&mut out);
    for field in fields {
        field.encode(&mut out);
    }
    out
}

/// The RLP encoding of the destination field. Contract creations (zero destination) are encoded
/// as the empty string rather than twenty zero bytes.
fn destination_field(dest: Address) -> Bytes {
    if dest.is_zero() { Bytes::new() } else { Bytes::copy_from_slice(dest.as_slice()) }
}

fn submit_retryable_envelope(
    l2_chain_id: u64,
    from: Address,
    message_number: U256,
    l1_base_fee: U256,
    params: &RetryableMessageParams,
) -> Vec<u8> {
    let chain_id = U256::from(l2_chain_id);
    let message_number = B256::from(message_number);
    let dest = destination_field(params.dest_address);
    typed_envelope(
        SUBMIT_RETRYABLE_TX_TYPE,
        &[
            &chain_id,
            &message_number,
            &from,
            &l1_base_fee,
            &params.l1_value,
            &params.max_fee_per_gas,
            &params.gas_limit,
            &dest,
            &params.l2_call_value,
            &params.call_value_refund_address,
            &params.max_submission_fee,
            &params.excess_fee_refund_address,
            &params.data,
        ],
    )
}

/// Computes the id of the L2 transaction that creates a nitro retryable ticket.
///
/// `from` is the (aliased) sender recorded by the bridge and `message_number` the bridge's
/// message index.
pub fn submit_retryable_id(
    l2_chain_id: u64,
    from: Address,
    message_number: U256,
    l1_base_fee: U256,
    params: &RetryableMessageParams,
) -> B256 {
    keccak256(submit_retryable_envelope(l2_chain_id, from, message_number, l1_base_fee, params))
}

/// Computes the hash of the L2 transaction that credits a nitro ETH deposit.
pub fn deposit_tx_id(
    l2_chain_id: u64,
    message_number: U256,
    from: Address,
    to: Address,
    value: U256,
) -> B256 {
    let chain_id = U256::from(l2_chain_id);
    let message_number = B256::from(message_number);
    keccak256(typed_envelope(DEPOSIT_TX_TYPE, &[&chain_id, &message_number, &from, &to, &value]))
}

/// Sets bit 255 of a classic message number, separating retryable creation hashes from
/// ordinary transaction hashes in the same sequence space.
fn bit_flip(message_number: U256) -> U256 {
    message_number | (U256::from(1u8) << 255)
}

/// Computes the retryable creation id of a classic (pre-nitro) ticket.
pub fn classic_retryable_creation_id(l2_chain_id: u64, message_number: U256) -> B256 {
    let mut preimage = [0u8; 64];
    preimage[..32].copy_from_slice(&U256::from(l2_chain_id).to_be_bytes::<32>());
    preimage[32..].copy_from_slice(&bit_flip(message_number).to_be_bytes::<32>());
    keccak256(preimage)
}

fn derived_hash(retryable_creation_id: B256, discriminant: u64) -> B256 {
    let mut preimage = [0u8; 64];
    preimage[..32].copy_from_slice(retryable_creation_id.as_slice());
    preimage[32..].copy_from_slice(&U256::from(discriminant).to_be_bytes::<32>());
    keccak256(preimage)
}

/// Computes the hash of the auto-redeem attempt of a classic ticket.
pub fn auto_redeem_id(retryable_creation_id: B256) -> B256 {
    derived_hash(retryable_creation_id, 1)
}

/// Computes the hash of the L2 transaction executed by a classic ticket.
pub fn retryable_l2_tx_hash(retryable_creation_id: B256) -> B256 {
    derived_hash(retryable_creation_id, 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{address, bytes};
    use proptest::prelude::*;

    fn params() -> RetryableMessageParams {
        RetryableMessageParams {
            dest_address: address!("0xEA3123E9D9911199A6711321D1277285E6D4F3EC"),
            l2_call_value: U256::from(1_000_000_000_000_000_000u128),
            l1_value: U256::from(1_001_000_000_000_000_000u128),
            max_submission_fee: U256::from(0x3c6c1d1a1u64),
            excess_fee_refund_address: address!("0xeA3123E9d9911199a6711321d1277285e6d4F3EC"),
            call_value_refund_address: address!("0xeA3123E9d9911199a6711321d1277285e6d4F3EC"),
            gas_limit: U256::from(0x0210f1u64),
            max_fee_per_gas: U256::from(0x172c5350u64),
            data: bytes!("00"),
        }
    }

    const FROM: Address = address!("0xfa3123e9d9911199a6711321d1277285e6d4f3ec");

    #[test]
    fn test_submit_retryable_id_is_deterministic() {
        let a = submit_retryable_id(412346, FROM, U256::ZERO, U256::from(25u64), &params());
        let b = submit_retryable_id(412346, FROM, U256::ZERO, U256::from(25u64), &params());
        assert_eq!(a, b);
    }

    #[test]
    fn test_submit_retryable_id_depends_on_every_field() {
        let base = params();
        let id = submit_retryable_id(412346, FROM, U256::ZERO, U256::from(25u64), &base);

        let variants = [
            RetryableMessageParams { gas_limit: base.gas_limit + U256::from(1u64), ..base.clone() },
            RetryableMessageParams { l1_value: U256::ZERO, ..base.clone() },
            RetryableMessageParams { l2_call_value: U256::ZERO, ..base.clone() },
            RetryableMessageParams { max_fee_per_gas: U256::from(1u64), ..base.clone() },
            RetryableMessageParams { max_submission_fee: U256::ZERO, ..base.clone() },
            RetryableMessageParams { excess_fee_refund_address: Address::ZERO, ..base.clone() },
            RetryableMessageParams { call_value_refund_address: Address::ZERO, ..base.clone() },
            RetryableMessageParams { data: Bytes::new(), ..base.clone() },
        ];
        for variant in variants {
            assert_ne!(id, submit_retryable_id(412346, FROM, U256::ZERO, U256::from(25u64), &variant));
        }

        assert_ne!(id, submit_retryable_id(412347, FROM, U256::ZERO, U256::from(25u64), &base));
        assert_ne!(id, submit_retryable_id(412346, FROM, U256::from(1u64), U256::from(25u64), &base));
        assert_ne!(id, submit_retryable_id(412346, FROM, U256::ZERO, U256::from(26u64), &base));
        assert_ne!(id, submit_retryable_id(412346, Address::ZERO, U256::ZERO, U256::from(25u64), &base));
    }

    #[test]
    fn test_submit_retryable_envelope_layout() {
        let params = RetryableMessageParams {
            call_value_refund_address: address!("0x2222222222222222222222222222222222222222"),
            excess_fee_refund_address: address!("0x3333333333333333333333333333333333333333"),
            ..Default::default()
        };
        let from = address!("0x1111111111111111111111111111111111111111");
        let envelope = submit_retryable_envelope(1, from, U256::ZERO, U256::ZERO, &params);

        // chain id (1) + padded message number (33) + from (21) + four zero numbers (4)
        // + destination (1) + call value (1) + refund (21) + submission fee (1) + refund (21)
        // + data (1)
        assert_eq!(envelope.len(), 1 + 2 + 105);
        assert_eq!(&envelope[..4], &[0x69, 0xf8, 105, 0x01]);
        assert_eq!(envelope[4], 0xa0);
        assert!(envelope[5..37].iter().all(|b| *b == 0));
        assert_eq!(envelope[37], 0x94);
        assert_eq!(&envelope[38..58], from.as_slice());
        assert_eq!(&envelope[58..62], &[0x80; 4]);
        // Zero destination is the empty string, not twenty zero bytes.
        assert_eq!(envelope[62], 0x80);
        assert_eq!(*envelope.last().unwrap(), 0x80);
    }

    #[test]
    fn test_zero_destination_changes_id() {
        let zero_dest = RetryableMessageParams { dest_address: Address::ZERO, ..params() };
        let envelope = submit_retryable_envelope(1, FROM, U256::ZERO, U256::ZERO, &zero_dest);
        let with_dest = submit_retryable_envelope(1, FROM, U256::ZERO, U256::ZERO, &params());
        assert_eq!(with_dest.len() - envelope.len(), 20);
        assert_ne!(
            submit_retryable_id(1, FROM, U256::ZERO, U256::ZERO, &zero_dest),
            submit_retryable_id(1, FROM, U256::ZERO, U256::ZERO, &params())
        );
    }

    #[test]
    fn test_deposit_tx_id_depends_on_value() {
        let to = address!("0x3333333333333333333333333333333333333333");
        let a = deposit_tx_id(42161, U256::from(7u64), FROM, to, U256::from(1u64));
        let b = deposit_tx_id(42161, U256::from(7u64), FROM, to, U256::from(2u64));
        assert_ne!(a, b);
        assert_eq!(a, deposit_tx_id(42161, U256::from(7u64), FROM, to, U256::from(1u64)));
    }

    #[test]
    fn test_auto_redeem_and_l2_tx_hash_differ() {
        let creation = classic_retryable_creation_id(42161, U256::from(100u64));
        assert_ne!(auto_redeem_id(creation), retryable_l2_tx_hash(creation));
    }

    proptest! {
        #[test]
        fn test_bit_flip_sets_top_bit(n in any::<u64>()) {
            let flipped = bit_flip(U256::from(n));
            prop_assert!(flipped.bit(255));
            prop_assert_eq!(flipped & U256::from(u64::MAX), U256::from(n));
        }

        #[test]
        fn test_classic_id_never_collides_with_unflipped(n in any::<u64>(), chain_id in 1u64..1_000_000) {
            let mut unflipped = [0u8; 64];
            unflipped[..32].copy_from_slice(&U256::from(chain_id).to_be_bytes::<32>());
            unflipped[32..].copy_from_slice(&U256::from(n).to_be_bytes::<32>());
            prop_assert_ne!(classic_retryable_creation_id(chain_id, U256::from(n)), keccak256(unflipped));
        }

        #[test]
        fn test_message_number_changes_id(a in any::<u64>(), b in any::<u64>()) {
            prop_assume!(a != b);
            prop_assert_ne!(
                submit_retryable_id(1, FROM, U256::from(a), U256::ZERO, &params()),
                submit_retryable_id(1, FROM, U256::from(b), U256::ZERO, &params())
            );
        }
    }
}
