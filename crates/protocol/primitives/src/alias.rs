//! L1 -> L2 address aliasing.
//!
//! Contract senders on L1 are represented on L2 by their address shifted by a constant
//! offset, so that an L1 contract can never impersonate an L2 contract at the same address.

use alloy_primitives::{Address, U160, address};

/// The offset added to an L1 contract address to obtain its L2 alias.
pub const ADDRESS_ALIAS_OFFSET: Address = address!("0x1111000000000000000000000000000000001111");

/// Returns the L2 alias of an L1 address.
pub fn apply_l1_to_l2_alias(address: Address) -> Address {
    let sum = U160::from_be_slice(address.as_slice())
        .wrapping_add(U160::from_be_slice(ADDRESS_ALIAS_OFFSET.as_slice()));
    Address::from_slice(&sum.to_be_bytes::<20>())
}

/// Returns the L1 address an L2 alias was derived from.
pub fn undo_l1_to_l2_alias(address: Address) -> Address {
    let diff = U160::from_be_slice(address.as_slice())
        .wrapping_sub(U160::from_be_slice(ADDRESS_ALIAS_OFFSET.as_slice()));
    Address::from_slice(&diff.to_be_bytes::<20>())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_alias() {
        let l1 = address!("0x0000000000000000000000000000000000000001");
        assert_eq!(
            apply_l1_to_l2_alias(l1),
            address!("0x1111000000000000000000000000000000001112")
        );
    }

    #[test]
    fn test_alias_wraps_around() {
        let l1 = address!("0xffffffffffffffffffffffffffffffffffffffff");
        assert_eq!(
            apply_l1_to_l2_alias(l1),
            address!("0x1111000000000000000000000000000000001110")
        );
    }

    #[test]
    fn test_undo_alias_inverts_apply() {
        let l1 = address!("0xeA3123E9d9911199a6711321d1277285e6d4F3EC");
        assert_eq!(undo_l1_to_l2_alias(apply_l1_to_l2_alias(l1)), l1);
    }
}
