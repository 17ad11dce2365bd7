//! Read or write access to a chain, chosen once.

use crate::{BridgeProvider, BridgeSigner};
use std::sync::Arc;

/// The access a message has to its chain.
///
/// Readers can only resolve statuses. Writers can also send the transactions that move a
/// message forward.
#[derive(Debug, Clone)]
pub enum MessageHandle<P> {
    /// Read-only access.
    Reader(P),
    /// Read access through `provider`, and a signer sending transactions on the same chain.
    Writer {
        /// The provider.
        provider: P,
        /// The signer.
        signer: Arc<dyn BridgeSigner>,
    },
}

impl<P: BridgeProvider> MessageHandle<P> {
    /// Creates a read-only handle.
    pub const fn reader(provider: P) -> Self {
        Self::Reader(provider)
    }

    /// Creates a handle that can send transactions.
    pub fn writer(provider: P, signer: Arc<dyn BridgeSigner>) -> Self {
        Self::Writer { provider, signer }
    }

    /// The provider.
    pub const fn provider(&self) -> &P {
        match self {
            Self::Reader(provider) | Self::Writer { provider, .. } => provider,
        }
    }

    /// The signer, if the handle can send transactions.
    pub const fn signer(&self) -> Option<&Arc<dyn BridgeSigner>> {
        match self {
            Self::Reader(_) => None,
            Self::Writer { signer, .. } => Some(signer),
        }
    }
}
