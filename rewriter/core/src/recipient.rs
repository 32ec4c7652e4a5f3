//! Recipient redirection policy
//!
//! Decides, for every recipient found in a settlement command or action,
//! whether it is replaced by the smart pool address.

use alloy_primitives::{Address, address};
use serde::Serialize;

/// Router sentinel meaning "the caller of execute".
///
/// Source: <https://github.com/Uniswap/v4-periphery/blob/main/src/libraries/ActionConstants.sol>
pub const MSG_SENDER: Address = address!("0x0000000000000000000000000000000000000001");

/// Router sentinel meaning "the router contract itself".
pub const ADDRESS_THIS: Address = address!("0x0000000000000000000000000000000000000002");

/// Reserved addresses that route funds instead of naming an account
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Sentinel {
    MsgSender,
    AddressThis,
}

impl Sentinel {
    pub fn from_address(address: Address) -> Option<Self> {
        if address == MSG_SENDER {
            Some(Self::MsgSender)
        } else if address == ADDRESS_THIS {
            Some(Self::AddressThis)
        } else {
            None
        }
    }
}

/// Outcome of classifying a recipient
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "sentinel")]
pub enum RecipientDecision {
    /// Recipient is already the redirect target
    AlreadyTarget,
    /// Recipient is a routing sentinel and must stay as it is
    Sentinel(Sentinel),
    /// Recipient is replaced with the redirect target
    Redirect,
}

impl RecipientDecision {
    pub fn is_redirect(&self) -> bool {
        matches!(self, Self::Redirect)
    }
}

/// Redirects every non-sentinel recipient to a single target
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct RecipientPolicy {
    target: Address,
}

impl RecipientPolicy {
    pub fn new(target: Address) -> Self {
        Self { target }
    }

    pub fn target(&self) -> Address {
        self.target
    }

    pub fn classify(&self, recipient: Address) -> RecipientDecision {
        if recipient == self.target {
            RecipientDecision::AlreadyTarget
        } else if let Some(sentinel) = Sentinel::from_address(recipient) {
            RecipientDecision::Sentinel(sentinel)
        } else {
            RecipientDecision::Redirect
        }
    }

    /// Returns the replacement recipient, or `None` when it stays unchanged.
    pub fn resolve(&self, recipient: Address) -> Option<Address> {
        self.classify(recipient)
            .is_redirect()
            .then_some(self.target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const POOL: Address = address!("0x00000000000000000000000000000000000b0b01");
    const USER: Address = address!("0x1111111111111111111111111111111111111111");

    #[test]
    fn test_classify_target() {
        let policy = RecipientPolicy::new(POOL);
        assert_eq!(policy.classify(POOL), RecipientDecision::AlreadyTarget);
        assert_eq!(policy.resolve(POOL), None);
    }

    #[test]
    fn test_classify_sentinels() {
        let policy = RecipientPolicy::new(POOL);
        assert_eq!(
            policy.classify(MSG_SENDER),
            RecipientDecision::Sentinel(Sentinel::MsgSender)
        );
        assert_eq!(
            policy.classify(ADDRESS_THIS),
            RecipientDecision::Sentinel(Sentinel::AddressThis)
        );
        assert_eq!(policy.resolve(MSG_SENDER), None);
        assert_eq!(policy.resolve(ADDRESS_THIS), None);
    }

    #[test]
    fn test_classify_user_and_zero() {
        let policy = RecipientPolicy::new(POOL);
        assert_eq!(policy.classify(USER), RecipientDecision::Redirect);
        assert_eq!(policy.resolve(USER), Some(POOL));
        // the zero address is not a sentinel
        assert_eq!(policy.resolve(Address::ZERO), Some(POOL));
    }

    #[test]
    fn test_target_equal_to_sentinel_is_already_target() {
        let policy = RecipientPolicy::new(MSG_SENDER);
        assert_eq!(policy.classify(MSG_SENDER), RecipientDecision::AlreadyTarget);
        assert_eq!(
            policy.classify(ADDRESS_THIS),
            RecipientDecision::Sentinel(Sentinel::AddressThis)
        );
    }
}
