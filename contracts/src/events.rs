//! # Events
//!
//! Every successful mutating call returns the ordered list of events it
//! emitted. The list is the observable log of the call, so tests (and the
//! CLI) can assert on exact contents without any transport in between.

use faireum_protocol::amount::amount_str;
use faireum_protocol::{Address, Amount};
use serde::{Deserialize, Serialize};

/// A log record emitted by a token call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event")]
pub enum Event {
    /// Value moved from `from` to `to`. Mints use the null address as
    /// `from`; burns use it as `to`.
    Transfer {
        from: Address,
        to: Address,
        #[serde(with = "amount_str")]
        value: Amount,
    },

    /// `owner` set `spender`'s allowance to `value`.
    Approval {
        owner: Address,
        spender: Address,
        #[serde(with = "amount_str")]
        value: Amount,
    },

    /// `account` joined the authorized set.
    AuthorizationGranted { account: Address },

    /// `account` left the authorized set.
    AuthorizationRenounced { account: Address },
}

impl Event {
    pub fn transfer(from: Address, to: Address, value: Amount) -> Self {
        Event::Transfer { from, to, value }
    }

    pub fn approval(owner: Address, spender: Address, value: Amount) -> Self {
        Event::Approval {
            owner,
            spender,
            value,
        }
    }
}
