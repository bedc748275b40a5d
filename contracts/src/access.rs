//! # Access Set
//!
//! The authorized addresses allowed to run privileged token operations.
//! Only a member can add another member; any address can drop its own
//! membership.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use faireum_protocol::Address;

use crate::error::TokenError;
use crate::events::Event;

/// Set of authorized addresses.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AccessSet {
    members: BTreeSet<Address>,
}

impl AccessSet {
    /// Creates a set whose only member is `admin`.
    pub fn with_admin(admin: Address) -> Self {
        let mut members = BTreeSet::new();
        members.insert(admin);
        Self { members }
    }

    pub fn is_authorized(&self, account: &Address) -> bool {
        self.members.contains(account)
    }

    /// Fails with [`TokenError::Unauthorized`] unless `caller` is a member.
    pub fn ensure(&self, caller: &Address) -> Result<(), TokenError> {
        if self.is_authorized(caller) {
            Ok(())
        } else {
            Err(TokenError::Unauthorized { caller: *caller })
        }
    }

    /// Adds `account` on behalf of `caller`.
    ///
    /// Granting to an existing member succeeds without emitting anything.
    pub fn grant(&mut self, caller: &Address, account: &Address) -> Result<Vec<Event>, TokenError> {
        self.ensure(caller)?;
        if account.is_zero() {
            return Err(TokenError::InvalidRecipient);
        }
        if self.members.insert(*account) {
            Ok(vec![Event::AuthorizationGranted { account: *account }])
        } else {
            Ok(Vec::new())
        }
    }

    /// Removes `caller` from the set. A non-member renouncing is a no-op.
    pub fn renounce(&mut self, caller: &Address) -> Vec<Event> {
        if self.members.remove(caller) {
            vec![Event::AuthorizationRenounced { account: *caller }]
        } else {
            Vec::new()
        }
    }

    pub fn members(&self) -> impl Iterator<Item = &Address> {
        self.members.iter()
    }
}
