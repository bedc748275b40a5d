//! # Ledger Core
//!
//! Balances, allowances and the total-supply counter. This is a plain
//! fungible-token ledger with one twist: every debit takes an `encumbered`
//! floor, the amount of the holder's balance that must stay put. The
//! ledger does not know where that floor comes from; the token computes it
//! from the release schedule and passes it in.
//!
//! ## Invariants
//!
//! - `total_supply == sum(balances)` after every call.
//! - No balance or allowance ever goes negative or wraps.
//! - A debit never leaves `balance < encumbered`.
//! - Every public mutator validates everything first and only then
//!   writes, so an `Err` means the ledger is untouched.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use faireum_protocol::{Address, Amount};

use crate::error::TokenError;
use crate::events::Event;

/// Fungible-token balances and allowances.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Ledger {
    /// Balance per holder. Missing entries are zero.
    balances: HashMap<Address, Amount>,
    /// `owner -> (spender -> remaining allowance)`.
    allowances: HashMap<Address, HashMap<Address, Amount>>,
    /// Sum of all balances.
    total_supply: Amount,
}

impl Ledger {
    /// Creates an empty ledger with zero supply.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn total_supply(&self) -> Amount {
        self.total_supply
    }

    /// Returns the balance of `holder`, or 0.
    pub fn balance_of(&self, holder: &Address) -> Amount {
        self.balances.get(holder).copied().unwrap_or(0)
    }

    /// Returns how much `spender` may still move out of `owner`'s balance.
    pub fn allowance(&self, owner: &Address, spender: &Address) -> Amount {
        self.allowances
            .get(owner)
            .and_then(|m| m.get(spender))
            .copied()
            .unwrap_or(0)
    }

    /// Balance minus the encumbered floor, saturating at zero.
    ///
    /// The floor can exceed the balance only after tokens left the account
    /// under an earlier, more permissive floor; then nothing is spendable.
    pub fn spendable(&self, holder: &Address, encumbered: Amount) -> Amount {
        self.balance_of(holder).saturating_sub(encumbered)
    }

    /// Iterates over every non-zero balance.
    pub fn holders(&self) -> impl Iterator<Item = (&Address, &Amount)> {
        self.balances.iter().filter(|(_, amount)| **amount > 0)
    }

    // -----------------------------------------------------------------------
    // Mutations
    // -----------------------------------------------------------------------

    /// Creates `amount` new tokens in `to`'s balance.
    ///
    /// # Errors
    ///
    /// [`TokenError::InvalidRecipient`] for the null address,
    /// [`TokenError::OverflowOrUnderflow`] if supply or balance would wrap.
    pub fn mint(&mut self, to: &Address, amount: Amount) -> Result<Event, TokenError> {
        if to.is_zero() {
            return Err(TokenError::InvalidRecipient);
        }
        let new_supply = self
            .total_supply
            .checked_add(amount)
            .ok_or(TokenError::OverflowOrUnderflow)?;
        let new_balance = self
            .balance_of(to)
            .checked_add(amount)
            .ok_or(TokenError::OverflowOrUnderflow)?;

        self.total_supply = new_supply;
        self.balances.insert(*to, new_balance);
        Ok(Event::transfer(Address::ZERO, *to, amount))
    }

    /// Moves `amount` from `from` to `to`, keeping at least `encumbered`
    /// in `from`.
    ///
    /// # Errors
    ///
    /// [`TokenError::InvalidRecipient`], [`TokenError::InvalidSender`],
    /// [`TokenError::InsufficientBalance`], [`TokenError::OverflowOrUnderflow`].
    pub fn transfer(
        &mut self,
        from: &Address,
        to: &Address,
        amount: Amount,
        encumbered: Amount,
    ) -> Result<Event, TokenError> {
        self.check_transfer(from, to, amount, encumbered)?;
        self.commit_transfer(from, to, amount);
        Ok(Event::transfer(*from, *to, amount))
    }

    /// Overwrites `owner`'s allowance for `spender`.
    ///
    /// The amount is not checked against `owner`'s balance; approving more
    /// than one holds is legal.
    pub fn approve(
        &mut self,
        owner: &Address,
        spender: &Address,
        amount: Amount,
    ) -> Result<Event, TokenError> {
        if owner.is_zero() {
            return Err(TokenError::InvalidSender);
        }
        if spender.is_zero() {
            return Err(TokenError::InvalidSpender);
        }
        self.set_allowance(owner, spender, amount);
        Ok(Event::approval(*owner, *spender, amount))
    }

    /// Adds `added` to the current allowance.
    pub fn increase_allowance(
        &mut self,
        owner: &Address,
        spender: &Address,
        added: Amount,
    ) -> Result<Event, TokenError> {
        let new_value = self
            .allowance(owner, spender)
            .checked_add(added)
            .ok_or(TokenError::OverflowOrUnderflow)?;
        self.approve(owner, spender, new_value)
    }

    /// Subtracts `subtracted` from the current allowance.
    ///
    /// # Errors
    ///
    /// [`TokenError::InsufficientAllowance`] if the allowance is smaller
    /// than `subtracted`.
    pub fn decrease_allowance(
        &mut self,
        owner: &Address,
        spender: &Address,
        subtracted: Amount,
    ) -> Result<Event, TokenError> {
        let current = self.allowance(owner, spender);
        let new_value =
            current
                .checked_sub(subtracted)
                .ok_or(TokenError::InsufficientAllowance {
                    owner: *owner,
                    spender: *spender,
                    allowance: current,
                    requested: subtracted,
                })?;
        self.approve(owner, spender, new_value)
    }

    /// Moves `amount` from `owner` to `to` on `spender`'s behalf.
    ///
    /// Emits the approval with the reduced allowance, then the transfer.
    pub fn transfer_from(
        &mut self,
        spender: &Address,
        owner: &Address,
        to: &Address,
        amount: Amount,
        encumbered: Amount,
    ) -> Result<Vec<Event>, TokenError> {
        let remaining = self.check_allowance(owner, spender, amount)?;
        self.check_transfer(owner, to, amount, encumbered)?;

        self.set_allowance(owner, spender, remaining);
        self.commit_transfer(owner, to, amount);
        Ok(vec![
            Event::approval(*owner, *spender, remaining),
            Event::transfer(*owner, *to, amount),
        ])
    }

    /// Destroys `amount` of `holder`'s tokens, keeping at least
    /// `encumbered` in the account.
    pub fn burn(
        &mut self,
        holder: &Address,
        amount: Amount,
        encumbered: Amount,
    ) -> Result<Event, TokenError> {
        self.check_debit(holder, amount, encumbered)?;
        self.commit_burn(holder, amount)?;
        Ok(Event::transfer(*holder, Address::ZERO, amount))
    }

    /// Destroys `amount` of `owner`'s tokens on `spender`'s behalf.
    pub fn burn_from(
        &mut self,
        spender: &Address,
        owner: &Address,
        amount: Amount,
        encumbered: Amount,
    ) -> Result<Vec<Event>, TokenError> {
        let remaining = self.check_allowance(owner, spender, amount)?;
        self.check_debit(owner, amount, encumbered)?;

        self.commit_burn(owner, amount)?;
        self.set_allowance(owner, spender, remaining);
        Ok(vec![
            Event::approval(*owner, *spender, remaining),
            Event::transfer(*owner, Address::ZERO, amount),
        ])
    }

    /// Writes an allowance without null-address checks or events. Used by
    /// privileged vault movements that manage their own event output.
    pub(crate) fn set_allowance(&mut self, owner: &Address, spender: &Address, amount: Amount) {
        self.allowances
            .entry(*owner)
            .or_default()
            .insert(*spender, amount);
    }

    // -----------------------------------------------------------------------
    // Checks
    // -----------------------------------------------------------------------

    /// Validates a transfer without applying it.
    pub(crate) fn check_transfer(
        &self,
        from: &Address,
        to: &Address,
        amount: Amount,
        encumbered: Amount,
    ) -> Result<(), TokenError> {
        if to.is_zero() {
            return Err(TokenError::InvalidRecipient);
        }
        self.check_debit(from, amount, encumbered)?;
        if from != to {
            self.balance_of(to)
                .checked_add(amount)
                .ok_or(TokenError::OverflowOrUnderflow)?;
        }
        Ok(())
    }

    fn check_debit(
        &self,
        holder: &Address,
        amount: Amount,
        encumbered: Amount,
    ) -> Result<(), TokenError> {
        if holder.is_zero() {
            return Err(TokenError::InvalidSender);
        }
        let spendable = self.spendable(holder, encumbered);
        if amount > spendable {
            return Err(TokenError::InsufficientBalance {
                holder: *holder,
                spendable,
                requested: amount,
            });
        }
        Ok(())
    }

    /// Returns the allowance left after spending `amount`.
    fn check_allowance(
        &self,
        owner: &Address,
        spender: &Address,
        amount: Amount,
    ) -> Result<Amount, TokenError> {
        let allowance = self.allowance(owner, spender);
        allowance
            .checked_sub(amount)
            .ok_or(TokenError::InsufficientAllowance {
                owner: *owner,
                spender: *spender,
                allowance,
                requested: amount,
            })
    }

    // -----------------------------------------------------------------------
    // Commits (only after the matching check succeeded)
    // -----------------------------------------------------------------------

    fn commit_transfer(&mut self, from: &Address, to: &Address, amount: Amount) {
        if from == to {
            return;
        }
        let from_balance = self.balances.entry(*from).or_insert(0);
        *from_balance -= amount;
        let to_balance = self.balances.entry(*to).or_insert(0);
        *to_balance += amount;
    }

    fn commit_burn(&mut self, holder: &Address, amount: Amount) -> Result<(), TokenError> {
        let new_supply = self
            .total_supply
            .checked_sub(amount)
            .ok_or(TokenError::OverflowOrUnderflow)?;
        let balance = self.balances.entry(*holder).or_insert(0);
        *balance -= amount;
        self.total_supply = new_supply;
        Ok(())
    }
}
