//! # Foreign Token Recovery
//!
//! Tokens of some other ledger can end up credited to the Faireum
//! contract's own address. Recovery sweeps that whole balance to an
//! authorized caller. The foreign ledger is reached only through
//! [`ForeignLedger`], so any fungible ledger can be swept.

use faireum_protocol::{Address, Amount};

use crate::error::TokenError;
use crate::ledger::Ledger;

/// The slice of a fungible ledger that recovery needs.
pub trait ForeignLedger {
    /// Balance of `holder` in this ledger.
    fn balance_of(&self, holder: &Address) -> Amount;

    /// Moves `amount` from `from` to `to`.
    fn transfer(&mut self, from: &Address, to: &Address, amount: Amount)
        -> Result<(), TokenError>;
}

impl ForeignLedger for Ledger {
    fn balance_of(&self, holder: &Address) -> Amount {
        Ledger::balance_of(self, holder)
    }

    fn transfer(
        &mut self,
        from: &Address,
        to: &Address,
        amount: Amount,
    ) -> Result<(), TokenError> {
        Ledger::transfer(self, from, to, amount, 0).map(|_| ())
    }
}

/// Moves all of `holder`'s balance in `ledger` to `recipient` and returns
/// the amount moved.
pub fn sweep(
    ledger: &mut dyn ForeignLedger,
    holder: &Address,
    recipient: &Address,
) -> Result<Amount, TokenError> {
    let amount = ledger.balance_of(holder);
    ledger.transfer(holder, recipient, amount)?;
    Ok(amount)
}
