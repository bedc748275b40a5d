//! # Token Errors
//!
//! One error type for every rejected token call. A returned error always
//! means nothing was mutated and no events were emitted; the caller must
//! resubmit with corrected inputs.

use faireum_protocol::config::ConfigError;
use faireum_protocol::{Address, Amount};
use thiserror::Error;

/// Errors that can occur during token operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TokenError {
    /// The caller lacks the authorization a privileged operation requires.
    #[error("unauthorized: {caller} is not an authorized address")]
    Unauthorized {
        /// The address that attempted the operation.
        caller: Address,
    },

    /// Vault creation was attempted a second time.
    #[error("token vaults have already been created")]
    AlreadyInitialized,

    /// A vault operation was attempted before the vaults exist.
    #[error("token vaults have not been created yet")]
    VaultsNotCreated,

    /// The amount exceeds what the holder may currently move.
    #[error("insufficient balance: {holder} can spend {spendable}, requested {requested}")]
    InsufficientBalance {
        /// The account being debited.
        holder: Address,
        /// Balance minus the currently locked amount.
        spendable: Amount,
        /// The amount that was requested.
        requested: Amount,
    },

    /// `transfer_from` / `burn_from` asked for more than the allowance.
    #[error(
        "insufficient allowance: {spender} may spend {allowance} of {owner}'s tokens, requested {requested}"
    )]
    InsufficientAllowance {
        owner: Address,
        spender: Address,
        allowance: Amount,
        requested: Amount,
    },

    /// Transfer or mint to the null address.
    #[error("invalid recipient: the null address cannot receive tokens")]
    InvalidRecipient,

    /// Approval for the null address.
    #[error("invalid spender: the null address cannot be approved")]
    InvalidSpender,

    /// Value movement out of the null address.
    #[error("invalid sender: the null address cannot send or approve")]
    InvalidSender,

    /// Team locks must split evenly into two tranches.
    #[error("team lock amount must be even, got {amount}")]
    OddLockAmount {
        /// The rejected amount.
        amount: Amount,
    },

    /// Checked arithmetic would have wrapped.
    #[error("arithmetic overflow or underflow")]
    OverflowOrUnderflow,

    /// The configured release schedule is malformed.
    #[error("invalid release schedule: {0}")]
    InvalidSchedule(#[from] ConfigError),
}
