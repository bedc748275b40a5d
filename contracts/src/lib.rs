//! # Faireum Token Contract
//!
//! A fixed-supply token ledger with a vesting overlay. The whole supply is
//! minted once into five allocation vaults; tokens leave the reward-pool,
//! founders and team vaults only through lock operations that credit the
//! beneficiary and record a time-released encumbrance against them.
//!
//! - **Ledger** — balances, allowances, supply; transfer, approve, burn.
//! - **Vaults** — the five pools and their one-time creation.
//! - **Encumbrance** — per-holder locks and the release schedule.
//! - **Access** — the set of addresses allowed to run privileged calls.
//! - **Recovery** — sweeping foreign tokens sent to the contract.
//!
//! ## Design Principles
//!
//! 1. All monetary operations use checked arithmetic. Wrapping is an error.
//! 2. A failed call changes nothing: validate first, commit second.
//! 3. Time is an input. Every call reads its [`Clock`](faireum_protocol::Clock)
//!    exactly once.
//! 4. Calls return their emitted events, so the log is part of the result.

pub mod access;
pub mod encumbrance;
pub mod error;
pub mod events;
pub mod faireum_token;
pub mod ledger;
pub mod recovery;
pub mod vaults;

pub use error::TokenError;
pub use events::Event;
pub use faireum_token::{FaireumToken, TokenSnapshot};
pub use vaults::Vault;
