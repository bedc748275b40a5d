// Copyright (c) 2026 Faireum Foundation Limited. MIT License.
// See LICENSE for details.

//! # Faireum Protocol — Shared Primitives
//!
//! The small set of types every other Faireum crate speaks in. Nothing in
//! here knows about vaults or vesting; it only knows what an address is,
//! how big an amount can get, what time it is, and which constants the
//! token was launched with.
//!
//! ## Modules
//!
//! - **address** — 20-byte account identifiers, hex encoded on the wire.
//! - **amount** — the `Amount` integer type and its string serde helper.
//! - **hash** — BLAKE3 helpers used for deterministic address derivation.
//! - **clock** — the time source every token operation reads exactly once.
//! - **config** — launch constants and the runtime `TokenConfig`.

pub mod address;
pub mod amount;
pub mod clock;
pub mod config;
pub mod hash;

pub use address::{Address, AddressError};
pub use amount::Amount;
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{Milestone, TokenConfig};
