//! # Encumbrance Engine
//!
//! Tracks how much of each holder's balance arrived through a lock
//! operation and how much of that is still held back at a given instant.
//!
//! Two pieces:
//!
//! - [`ReleaseSchedule`] — the global milestone table anchored at the
//!   locks start date. Maps an instant to an unlocked fraction.
//! - [`LockBook`] — the nominal locked amount per holder. Only ever grows;
//!   the *effective* locked amount is recomputed from the schedule on each
//!   read and never stored.
//!
//! ```text
//! effective_locked(h, t) = locked(h) - floor(locked(h) * bps(t) / 10_000)
//! ```
//!
//! Flooring the unlocked part rounds toward "more locked", so an odd lock
//! at 50% keeps the extra base unit encumbered.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use faireum_protocol::config::{Milestone, TokenConfig, BPS_DENOMINATOR};
use faireum_protocol::{Address, Amount};

use crate::error::TokenError;

// ---------------------------------------------------------------------------
// ReleaseSchedule
// ---------------------------------------------------------------------------

/// Piecewise-constant release schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseSchedule {
    start: DateTime<Utc>,
    milestones: Vec<Milestone>,
}

impl ReleaseSchedule {
    /// Builds the schedule from a validated config.
    ///
    /// # Errors
    ///
    /// [`TokenError::InvalidSchedule`] if the milestone table is malformed.
    pub fn from_config(config: &TokenConfig) -> Result<Self, TokenError> {
        config.validate()?;
        Ok(Self {
            start: config.locks_start,
            milestones: config.release_schedule.clone(),
        })
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn milestones(&self) -> &[Milestone] {
        &self.milestones
    }

    /// Absolute instant at which `milestone` takes effect.
    pub fn milestone_date(&self, milestone: &Milestone) -> DateTime<Utc> {
        self.start + Duration::days(milestone.after_days)
    }

    /// Unlocked fraction in basis points at `now`.
    ///
    /// Zero before the start date; otherwise the fraction of the last
    /// milestone whose instant is at or before `now`.
    pub fn unlocked_bps(&self, now: DateTime<Utc>) -> u32 {
        if now < self.start {
            return 0;
        }
        self.milestones
            .iter()
            .take_while(|m| self.milestone_date(m) <= now)
            .last()
            .map(|m| m.unlocked_bps)
            .unwrap_or(0)
    }

    /// The part of `locked` still held back at `now`.
    pub fn effective_locked(&self, locked: Amount, now: DateTime<Utc>) -> Amount {
        let bps = Amount::from(self.unlocked_bps(now));
        let denom = Amount::from(BPS_DENOMINATOR);
        // floor(locked * bps / denom) without forming locked * bps.
        let unlocked = (locked / denom) * bps + (locked % denom) * bps / denom;
        locked - unlocked
    }
}

// ---------------------------------------------------------------------------
// LockBook
// ---------------------------------------------------------------------------

/// Nominal locked amount per holder.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LockBook {
    locked: HashMap<Address, Amount>,
}

impl LockBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total amount ever locked for `holder`.
    pub fn locked_of(&self, holder: &Address) -> Amount {
        self.locked.get(holder).copied().unwrap_or(0)
    }

    /// Computes the accumulated lock for `holder` after adding `amount`,
    /// without recording it.
    pub fn check_add(&self, holder: &Address, amount: Amount) -> Result<Amount, TokenError> {
        self.locked_of(holder)
            .checked_add(amount)
            .ok_or(TokenError::OverflowOrUnderflow)
    }

    /// Records a total previously returned by [`check_add`](Self::check_add).
    pub(crate) fn commit(&mut self, holder: &Address, new_total: Amount) {
        self.locked.insert(*holder, new_total);
    }

    /// Iterates over every holder with a non-zero lock.
    pub fn entries(&self) -> impl Iterator<Item = (&Address, &Amount)> {
        self.locked.iter().filter(|(_, amount)| **amount > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use faireum_protocol::config::locks_start_date;

    fn schedule() -> ReleaseSchedule {
        ReleaseSchedule::from_config(&TokenConfig::default()).unwrap()
    }

    #[test]
    fn fully_locked_before_and_at_start() {
        let s = schedule();
        let start = locks_start_date();
        assert_eq!(s.unlocked_bps(start - Duration::days(400)), 0);
        assert_eq!(s.unlocked_bps(start), 0);
        assert_eq!(s.effective_locked(1_000, start), 1_000);
    }

    #[test]
    fn half_unlock_at_exactly_182_days() {
        let s = schedule();
        let half = locks_start_date() + Duration::days(182);
        assert_eq!(s.unlocked_bps(half - Duration::seconds(1)), 0);
        assert_eq!(s.unlocked_bps(half), 5_000);
        assert_eq!(s.effective_locked(1_000, half), 500);
    }

    #[test]
    fn full_unlock_at_364_days() {
        let s = schedule();
        let full = locks_start_date() + Duration::days(364);
        assert_eq!(s.unlocked_bps(full - Duration::seconds(1)), 5_000);
        assert_eq!(s.unlocked_bps(full), 10_000);
        assert_eq!(s.effective_locked(1_000, full), 0);
        assert_eq!(s.effective_locked(1_000, full + Duration::days(3_000)), 0);
    }

    #[test]
    fn odd_lock_rounds_toward_locked() {
        let s = schedule();
        let half = locks_start_date() + Duration::days(182);
        assert_eq!(s.effective_locked(7, half), 4);
        assert_eq!(s.effective_locked(1, half), 1);
    }

    #[test]
    fn effective_locked_handles_full_range() {
        let s = schedule();
        let half = locks_start_date() + Duration::days(182);
        assert_eq!(s.effective_locked(Amount::MAX, half), Amount::MAX - Amount::MAX / 2);
    }

    #[test]
    fn custom_table_is_respected() {
        let config = TokenConfig {
            release_schedule: vec![
                Milestone::new(30, 2_500),
                Milestone::new(60, 7_500),
                Milestone::new(90, 10_000),
            ],
            ..TokenConfig::default()
        };
        let s = ReleaseSchedule::from_config(&config).unwrap();
        let start = s.start();
        assert_eq!(s.unlocked_bps(start + Duration::days(29)), 0);
        assert_eq!(s.unlocked_bps(start + Duration::days(30)), 2_500);
        assert_eq!(s.effective_locked(400, start + Duration::days(60)), 100);
    }

    #[test]
    fn malformed_table_rejected() {
        let config = TokenConfig {
            release_schedule: vec![Milestone::new(0, 5_000)],
            ..TokenConfig::default()
        };
        assert!(matches!(
            ReleaseSchedule::from_config(&config),
            Err(TokenError::InvalidSchedule(_))
        ));
    }

    #[test]
    fn lock_book_accumulates() {
        let mut book = LockBook::new();
        let holder = Address::named("holder");
        let total = book.check_add(&holder, 10).unwrap();
        book.commit(&holder, total);
        let total = book.check_add(&holder, 15).unwrap();
        book.commit(&holder, total);
        assert_eq!(book.locked_of(&holder), 25);
        assert_eq!(book.entries().count(), 1);
    }

    #[test]
    fn lock_book_overflow_rejected() {
        let mut book = LockBook::new();
        let holder = Address::named("holder");
        book.commit(&holder, Amount::MAX);
        assert_eq!(
            book.check_add(&holder, 1),
            Err(TokenError::OverflowOrUnderflow)
        );
    }
}
