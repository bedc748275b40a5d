//! # Token Configuration & Constants
//!
//! Every launch number for the Faireum token lives here: supply, decimals,
//! the five pool allocations, and the vesting start date. The pool
//! allocations are fixed at compile time and a `const` assertion below
//! refuses to build if they stop summing to the initial supply.
//!
//! The release schedule is the one piece that is runtime-configurable
//! through [`TokenConfig`], because only its first two points (fully locked
//! at the start date, half unlocked at +182 days) are pinned down by the
//! launch terms. The default table finishes the schedule with a full
//! unlock at +364 days.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::amount::Amount;

// ---------------------------------------------------------------------------
// Token Metadata
// ---------------------------------------------------------------------------

/// Human-readable token name.
pub const TOKEN_NAME: &str = "Faireum Token";

/// Ticker symbol.
pub const TOKEN_SYMBOL: &str = "FAIRC";

/// Number of decimals. All on-ledger arithmetic is in 10^-18 units.
pub const DECIMALS: u8 = 18;

/// One whole token in base units.
pub const ONE_TOKEN: Amount = 1_000_000_000_000_000_000;

// ---------------------------------------------------------------------------
// Supply & Allocations
// ---------------------------------------------------------------------------

/// Total supply minted at vault creation: 1.2 billion tokens.
pub const INITIAL_SUPPLY: Amount = 1_200_000_000 * ONE_TOKEN;

/// Team and advisors pool: 10% of supply.
pub const TEAM_ADVISORS_ALLOCATION: Amount = 120_000_000 * ONE_TOKEN;

/// Reward pool: 20% of supply.
pub const REWARD_POOL_ALLOCATION: Amount = 240_000_000 * ONE_TOKEN;

/// Founders pool: 5% of supply.
pub const FOUNDERS_ALLOCATION: Amount = 60_000_000 * ONE_TOKEN;

/// Marketing and airdrop pool: 10% of supply.
pub const MARKETING_AIRDROP_ALLOCATION: Amount = 120_000_000 * ONE_TOKEN;

/// Public sale pool: 55% of supply.
pub const SALE_ALLOCATION: Amount = 660_000_000 * ONE_TOKEN;

const _: () = assert!(
    TEAM_ADVISORS_ALLOCATION
        + REWARD_POOL_ALLOCATION
        + FOUNDERS_ALLOCATION
        + MARKETING_AIRDROP_ALLOCATION
        + SALE_ALLOCATION
        == INITIAL_SUPPLY
);

// ---------------------------------------------------------------------------
// Vesting
// ---------------------------------------------------------------------------

/// Anchor of the release schedule: 2019-03-11T00:00:00Z.
pub const LOCKS_START_TIMESTAMP: i64 = 1_552_262_400;

/// Basis-point denominator for unlocked fractions.
pub const BPS_DENOMINATOR: u32 = 10_000;

/// Days after the start date at which half of every lock is released.
pub const HALF_UNLOCK_AFTER_DAYS: i64 = 182;

/// Days after the start date at which locks are fully released.
pub const FULL_UNLOCK_AFTER_DAYS: i64 = 364;

/// Upper bound on a milestone offset (about a thousand years), keeping
/// milestone dates far inside the representable range.
pub const MAX_MILESTONE_DAYS: i64 = 365_000;

/// Returns [`LOCKS_START_TIMESTAMP`] as a `DateTime`.
pub fn locks_start_date() -> DateTime<Utc> {
    Utc.timestamp_opt(LOCKS_START_TIMESTAMP, 0)
        .single()
        .unwrap_or_default()
}

/// A point in the release schedule: from `after_days` past the start date
/// onward, `unlocked_bps` / 10 000 of every lock is transferable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Milestone {
    /// Days elapsed since the start date.
    pub after_days: i64,
    /// Unlocked fraction in basis points.
    pub unlocked_bps: u32,
}

impl Milestone {
    pub const fn new(after_days: i64, unlocked_bps: u32) -> Self {
        Self {
            after_days,
            unlocked_bps,
        }
    }
}

/// The launch release schedule: locked, half at +182d, all at +364d.
pub const DEFAULT_MILESTONES: [Milestone; 3] = [
    Milestone::new(0, 0),
    Milestone::new(HALF_UNLOCK_AFTER_DAYS, BPS_DENOMINATOR / 2),
    Milestone::new(FULL_UNLOCK_AFTER_DAYS, BPS_DENOMINATOR),
];

// ---------------------------------------------------------------------------
// Runtime Configuration
// ---------------------------------------------------------------------------

/// Errors reported by [`TokenConfig::validate`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("release schedule has no milestones")]
    EmptySchedule,

    #[error("milestone {index} has negative offset {after_days} days")]
    NegativeOffset { index: usize, after_days: i64 },

    #[error("milestone {index} offset {after_days} days exceeds {MAX_MILESTONE_DAYS}")]
    OffsetTooLarge { index: usize, after_days: i64 },

    #[error("milestone {index} at {after_days} days is not after the previous one")]
    OffsetsNotIncreasing { index: usize, after_days: i64 },

    #[error("milestone {index} unlocks {unlocked_bps} bps, less than the previous milestone")]
    FractionDecreasing { index: usize, unlocked_bps: u32 },

    #[error("milestone {index} unlocks {unlocked_bps} bps, above {BPS_DENOMINATOR}")]
    FractionTooLarge { index: usize, unlocked_bps: u32 },

    #[error("final milestone unlocks {0} bps; the schedule must end fully unlocked")]
    NeverFullyUnlocked(u32),
}

/// Runtime configuration of a token instance.
///
/// Loaded from JSON by the CLI; every field has a launch default so a
/// config file only needs to name what it overrides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenConfig {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
    /// Start date the release schedule is measured from.
    pub locks_start: DateTime<Utc>,
    /// Milestone table, in increasing `after_days` order.
    pub release_schedule: Vec<Milestone>,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            name: TOKEN_NAME.to_string(),
            symbol: TOKEN_SYMBOL.to_string(),
            decimals: DECIMALS,
            locks_start: locks_start_date(),
            release_schedule: DEFAULT_MILESTONES.to_vec(),
        }
    }
}

impl TokenConfig {
    /// Parses a JSON config, filling missing fields with launch defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Checks that the release schedule is well formed: non-empty, offsets
    /// non-negative and strictly increasing, fractions non-decreasing and
    /// within range, ending at a full unlock.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let milestones = &self.release_schedule;
        let last = milestones.last().ok_or(ConfigError::EmptySchedule)?;

        for (index, m) in milestones.iter().enumerate() {
            if m.after_days < 0 {
                return Err(ConfigError::NegativeOffset {
                    index,
                    after_days: m.after_days,
                });
            }
            if m.after_days > MAX_MILESTONE_DAYS {
                return Err(ConfigError::OffsetTooLarge {
                    index,
                    after_days: m.after_days,
                });
            }
            if m.unlocked_bps > BPS_DENOMINATOR {
                return Err(ConfigError::FractionTooLarge {
                    index,
                    unlocked_bps: m.unlocked_bps,
                });
            }
            if index > 0 {
                let prev = milestones[index - 1];
                if m.after_days <= prev.after_days {
                    return Err(ConfigError::OffsetsNotIncreasing {
                        index,
                        after_days: m.after_days,
                    });
                }
                if m.unlocked_bps < prev.unlocked_bps {
                    return Err(ConfigError::FractionDecreasing {
                        index,
                        unlocked_bps: m.unlocked_bps,
                    });
                }
            }
        }

        if last.unlocked_bps != BPS_DENOMINATOR {
            return Err(ConfigError::NeverFullyUnlocked(last.unlocked_bps));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocations_are_the_published_percentages() {
        assert_eq!(TEAM_ADVISORS_ALLOCATION * 10, INITIAL_SUPPLY);
        assert_eq!(REWARD_POOL_ALLOCATION * 5, INITIAL_SUPPLY);
        assert_eq!(FOUNDERS_ALLOCATION * 20, INITIAL_SUPPLY);
        assert_eq!(MARKETING_AIRDROP_ALLOCATION * 10, INITIAL_SUPPLY);
        assert_eq!(SALE_ALLOCATION * 20, INITIAL_SUPPLY * 11);
    }

    #[test]
    fn start_date_is_march_11_2019() {
        assert_eq!(locks_start_date().to_rfc3339(), "2019-03-11T00:00:00+00:00");
    }

    #[test]
    fn default_config_is_valid() {
        let config = TokenConfig::default();
        assert_eq!(config.validate(), Ok(()));
        assert_eq!(config.decimals, 18);
        assert_eq!(config.symbol, "FAIRC");
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config = TokenConfig::from_json(r#"{"name":"Test"}"#).unwrap();
        assert_eq!(config.name, "Test");
        assert_eq!(config.release_schedule, DEFAULT_MILESTONES.to_vec());
        assert_eq!(config.locks_start, locks_start_date());
    }

    #[test]
    fn schedule_validation_catches_each_defect() {
        let with = |ms: Vec<Milestone>| TokenConfig {
            release_schedule: ms,
            ..TokenConfig::default()
        };

        assert_eq!(with(vec![]).validate(), Err(ConfigError::EmptySchedule));
        assert!(matches!(
            with(vec![Milestone::new(-1, 10_000)]).validate(),
            Err(ConfigError::NegativeOffset { .. })
        ));
        assert!(matches!(
            with(vec![Milestone::new(MAX_MILESTONE_DAYS + 1, 10_000)]).validate(),
            Err(ConfigError::OffsetTooLarge { .. })
        ));
        assert!(matches!(
            with(vec![Milestone::new(10, 0), Milestone::new(10, 10_000)]).validate(),
            Err(ConfigError::OffsetsNotIncreasing { index: 1, .. })
        ));
        assert!(matches!(
            with(vec![
                Milestone::new(0, 6_000),
                Milestone::new(5, 5_000),
                Milestone::new(9, 10_000)
            ])
            .validate(),
            Err(ConfigError::FractionDecreasing { index: 1, .. })
        ));
        assert!(matches!(
            with(vec![Milestone::new(0, 10_001)]).validate(),
            Err(ConfigError::FractionTooLarge { .. })
        ));
        assert_eq!(
            with(vec![Milestone::new(0, 0), Milestone::new(30, 9_000)]).validate(),
            Err(ConfigError::NeverFullyUnlocked(9_000))
        );
    }
}
