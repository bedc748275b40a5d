//! # Clock
//!
//! The release schedule is a function of wall-clock time, so the token
//! never calls `Utc::now()` directly. It asks a [`Clock`] once per
//! operation and uses that single reading for every check the operation
//! makes.
//!
//! [`SystemClock`] is what a deployment uses. [`ManualClock`] is what tests
//! and scenario replays use: it only moves when told to.

use chrono::{DateTime, Duration, Utc};
use std::cell::Cell;

/// A source of the current time.
pub trait Clock {
    /// Returns the current instant.
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only changes when [`set`](Self::set) or
/// [`advance`](Self::advance) is called.
///
/// Uses interior mutability so a token that owns the clock can still have
/// its time moved through a shared reference.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Cell<DateTime<Utc>>,
}

impl ManualClock {
    /// Creates a clock frozen at `start`.
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Cell::new(start),
        }
    }

    /// Moves the clock to `instant`. Moving backwards is allowed; callers
    /// replaying a log are expected to keep it monotonic.
    pub fn set(&self, instant: DateTime<Utc>) {
        self.now.set(instant);
    }

    /// Moves the clock forward by `delta`.
    pub fn advance(&self, delta: Duration) {
        self.now.set(self.now.get() + delta);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        self.now.get()
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }
}
