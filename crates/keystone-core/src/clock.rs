//! Clock source abstraction.
//!
//! Composition must be deterministic and testable, so anything that needs
//! the current time (the alias publish description) receives a `Clock`
//! instead of reading ambient time. Production callers pass `SystemClock`;
//! tests and reproducible builds pass `FixedClock`.

use chrono::{DateTime, TimeZone, Utc};

/// A source of the current time.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// The real wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock pinned to one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl FixedClock {
    /// Pin the clock to the given UTC date and time.
    ///
    /// # Panics
    ///
    /// Panics on an invalid calendar date. Intended for test fixtures with
    /// literal arguments.
    pub fn at(year: i32, month: u32, day: u32, hour: u32, min: u32, sec: u32) -> Self {
        Self(
            Utc.with_ymd_and_hms(year, month, day, hour, min, sec)
                .single()
                .expect("valid literal date"),
        )
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}
