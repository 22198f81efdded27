//! Injectable clock abstraction.
//!
//! Core operations take explicit `DateTime<Utc>` values; this trait sits at
//! the command boundary so elapsed-time policies (break intervals, ledger
//! timestamps) can be simulated deterministically in tests.

use chrono::{DateTime, Utc};

pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time, used by the CLI.
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
