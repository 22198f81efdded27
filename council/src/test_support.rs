//! Test-only helpers for fixed instants and briefing fixtures.

use std::cell::Cell;

use chrono::{DateTime, Duration, TimeZone, Utc};

use crate::core::clock::Clock;
use crate::core::types::{Briefing, EcosystemState};

/// A fixed, deterministic instant for tests.
pub fn epoch() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 15, 9, 0, 0).single().expect("valid instant")
}

/// A manually advanced clock for time-dependent tests.
pub struct ManualClock {
    now: Cell<DateTime<Utc>>,
}

impl ManualClock {
    pub fn at(now: DateTime<Utc>) -> Self {
        Self { now: Cell::new(now) }
    }

    pub fn advance_hours(&self, hours: i64) {
        self.now.set(self.now.get() + Duration::hours(hours));
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        self.now.get()
    }
}

/// A briefing with the given critical path and deterministic defaults.
pub fn briefing(critical_path: &[&str]) -> Briefing {
    Briefing {
        ecosystem_state: EcosystemState {
            build_stage: Some("integration_phase".to_string()),
            active_repos: vec!["pollen".to_string(), "hive-api".to_string()],
        },
        critical_path: critical_path.iter().map(|item| item.to_string()).collect(),
        protected_notice: Some("sovereign territory is off limits".to_string()),
    }
}
