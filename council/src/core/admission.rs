//! Admission control: per-agent capacity and wellness policy.
//!
//! The gate decides whether an agent may accept new work. All transitions are
//! pure state updates over [`Biometrics`]; nothing here errors.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::types::AgentStatus;

/// Hard ceiling on concurrent tasks per agent. Registry invariant, not a
/// tunable.
pub const MAX_CONCURRENT_TASKS: u32 = 3;
/// Daily hour ceiling before an agent needs extended rest.
pub const MAX_HOURS_PER_DAY: f64 = 8.0;
/// Stress level above which an agent needs extended rest.
pub const STRESS_THRESHOLD: f64 = 0.7;
/// Cognitive load above which an agent needs extended rest.
pub const COGNITIVE_LOAD_THRESHOLD: f64 = 0.8;
/// Stress/cognitive-load relief granted by a break.
const BREAK_RELIEF: f64 = 0.3;

/// Mutable admission state of an agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Biometrics {
    /// Stress level in [0, 1].
    pub stress_level: f64,
    /// Cognitive load in [0, 1].
    pub cognitive_load: f64,
    pub concurrent_tasks: u32,
    pub hours_worked_today: f64,
    pub last_break: DateTime<Utc>,
    pub last_rest: DateTime<Utc>,
    pub status: AgentStatus,
}

impl Biometrics {
    /// Fresh, fully rested state anchored at `now`.
    pub fn fresh(now: DateTime<Utc>) -> Self {
        Self {
            stress_level: 0.0,
            cognitive_load: 0.0,
            concurrent_tasks: 0,
            hours_worked_today: 0.0,
            last_break: now,
            last_rest: now,
            status: AgentStatus::Idle,
        }
    }

    /// True when elapsed time since the last break reaches
    /// `break_interval_hours`. A policy input for scheduling, not a hard
    /// admission block.
    pub fn needs_break(&self, now: DateTime<Utc>, break_interval_hours: f64) -> bool {
        let elapsed_hours = (now - self.last_break).num_seconds() as f64 / 3600.0;
        elapsed_hours >= break_interval_hours
    }

    /// True when stress, daily hours, or cognitive load crossed a ceiling.
    pub fn needs_rest(&self) -> bool {
        self.stress_level > STRESS_THRESHOLD
            || self.hours_worked_today >= MAX_HOURS_PER_DAY
            || self.cognitive_load > COGNITIVE_LOAD_THRESHOLD
    }

    /// True iff the agent may accept new work: below the concurrency ceiling,
    /// not in recovery, and not in need of rest.
    pub fn can_accept(&self) -> bool {
        self.concurrent_tasks < MAX_CONCURRENT_TASKS
            && self.status != AgentStatus::Recovery
            && !self.needs_rest()
    }

    /// Take a break: reset the break timestamp and relieve stress and
    /// cognitive load by 0.3 each, floored at zero. Returns to `Idle` once
    /// admissible again.
    pub fn take_break(&mut self, now: DateTime<Utc>) {
        self.status = AgentStatus::Recovery;
        self.last_break = now;
        self.stress_level = (self.stress_level - BREAK_RELIEF).max(0.0);
        self.cognitive_load = (self.cognitive_load - BREAK_RELIEF).max(0.0);
        if self.can_accept_after_recovery() {
            self.status = AgentStatus::Idle;
        }
    }

    /// Extended rest: zeroes stress and cognitive load and ends recovery.
    pub fn rest(&mut self, now: DateTime<Utc>) {
        self.stress_level = 0.0;
        self.cognitive_load = 0.0;
        self.last_rest = now;
        self.status = AgentStatus::Idle;
    }

    /// Admission check ignoring the transient `Recovery` status, used to
    /// decide whether a break ends recovery.
    fn can_accept_after_recovery(&self) -> bool {
        self.concurrent_tasks < MAX_CONCURRENT_TASKS && !self.needs_rest()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::clock::Clock;
    use crate::test_support::{ManualClock, epoch};
    use chrono::Duration;

    #[test]
    fn fresh_agent_can_accept() {
        let bio = Biometrics::fresh(epoch());
        assert!(bio.can_accept());
        assert!(!bio.needs_rest());
    }

    #[test]
    fn concurrency_ceiling_blocks_admission() {
        let mut bio = Biometrics::fresh(epoch());
        bio.concurrent_tasks = MAX_CONCURRENT_TASKS;
        assert!(!bio.can_accept());
    }

    #[test]
    fn stress_hours_and_load_each_block_admission() {
        let mut stressed = Biometrics::fresh(epoch());
        stressed.stress_level = 0.8;
        assert!(!stressed.can_accept());

        let mut overworked = Biometrics::fresh(epoch());
        overworked.hours_worked_today = 8.0;
        assert!(!overworked.can_accept());

        let mut loaded = Biometrics::fresh(epoch());
        loaded.cognitive_load = 0.85;
        assert!(!loaded.can_accept());
    }

    #[test]
    fn recovery_blocks_admission_even_when_rested() {
        let mut bio = Biometrics::fresh(epoch());
        bio.status = AgentStatus::Recovery;
        assert!(!bio.can_accept());
    }

    /// Break requirement is driven by injected time, not wall clock.
    #[test]
    fn needs_break_after_interval_elapses() {
        let bio = Biometrics::fresh(epoch());
        assert!(!bio.needs_break(epoch() + Duration::hours(3), 4.0));
        assert!(bio.needs_break(epoch() + Duration::hours(4), 4.0));
    }

    /// Same policy through the clock abstraction: advancing past the
    /// interval flags the break, and taking one resets the timer.
    #[test]
    fn break_interval_tracks_an_advancing_clock() {
        let clock = ManualClock::at(epoch());
        let mut bio = Biometrics::fresh(clock.now());

        clock.advance_hours(3);
        assert!(!bio.needs_break(clock.now(), 4.0));
        clock.advance_hours(2);
        assert!(bio.needs_break(clock.now(), 4.0));

        bio.take_break(clock.now());
        assert!(!bio.needs_break(clock.now(), 4.0));
    }

    #[test]
    fn take_break_relieves_and_floors_at_zero() {
        let mut bio = Biometrics::fresh(epoch());
        bio.stress_level = 0.5;
        bio.cognitive_load = 0.1;
        let later = epoch() + Duration::hours(5);

        bio.take_break(later);

        assert!((bio.stress_level - 0.2).abs() < 1e-9);
        assert_eq!(bio.cognitive_load, 0.0);
        assert_eq!(bio.last_break, later);
        assert_eq!(bio.status, AgentStatus::Idle);
    }

    /// A break that does not relieve enough stress leaves the agent in
    /// recovery.
    #[test]
    fn take_break_keeps_recovery_when_still_overloaded() {
        let mut bio = Biometrics::fresh(epoch());
        bio.stress_level = 1.0;

        bio.take_break(epoch() + Duration::hours(4));

        assert_eq!(bio.status, AgentStatus::Recovery);
        assert!(!bio.can_accept());
    }

    #[test]
    fn rest_zeroes_stress_and_ends_recovery() {
        let mut bio = Biometrics::fresh(epoch());
        bio.stress_level = 1.0;
        bio.cognitive_load = 0.9;
        bio.status = AgentStatus::Recovery;

        bio.rest(epoch() + Duration::hours(1));

        assert_eq!(bio.stress_level, 0.0);
        assert_eq!(bio.cognitive_load, 0.0);
        assert_eq!(bio.status, AgentStatus::Idle);
        assert!(bio.can_accept());
    }
}
