//! Append-only diligence ledger.
//!
//! Completed-work credit ("nectar") accrues here after tasks finish. Entries
//! are never mutated or deleted, and per-agent running totals are updated in
//! the same append so they always equal the entry-set sums. Credit is never
//! spendable and never gates work.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::types::{AgentKind, Task};

/// Ledger tunables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Credit per hour worked before multipliers.
    pub base_rate: f64,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self { base_rate: 10.0 }
    }
}

impl LedgerConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.base_rate <= 0.0 {
            return Err("base_rate must be > 0".to_string());
        }
        Ok(())
    }
}

/// Quality flags reported with a completion; each multiplies the accrual.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompletionFlags {
    pub tested: bool,
    pub approved: bool,
    pub cross_resource: bool,
    pub documented: bool,
}

impl CompletionFlags {
    /// Combined multiplier applied on top of the quality score.
    pub fn multiplier(self) -> f64 {
        let mut multiplier = 1.0;
        if self.tested {
            multiplier *= 2.0;
        }
        if self.approved {
            multiplier *= 1.5;
        }
        if self.cross_resource {
            multiplier *= 2.0;
        }
        if self.documented {
            multiplier *= 1.3;
        }
        multiplier
    }
}

/// One immutable accrual record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub agent: AgentKind,
    pub task_id: String,
    pub task_title: String,
    pub resource: String,
    pub hours_worked: f64,
    pub base_rate: f64,
    pub quality_multiplier: f64,
    pub nectar_accrued: f64,
    pub timestamp: DateTime<Utc>,
}

/// Per-agent running totals, maintained incrementally on append.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentTotals {
    pub total_nectar: f64,
    pub total_hours: f64,
    pub tasks_completed: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DiligenceLedger {
    records: Vec<LedgerEntry>,
    totals: BTreeMap<AgentKind, AgentTotals>,
}

impl DiligenceLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a ledger from persisted parts. Totals are trusted as loaded;
    /// [`Self::verify_totals`] reports any divergence.
    pub fn from_parts(
        records: Vec<LedgerEntry>,
        totals: BTreeMap<AgentKind, AgentTotals>,
    ) -> Self {
        Self { records, totals }
    }

    /// Append a completion record and update the owning agent's totals in the
    /// same operation. Called strictly after work is done; purely accrual.
    pub fn record_completion(
        &mut self,
        agent: AgentKind,
        task: &Task,
        hours_worked: f64,
        quality_score: f64,
        flags: CompletionFlags,
        config: &LedgerConfig,
        now: DateTime<Utc>,
    ) -> LedgerEntry {
        let quality_multiplier = quality_score * flags.multiplier();
        let nectar_accrued = hours_worked * config.base_rate * quality_multiplier;

        let entry = LedgerEntry {
            agent,
            task_id: task.id.clone(),
            task_title: task.title.clone(),
            resource: task.resource.clone(),
            hours_worked,
            base_rate: config.base_rate,
            quality_multiplier,
            nectar_accrued,
            timestamp: now,
        };
        self.records.push(entry.clone());

        let totals = self.totals.entry(agent).or_default();
        totals.total_nectar += nectar_accrued;
        totals.total_hours += hours_worked;
        totals.tasks_completed += 1;

        tracing::info!(
            agent = %agent,
            task = %task.title,
            nectar = nectar_accrued,
            "diligence accrual recorded"
        );
        entry
    }

    pub fn records(&self) -> &[LedgerEntry] {
        &self.records
    }

    pub fn totals(&self) -> &BTreeMap<AgentKind, AgentTotals> {
        &self.totals
    }

    pub fn agent_totals(&self, agent: AgentKind) -> AgentTotals {
        self.totals.get(&agent).cloned().unwrap_or_default()
    }

    /// Per-agent summary with the most recent accruals (up to ten).
    pub fn agent_summary(&self, agent: AgentKind) -> AgentSummary {
        let mut recent: Vec<LedgerEntry> = self
            .records
            .iter()
            .filter(|entry| entry.agent == agent)
            .rev()
            .take(10)
            .cloned()
            .collect();
        recent.reverse();
        AgentSummary {
            agent,
            totals: self.agent_totals(agent),
            recent_accruals: recent,
        }
    }

    /// Council-wide accrual summary.
    pub fn council_summary(&self) -> CouncilSummary {
        CouncilSummary {
            total_nectar: self.totals.values().map(|t| t.total_nectar).sum(),
            total_hours: self.totals.values().map(|t| t.total_hours).sum(),
            total_tasks: self.totals.values().map(|t| t.tasks_completed).sum(),
            by_agent: self.totals.clone(),
        }
    }

    /// Snapshot of final allocations per agent, for external reporting.
    pub fn genesis_snapshot(&self, now: DateTime<Utc>) -> GenesisSnapshot {
        GenesisSnapshot {
            snapshot_at: now,
            total_supply: self.totals.values().map(|t| t.total_nectar).sum(),
            allocations: self.totals.clone(),
        }
    }

    /// Verify the running totals against the entry sums, in the same shape as
    /// registry invariant reports: one message per violation.
    pub fn verify_totals(&self) -> Vec<String> {
        let mut errors = Vec::new();
        let mut recomputed: BTreeMap<AgentKind, AgentTotals> = BTreeMap::new();
        for entry in &self.records {
            let totals = recomputed.entry(entry.agent).or_default();
            totals.total_nectar += entry.nectar_accrued;
            totals.total_hours += entry.hours_worked;
            totals.tasks_completed += 1;
        }

        for (agent, expected) in &recomputed {
            let actual = self.agent_totals(*agent);
            if (actual.total_nectar - expected.total_nectar).abs() > 1e-6
                || (actual.total_hours - expected.total_hours).abs() > 1e-6
                || actual.tasks_completed != expected.tasks_completed
            {
                errors.push(format!(
                    "{agent}: totals diverge from entry sums (nectar {:.2} vs {:.2})",
                    actual.total_nectar, expected.total_nectar
                ));
            }
        }
        for agent in self.totals.keys() {
            if !recomputed.contains_key(agent) && self.agent_totals(*agent) != AgentTotals::default()
            {
                errors.push(format!("{agent}: totals present without any entries"));
            }
        }
        errors
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgentSummary {
    pub agent: AgentKind,
    pub totals: AgentTotals,
    pub recent_accruals: Vec<LedgerEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CouncilSummary {
    pub total_nectar: f64,
    pub total_hours: f64,
    pub total_tasks: u64,
    pub by_agent: BTreeMap<AgentKind, AgentTotals>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenesisSnapshot {
    pub snapshot_at: DateTime<Utc>,
    pub total_supply: f64,
    pub allocations: BTreeMap<AgentKind, AgentTotals>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{TaskPriority, TaskStatus};
    use crate::test_support::epoch;

    fn sample_task(id: &str) -> Task {
        Task {
            id: id.to_string(),
            title: format!("{id} title"),
            description: String::new(),
            resource: "pollen".to_string(),
            priority: TaskPriority::High,
            estimated_hours: 4.0,
            dependencies: Vec::new(),
            status: TaskStatus::Completed,
            assigned_agent: Some(AgentKind::Veda),
            assigned_at: None,
            started_at: None,
            completed_at: Some(epoch()),
            nectar_accrued: 0.0,
            quality_score: 1.0,
        }
    }

    #[test]
    fn flag_multipliers_compound() {
        let flags = CompletionFlags {
            tested: true,
            approved: true,
            cross_resource: true,
            documented: true,
        };
        assert!((flags.multiplier() - 7.8).abs() < 1e-9);
        assert_eq!(CompletionFlags::default().multiplier(), 1.0);
    }

    #[test]
    fn record_completion_accrues_at_base_rate_times_multiplier() {
        let mut ledger = DiligenceLedger::new();
        let flags = CompletionFlags {
            tested: true,
            ..CompletionFlags::default()
        };

        let entry = ledger.record_completion(
            AgentKind::Veda,
            &sample_task("t1"),
            4.0,
            0.9,
            flags,
            &LedgerConfig::default(),
            epoch(),
        );

        // 4h x 10.0 x (0.9 x 2.0) = 72
        assert!((entry.nectar_accrued - 72.0).abs() < 1e-9);
        assert!((entry.quality_multiplier - 1.8).abs() < 1e-9);
    }

    /// Totals always equal the per-agent entry sums, for every agent.
    #[test]
    fn totals_match_entry_sums_after_many_appends() {
        let mut ledger = DiligenceLedger::new();
        for n in 0..5 {
            let agent = if n % 2 == 0 {
                AgentKind::Veda
            } else {
                AgentKind::Spark
            };
            ledger.record_completion(
                agent,
                &sample_task(&format!("t{n}")),
                2.0 + n as f64,
                1.0,
                CompletionFlags::default(),
                &LedgerConfig::default(),
                epoch(),
            );
        }

        assert!(ledger.verify_totals().is_empty());
        let veda_sum: f64 = ledger
            .records()
            .iter()
            .filter(|e| e.agent == AgentKind::Veda)
            .map(|e| e.nectar_accrued)
            .sum();
        assert!((ledger.agent_totals(AgentKind::Veda).total_nectar - veda_sum).abs() < 1e-9);
    }

    #[test]
    fn verify_totals_reports_divergence() {
        let mut ledger = DiligenceLedger::new();
        ledger.record_completion(
            AgentKind::Hex,
            &sample_task("t1"),
            1.0,
            1.0,
            CompletionFlags::default(),
            &LedgerConfig::default(),
            epoch(),
        );
        // Simulate a corrupted totals table.
        let mut totals = ledger.totals().clone();
        totals.get_mut(&AgentKind::Hex).expect("hex totals").total_nectar += 5.0;
        let broken = DiligenceLedger::from_parts(ledger.records().to_vec(), totals);

        let errors = broken.verify_totals();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("hex"));
    }

    #[test]
    fn agent_summary_keeps_last_ten_accruals_in_order() {
        let mut ledger = DiligenceLedger::new();
        for n in 0..12 {
            ledger.record_completion(
                AgentKind::Node,
                &sample_task(&format!("t{n:02}")),
                1.0,
                1.0,
                CompletionFlags::default(),
                &LedgerConfig::default(),
                epoch(),
            );
        }

        let summary = ledger.agent_summary(AgentKind::Node);
        assert_eq!(summary.recent_accruals.len(), 10);
        assert_eq!(summary.recent_accruals[0].task_id, "t02");
        assert_eq!(summary.recent_accruals[9].task_id, "t11");
        assert_eq!(summary.totals.tasks_completed, 12);
    }
}
