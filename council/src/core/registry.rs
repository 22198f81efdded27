//! The fixed six-agent roster and per-agent task bookkeeping.
//!
//! The registry exclusively owns agent records. Identity (kind, keywords,
//! ring position) is static per [`AgentKind`]; only the biometrics and task
//! tables mutate.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::admission::{Biometrics, MAX_CONCURRENT_TASKS};
use crate::core::types::{AgentKind, AgentStatus, Task, TaskStatus};

/// One council agent: static identity plus mutable admission and task state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    pub kind: AgentKind,
    pub biometrics: Biometrics,
    /// Live tasks keyed by id; deterministic iteration order.
    pub tasks: BTreeMap<String, Task>,
    /// Completed tasks, in completion order.
    pub task_history: Vec<Task>,
    /// Id of the task currently being worked, if any.
    pub current_task: Option<String>,
    pub total_hours_worked: f64,
    pub total_nectar_accrued: f64,
}

impl Agent {
    pub fn fresh(kind: AgentKind, now: DateTime<Utc>) -> Self {
        Self {
            kind,
            biometrics: Biometrics::fresh(now),
            tasks: BTreeMap::new(),
            task_history: Vec::new(),
            current_task: None,
            total_hours_worked: 0.0,
            total_nectar_accrued: 0.0,
        }
    }

    /// Accept a new task if the admission gate allows it. Reserves one
    /// concurrency slot on success.
    pub fn assign_task(&mut self, mut task: Task, now: DateTime<Utc>) -> bool {
        if !self.biometrics.can_accept() {
            tracing::warn!(
                agent = %self.kind,
                task = %task.title,
                concurrent = self.biometrics.concurrent_tasks,
                needs_rest = self.biometrics.needs_rest(),
                "task refused"
            );
            return false;
        }
        task.assigned_agent = Some(self.kind);
        task.assigned_at = Some(now);
        task.status = TaskStatus::Pending;
        self.biometrics.concurrent_tasks += 1;
        self.tasks.insert(task.id.clone(), task);
        true
    }

    /// Begin work on an owned pending task.
    pub fn start_task(&mut self, task_id: &str, now: DateTime<Utc>) -> bool {
        let Some(task) = self.tasks.get_mut(task_id) else {
            return false;
        };
        task.started_at = Some(now);
        task.status = TaskStatus::InProgress;
        self.current_task = Some(task_id.to_string());
        self.biometrics.status = AgentStatus::Working;
        true
    }

    /// Complete an owned task: update biometrics, accrue task-level credit at
    /// `base_rate`, and move the task to history. Returns the completed task,
    /// or `None` when the id is unknown.
    pub fn complete_task(
        &mut self,
        task_id: &str,
        hours_worked: f64,
        quality_score: f64,
        base_rate: f64,
        now: DateTime<Utc>,
    ) -> Option<Task> {
        let mut task = self.tasks.remove(task_id)?;
        task.completed_at = Some(now);
        task.status = TaskStatus::Completed;
        task.quality_score = quality_score;
        task.nectar_accrued = hours_worked * base_rate * quality_score;

        self.biometrics.concurrent_tasks = self.biometrics.concurrent_tasks.saturating_sub(1);
        self.biometrics.hours_worked_today += hours_worked;
        self.biometrics.cognitive_load = (self.biometrics.cognitive_load - 0.2).max(0.0);
        if self.current_task.as_deref() == Some(task_id) {
            self.current_task = None;
        }
        if self.biometrics.concurrent_tasks == 0 {
            self.biometrics.status = AgentStatus::Idle;
        }

        self.total_hours_worked += hours_worked;
        self.total_nectar_accrued += task.nectar_accrued;
        self.task_history.push(task.clone());
        Some(task)
    }

    /// Spare concurrency slots, ignoring wellness (the veto gate covers
    /// wellness separately).
    pub fn spare_capacity(&self) -> u32 {
        MAX_CONCURRENT_TASKS.saturating_sub(self.biometrics.concurrent_tasks)
    }

    pub fn capacity_report(&self) -> CapacityReport {
        CapacityReport {
            agent: self.kind,
            can_accept: self.biometrics.can_accept(),
            current_load: self.biometrics.concurrent_tasks,
            max_load: MAX_CONCURRENT_TASKS,
        }
    }
}

/// Capacity snapshot included in proposals and status reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapacityReport {
    pub agent: AgentKind,
    pub can_accept: bool,
    pub current_load: u32,
    pub max_load: u32,
}

/// The roster, indexed by ring position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentRegistry {
    agents: Vec<Agent>,
}

impl AgentRegistry {
    /// A fresh roster of all six agents, fully rested at `now`.
    pub fn fresh(now: DateTime<Utc>) -> Self {
        Self {
            agents: AgentKind::RING
                .iter()
                .map(|kind| Agent::fresh(*kind, now))
                .collect(),
        }
    }

    pub fn agent(&self, kind: AgentKind) -> &Agent {
        &self.agents[kind.position()]
    }

    pub fn agent_mut(&mut self, kind: AgentKind) -> &mut Agent {
        &mut self.agents[kind.position()]
    }

    pub fn iter(&self) -> impl Iterator<Item = &Agent> {
        self.agents.iter()
    }

    /// Look up a live task by id across the roster.
    pub fn find_task(&self, task_id: &str) -> Option<(AgentKind, &Task)> {
        self.agents
            .iter()
            .find_map(|agent| agent.tasks.get(task_id).map(|task| (agent.kind, task)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::TaskPriority;
    use crate::test_support::epoch;

    fn sample_task(id: &str) -> Task {
        Task {
            id: id.to_string(),
            title: format!("{id} title"),
            description: format!("{id} description"),
            resource: "sandironratio-node".to_string(),
            priority: TaskPriority::High,
            estimated_hours: 4.0,
            dependencies: Vec::new(),
            status: TaskStatus::Pending,
            assigned_agent: None,
            assigned_at: None,
            started_at: None,
            completed_at: None,
            nectar_accrued: 0.0,
            quality_score: 1.0,
        }
    }

    #[test]
    fn fresh_registry_has_all_six_agents_in_ring_order() {
        let registry = AgentRegistry::fresh(epoch());
        let kinds: Vec<AgentKind> = registry.iter().map(|agent| agent.kind).collect();
        assert_eq!(kinds, AgentKind::RING);
    }

    #[test]
    fn assign_reserves_a_concurrency_slot() {
        let mut registry = AgentRegistry::fresh(epoch());
        let veda = registry.agent_mut(AgentKind::Veda);
        assert!(veda.assign_task(sample_task("t1"), epoch()));
        assert_eq!(veda.biometrics.concurrent_tasks, 1);
        assert_eq!(veda.spare_capacity(), MAX_CONCURRENT_TASKS - 1);
        assert_eq!(veda.tasks["t1"].assigned_agent, Some(AgentKind::Veda));
    }

    /// The concurrency ceiling holds: a fourth assignment is refused.
    #[test]
    fn assign_refuses_past_concurrency_ceiling() {
        let mut registry = AgentRegistry::fresh(epoch());
        let veda = registry.agent_mut(AgentKind::Veda);
        for n in 0..MAX_CONCURRENT_TASKS {
            assert!(veda.assign_task(sample_task(&format!("t{n}")), epoch()));
        }
        assert!(!veda.assign_task(sample_task("overflow"), epoch()));
        assert_eq!(veda.biometrics.concurrent_tasks, MAX_CONCURRENT_TASKS);
    }

    #[test]
    fn start_marks_task_in_progress_and_agent_working() {
        let mut registry = AgentRegistry::fresh(epoch());
        let veda = registry.agent_mut(AgentKind::Veda);
        veda.assign_task(sample_task("t1"), epoch());
        assert!(veda.start_task("t1", epoch()));
        assert_eq!(veda.tasks["t1"].status, TaskStatus::InProgress);
        assert_eq!(veda.biometrics.status, AgentStatus::Working);
        assert_eq!(veda.current_task.as_deref(), Some("t1"));
    }

    #[test]
    fn complete_releases_slot_and_accrues_credit() {
        let mut registry = AgentRegistry::fresh(epoch());
        let veda = registry.agent_mut(AgentKind::Veda);
        veda.assign_task(sample_task("t1"), epoch());
        veda.start_task("t1", epoch());

        let done = veda
            .complete_task("t1", 2.0, 0.9, 10.0, epoch())
            .expect("completed task");

        assert_eq!(done.status, TaskStatus::Completed);
        assert!((done.nectar_accrued - 18.0).abs() < 1e-9);
        assert_eq!(veda.biometrics.concurrent_tasks, 0);
        assert_eq!(veda.biometrics.status, AgentStatus::Idle);
        assert_eq!(veda.current_task, None);
        assert_eq!(veda.task_history.len(), 1);
        assert!((veda.total_nectar_accrued - 18.0).abs() < 1e-9);
    }

    #[test]
    fn complete_unknown_task_returns_none() {
        let mut registry = AgentRegistry::fresh(epoch());
        let veda = registry.agent_mut(AgentKind::Veda);
        assert!(veda.complete_task("missing", 1.0, 1.0, 10.0, epoch()).is_none());
    }
}
