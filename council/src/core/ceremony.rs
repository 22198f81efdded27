//! The convening ceremony: a strictly ordered six-phase state machine that
//! turns a briefing into deployed task assignments.
//!
//! `Idle → ReceivingBriefing → Deliberating → Proposing →
//! AwaitingAuthorization → Deploying → Complete`, no skipping. Rejection at
//! authorization and a wellness veto during deliberation both return to
//! `Idle`; a vetoed cycle is not restartable, the caller must submit a fresh
//! briefing. At most one ceremony is active at a time, and the whole context
//! is an explicit value so isolated instances can run side by side in tests.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::guard;
use crate::core::ledger::{CompletionFlags, DiligenceLedger, LedgerConfig, LedgerEntry};
use crate::core::redistribute;
use crate::core::registry::{AgentRegistry, CapacityReport};
use crate::core::router::{self, RoutingConfig};
use crate::core::types::{
    AgentKind, AgentStatus, Assignment, Briefing, RoutingConflict, Task, TaskPriority, TaskStatus,
};

/// Notice injected into briefings that arrive without one.
pub const DEFAULT_PROTECTED_NOTICE: &str =
    "sofie-llama-backend is sovereign territory - the council builds external interfaces only";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Idle,
    ReceivingBriefing,
    Deliberating,
    Proposing,
    AwaitingAuthorization,
    Deploying,
    Complete,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Idle => "idle",
            Phase::ReceivingBriefing => "receiving_briefing",
            Phase::Deliberating => "deliberating",
            Phase::Proposing => "proposing",
            Phase::AwaitingAuthorization => "awaiting_authorization",
            Phase::Deploying => "deploying",
            Phase::Complete => "complete",
        };
        f.write_str(name)
    }
}

/// Wellness tunables for the veto gate and break policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WellnessConfig {
    /// Total estimated hours above which a plan is vetoed.
    pub workload_ceiling_hours: f64,
    /// Hours between breaks before `needs_break` flags an agent.
    pub break_interval_hours: f64,
}

impl Default for WellnessConfig {
    fn default() -> Self {
        Self {
            workload_ceiling_hours: 40.0,
            break_interval_hours: 4.0,
        }
    }
}

impl WellnessConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.workload_ceiling_hours <= 0.0 {
            return Err("workload_ceiling_hours must be > 0".to_string());
        }
        if self.break_interval_hours <= 0.0 {
            return Err("break_interval_hours must be > 0".to_string());
        }
        Ok(())
    }
}

/// A reason the reviewer vetoed a deliberation outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum VetoReason {
    /// An assigned agent cannot accept work post-redistribution.
    AgentOverload { agent: AgentKind },
    /// The plan's total estimated hours exceed the workload ceiling.
    HeavyWorkload { total_hours: f64, ceiling: f64 },
}

impl fmt::Display for VetoReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VetoReason::AgentOverload { agent } => {
                write!(f, "agent_overload: {agent} already at capacity")
            }
            VetoReason::HeavyWorkload {
                total_hours,
                ceiling,
            } => write!(
                f,
                "heavy_workload: total workload {total_hours}h exceeds the {ceiling}h ceiling"
            ),
        }
    }
}

/// Plan timeline totals, assuming parallel work across the roster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Timeline {
    pub total_hours: f64,
    pub estimated_days: f64,
    pub estimated_weeks: f64,
}

/// Advisory credit estimate for a plan; never binding and never a gate.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AccrualEstimate {
    pub by_agent: BTreeMap<AgentKind, AgentEstimate>,
    pub total_nectar: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentEstimate {
    pub hours: f64,
    pub nectar: f64,
}

/// Outcome of a completed deliberation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliberationRecord {
    pub completed_at: DateTime<Utc>,
    pub assignments: Vec<Assignment>,
    pub conflicts: Vec<RoutingConflict>,
    pub redistributions: u32,
    pub timeline: Timeline,
    pub estimate: AccrualEstimate,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DeliberationOutcome {
    Approved(DeliberationRecord),
    /// The reviewer halted the ceremony; terminal for this cycle.
    Vetoed { reasons: Vec<VetoReason> },
}

/// The formal proposal awaiting an external authorization decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Proposal {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub objective: String,
    pub assignments: Vec<Assignment>,
    pub timeline: Timeline,
    pub estimate: AccrualEstimate,
    pub capacity: Vec<CapacityReport>,
    pub authorized: Option<bool>,
    pub authorized_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Authorization {
    Approved { proposal_id: String },
    /// Proposal discarded; the council stands down to idle.
    Rejected,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BriefingReceipt {
    pub chair: AgentKind,
    pub agents: Vec<AgentKind>,
    pub summary: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DeploymentStatus {
    Deployed { task_id: String },
    /// Waiting for capacity; visibly distinct from deployed work.
    Queued { reason: String },
    /// The access guard refused the target resource.
    Refused { reason: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeploymentRecord {
    pub description: String,
    pub agent: AgentKind,
    #[serde(flatten)]
    pub status: DeploymentStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeploymentReport {
    pub results: Vec<DeploymentRecord>,
}

impl DeploymentReport {
    pub fn deployed(&self) -> usize {
        self.results
            .iter()
            .filter(|record| matches!(record.status, DeploymentStatus::Deployed { .. }))
            .count()
    }

    pub fn queued(&self) -> usize {
        self.results
            .iter()
            .filter(|record| matches!(record.status, DeploymentStatus::Queued { .. }))
            .count()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletionOutcome {
    pub agent: AgentKind,
    pub task_id: String,
    pub entry: LedgerEntry,
    pub total_accrued: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CouncilHealth {
    Healthy,
    Caution,
    Critical,
}

impl fmt::Display for CouncilHealth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CouncilHealth::Healthy => "healthy",
            CouncilHealth::Caution => "caution",
            CouncilHealth::Critical => "critical",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgentReport {
    pub agent: AgentKind,
    pub status: AgentStatus,
    pub current_task: Option<String>,
    pub concurrent_tasks: u32,
    pub tasks_completed_today: usize,
    pub stress_level: f64,
    pub cognitive_load: f64,
    pub hours_worked_today: f64,
    pub needs_break: bool,
    pub can_accept: bool,
    pub total_nectar_accrued: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StandupReport {
    pub timestamp: DateTime<Utc>,
    pub reports: Vec<AgentReport>,
    pub health: CouncilHealth,
    pub blockers: Vec<String>,
}

/// Caller errors and phase violations. A wellness veto is not among these:
/// it is a terminal deliberation outcome, not an error to catch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CeremonyError {
    #[error("a ceremony is already in progress (phase: {phase})")]
    AlreadyConvened { phase: Phase },
    #[error("briefing has an empty critical path")]
    EmptyBriefing,
    #[error("{operation} requires phase {expected}, current phase is {actual}")]
    PhaseViolation {
        operation: &'static str,
        expected: Phase,
        actual: Phase,
    },
    #[error("no deliberation record to build a proposal from")]
    NoDeliberation,
    #[error("no proposal awaiting authorization")]
    NoProposal,
    #[error("unknown proposal id '{id}'")]
    UnknownProposal { id: String },
    #[error("no authorized proposal to deploy")]
    NotAuthorized,
    #[error("unknown agent '{name}'")]
    UnknownAgent { name: String },
    #[error("agent {agent} has no task '{task_id}'")]
    UnknownTask { agent: AgentKind, task_id: String },
}

/// Mutable ceremony bookkeeping; at most one is active per council.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CeremonyState {
    pub phase: Phase,
    pub briefing: Option<Briefing>,
    pub meeting_start: Option<DateTime<Utc>>,
    pub deliberation: Option<DeliberationRecord>,
    pub proposal: Option<Proposal>,
    /// Reasons from the last veto, kept until the next briefing.
    pub veto: Option<Vec<VetoReason>>,
}

impl CeremonyState {
    fn idle() -> Self {
        Self {
            phase: Phase::Idle,
            briefing: None,
            meeting_start: None,
            deliberation: None,
            proposal: None,
            veto: None,
        }
    }
}

/// The whole orchestration context: roster plus ceremony state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Council {
    pub registry: AgentRegistry,
    pub ceremony: CeremonyState,
    task_seq: u64,
}

impl Council {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            registry: AgentRegistry::fresh(now),
            ceremony: CeremonyState::idle(),
            task_seq: 0,
        }
    }

    /// Phase 1-2: receive and validate a briefing, convening the council.
    ///
    /// Refused while a ceremony is between deliberation and deployment.
    pub fn receive_briefing(
        &mut self,
        mut briefing: Briefing,
        now: DateTime<Utc>,
    ) -> Result<BriefingReceipt, CeremonyError> {
        if matches!(
            self.ceremony.phase,
            Phase::Deliberating | Phase::Proposing | Phase::AwaitingAuthorization | Phase::Deploying
        ) {
            return Err(CeremonyError::AlreadyConvened {
                phase: self.ceremony.phase,
            });
        }
        if briefing.critical_path.is_empty() {
            return Err(CeremonyError::EmptyBriefing);
        }
        if briefing.protected_notice.is_none() {
            tracing::warn!("briefing missing protected notice, adding default");
            briefing.protected_notice = Some(DEFAULT_PROTECTED_NOTICE.to_string());
        }

        let summary = summarize_briefing(&briefing);
        self.ceremony = CeremonyState {
            phase: Phase::ReceivingBriefing,
            briefing: Some(briefing),
            meeting_start: Some(now),
            deliberation: None,
            proposal: None,
            veto: None,
        };
        tracing::info!(%summary, "council convened");

        Ok(BriefingReceipt {
            chair: AgentKind::CHAIR,
            agents: AgentKind::RING.to_vec(),
            summary,
        })
    }

    /// Phase 3: route, redistribute, order dependencies, and run the veto
    /// gate. Approval stores the deliberation record; a veto returns the
    /// ceremony to idle with the reasons attached.
    pub fn deliberate(
        &mut self,
        routing: &RoutingConfig,
        wellness: &WellnessConfig,
        ledger_config: &LedgerConfig,
        now: DateTime<Utc>,
    ) -> Result<DeliberationOutcome, CeremonyError> {
        if self.ceremony.phase != Phase::ReceivingBriefing {
            return Err(CeremonyError::PhaseViolation {
                operation: "deliberate",
                expected: Phase::ReceivingBriefing,
                actual: self.ceremony.phase,
            });
        }
        let briefing = self.ceremony.briefing.clone().ok_or(CeremonyError::PhaseViolation {
            operation: "deliberate",
            expected: Phase::ReceivingBriefing,
            actual: self.ceremony.phase,
        })?;
        self.ceremony.phase = Phase::Deliberating;

        let plan = router::route(&briefing.critical_path, routing);
        let mut loads = redistribute::load_table(&self.registry);
        let mut assignments = redistribute::distribute(plan.proposals, &mut loads, routing);
        resolve_dependencies(&mut assignments);

        let reasons = veto_gate(&assignments, &self.registry, wellness);
        if !reasons.is_empty() {
            tracing::warn!(reasons = reasons.len(), "deliberation vetoed");
            self.ceremony.phase = Phase::Idle;
            self.ceremony.veto = Some(reasons.clone());
            return Ok(DeliberationOutcome::Vetoed { reasons });
        }

        let record = DeliberationRecord {
            completed_at: now,
            redistributions: assignments
                .iter()
                .filter(|a| a.redistributed_from.is_some())
                .count() as u32,
            timeline: plan_timeline(&assignments),
            estimate: accrual_estimate(&assignments, ledger_config),
            conflicts: plan.conflicts,
            assignments,
        };
        self.ceremony.deliberation = Some(record.clone());
        Ok(DeliberationOutcome::Approved(record))
    }

    /// Phase 4: emit the formal proposal and await authorization.
    pub fn generate_proposal(&mut self, now: DateTime<Utc>) -> Result<Proposal, CeremonyError> {
        if self.ceremony.phase != Phase::Deliberating {
            return Err(CeremonyError::PhaseViolation {
                operation: "propose",
                expected: Phase::Deliberating,
                actual: self.ceremony.phase,
            });
        }
        if self.ceremony.deliberation.is_none() {
            return Err(CeremonyError::NoDeliberation);
        }
        self.ceremony.phase = Phase::Proposing;
        let record = self
            .ceremony
            .deliberation
            .as_ref()
            .ok_or(CeremonyError::NoDeliberation)?;

        let proposal = Proposal {
            id: format!("proposal-{}", now.format("%Y%m%d%H%M%S")),
            created_at: now,
            objective: objective_from(self.ceremony.briefing.as_ref()),
            assignments: record.assignments.clone(),
            timeline: record.timeline.clone(),
            estimate: record.estimate.clone(),
            capacity: self.registry.iter().map(|a| a.capacity_report()).collect(),
            authorized: None,
            authorized_at: None,
        };
        self.ceremony.proposal = Some(proposal.clone());
        self.ceremony.phase = Phase::AwaitingAuthorization;
        tracing::info!(id = %proposal.id, "proposal generated, awaiting authorization");
        Ok(proposal)
    }

    /// Phase 5: the external authorization decision. Rejection discards the
    /// proposal and stands the council down; nothing was mutated before this
    /// point, so the rollback is side-effect free.
    pub fn authorize(
        &mut self,
        proposal_id: &str,
        authorized: bool,
        now: DateTime<Utc>,
    ) -> Result<Authorization, CeremonyError> {
        if self.ceremony.phase != Phase::AwaitingAuthorization {
            return Err(CeremonyError::PhaseViolation {
                operation: "authorize",
                expected: Phase::AwaitingAuthorization,
                actual: self.ceremony.phase,
            });
        }
        let proposal = self
            .ceremony
            .proposal
            .as_mut()
            .ok_or(CeremonyError::NoProposal)?;
        if proposal.id != proposal_id {
            return Err(CeremonyError::UnknownProposal {
                id: proposal_id.to_string(),
            });
        }

        if authorized {
            proposal.authorized = Some(true);
            proposal.authorized_at = Some(now);
            tracing::info!(id = %proposal_id, "proposal authorized");
            Ok(Authorization::Approved {
                proposal_id: proposal_id.to_string(),
            })
        } else {
            tracing::info!(id = %proposal_id, "proposal rejected, council standing down");
            self.ceremony.proposal = None;
            self.ceremony.deliberation = None;
            self.ceremony.phase = Phase::Idle;
            Ok(Authorization::Rejected)
        }
    }

    /// Phase 6: create and start a task per authorized assignment.
    ///
    /// Partial-failure tolerant: an agent that can no longer accept marks
    /// only that assignment queued. No credit check gates task start; credit
    /// is strictly post-completion.
    pub fn deploy(&mut self, now: DateTime<Utc>) -> Result<DeploymentReport, CeremonyError> {
        let authorized = self
            .ceremony
            .proposal
            .as_ref()
            .is_some_and(|proposal| proposal.authorized == Some(true));
        if self.ceremony.phase != Phase::AwaitingAuthorization || !authorized {
            return Err(CeremonyError::NotAuthorized);
        }
        self.ceremony.phase = Phase::Deploying;
        let assignments = self
            .ceremony
            .proposal
            .as_ref()
            .map(|proposal| proposal.assignments.clone())
            .unwrap_or_default();

        let mut results = Vec::with_capacity(assignments.len());
        for assignment in assignments {
            let status = self.deploy_assignment(&assignment, now);
            results.push(DeploymentRecord {
                description: assignment.description,
                agent: assignment.agent,
                status,
            });
        }

        self.ceremony.phase = Phase::Complete;
        let report = DeploymentReport { results };
        tracing::info!(
            deployed = report.deployed(),
            queued = report.queued(),
            "deployment complete"
        );
        Ok(report)
    }

    fn deploy_assignment(&mut self, assignment: &Assignment, now: DateTime<Utc>) -> DeploymentStatus {
        if assignment.queued {
            return DeploymentStatus::Queued {
                reason: "waiting_for_capacity".to_string(),
            };
        }
        if let Err(violation) = guard::assert_allowed(&assignment.resource, "assign") {
            return DeploymentStatus::Refused {
                reason: violation.to_string(),
            };
        }

        self.task_seq += 1;
        let task_id = format!("council-{}-{:04}", assignment.agent, self.task_seq);
        let task = Task {
            id: task_id.clone(),
            title: assignment.description.clone(),
            description: assignment.description.clone(),
            resource: assignment.resource.clone(),
            priority: TaskPriority::High,
            estimated_hours: assignment.estimated_hours,
            dependencies: assignment.depends_on.clone(),
            status: TaskStatus::Pending,
            assigned_agent: None,
            assigned_at: None,
            started_at: None,
            completed_at: None,
            nectar_accrued: 0.0,
            quality_score: 1.0,
        };

        let agent = self.registry.agent_mut(assignment.agent);
        if agent.assign_task(task, now) {
            agent.start_task(&task_id, now);
            DeploymentStatus::Deployed { task_id }
        } else {
            // Capacity changed since authorization.
            DeploymentStatus::Queued {
                reason: "agent_at_capacity".to_string(),
            }
        }
    }

    /// Record a completion report and accrue diligence credit.
    pub fn record_completion(
        &mut self,
        agent: AgentKind,
        task_id: &str,
        hours_worked: f64,
        quality_score: f64,
        flags: CompletionFlags,
        ledger: &mut DiligenceLedger,
        ledger_config: &LedgerConfig,
        now: DateTime<Utc>,
    ) -> Result<CompletionOutcome, CeremonyError> {
        let task = self
            .registry
            .agent_mut(agent)
            .complete_task(task_id, hours_worked, quality_score, ledger_config.base_rate, now)
            .ok_or_else(|| CeremonyError::UnknownTask {
                agent,
                task_id: task_id.to_string(),
            })?;

        let entry = ledger.record_completion(
            agent,
            &task,
            hours_worked,
            quality_score,
            flags,
            ledger_config,
            now,
        );
        Ok(CompletionOutcome {
            agent,
            task_id: task_id.to_string(),
            total_accrued: ledger.agent_totals(agent).total_nectar,
            entry,
        })
    }

    /// Daily standup: per-agent status, council health, blockers.
    pub fn standup(&self, wellness: &WellnessConfig, now: DateTime<Utc>) -> StandupReport {
        let reports = self
            .registry
            .iter()
            .map(|agent| {
                let current_task = agent
                    .current_task
                    .as_ref()
                    .and_then(|id| agent.tasks.get(id))
                    .map(|task| task.title.clone());
                AgentReport {
                    agent: agent.kind,
                    status: agent.biometrics.status,
                    current_task,
                    concurrent_tasks: agent.biometrics.concurrent_tasks,
                    tasks_completed_today: agent
                        .task_history
                        .iter()
                        .filter(|task| {
                            task.completed_at
                                .is_some_and(|at| at.date_naive() == now.date_naive())
                        })
                        .count(),
                    stress_level: agent.biometrics.stress_level,
                    cognitive_load: agent.biometrics.cognitive_load,
                    hours_worked_today: agent.biometrics.hours_worked_today,
                    needs_break: agent
                        .biometrics
                        .needs_break(now, wellness.break_interval_hours),
                    can_accept: agent.biometrics.can_accept(),
                    total_nectar_accrued: agent.total_nectar_accrued,
                }
            })
            .collect();

        let stressed = self
            .registry
            .iter()
            .filter(|agent| agent.biometrics.stress_level > 0.6)
            .count();
        let health = if stressed > 3 {
            CouncilHealth::Critical
        } else if stressed > 0 {
            CouncilHealth::Caution
        } else {
            CouncilHealth::Healthy
        };

        let blockers = self
            .registry
            .iter()
            .filter(|agent| agent.biometrics.status == AgentStatus::Recovery)
            .map(|agent| format!("{} in recovery", agent.kind))
            .collect();

        StandupReport {
            timestamp: now,
            reports,
            health,
            blockers,
        }
    }
}

fn summarize_briefing(briefing: &Briefing) -> String {
    format!(
        "Ecosystem stage: {} | Active repos: {} | Critical tasks: {}",
        briefing
            .ecosystem_state
            .build_stage
            .as_deref()
            .unwrap_or("unknown"),
        briefing.ecosystem_state.active_repos.len(),
        briefing.critical_path.len()
    )
}

fn objective_from(briefing: Option<&Briefing>) -> String {
    let stage = briefing
        .and_then(|b| b.ecosystem_state.build_stage.as_deref())
        .unwrap_or("development");
    let words: Vec<String> = stage
        .split('_')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect();
    format!("Ecosystem {}", words.join(" "))
}

/// Declare dependency ordering between assignments: bridge/api work depends
/// on backend work, integration work on component/service/api work. This is
/// an ordering, not an execution block; independent assignments sort first.
fn resolve_dependencies(assignments: &mut Vec<Assignment>) {
    let backend: Vec<String> = assignments
        .iter()
        .filter(|a| a.description.to_lowercase().contains("backend"))
        .map(|a| a.description.clone())
        .collect();
    let components: Vec<String> = assignments
        .iter()
        .filter(|a| {
            let lower = a.description.to_lowercase();
            ["component", "service", "api"]
                .iter()
                .any(|term| lower.contains(term))
        })
        .map(|a| a.description.clone())
        .collect();

    for assignment in assignments.iter_mut() {
        let lower = assignment.description.to_lowercase();
        if lower.contains("bridge") || lower.contains("api") {
            assignment.depends_on = backend
                .iter()
                .filter(|desc| **desc != assignment.description)
                .cloned()
                .collect();
        }
        if lower.contains("integration") {
            assignment.depends_on = components
                .iter()
                .filter(|desc| **desc != assignment.description)
                .cloned()
                .collect();
        }
    }

    let (independent, dependent): (Vec<Assignment>, Vec<Assignment>) = assignments
        .drain(..)
        .partition(|assignment| assignment.depends_on.is_empty());
    assignments.extend(independent);
    assignments.extend(dependent);
}

/// The reviewer's veto gate. Queued assignments are excluded from the
/// overload check: they hold no capacity and the ceremony may still complete
/// around them.
fn veto_gate(
    assignments: &[Assignment],
    registry: &AgentRegistry,
    wellness: &WellnessConfig,
) -> Vec<VetoReason> {
    let mut reasons = Vec::new();
    let mut flagged: Vec<AgentKind> = Vec::new();

    for assignment in assignments.iter().filter(|a| !a.queued) {
        if !registry.agent(assignment.agent).biometrics.can_accept()
            && !flagged.contains(&assignment.agent)
        {
            flagged.push(assignment.agent);
            reasons.push(VetoReason::AgentOverload {
                agent: assignment.agent,
            });
        }
    }

    let total_hours: f64 = assignments.iter().map(|a| a.estimated_hours).sum();
    if total_hours > wellness.workload_ceiling_hours {
        reasons.push(VetoReason::HeavyWorkload {
            total_hours,
            ceiling: wellness.workload_ceiling_hours,
        });
    }
    reasons
}

fn plan_timeline(assignments: &[Assignment]) -> Timeline {
    let total_hours: f64 = assignments.iter().map(|a| a.estimated_hours).sum();
    let roster_hours_per_day = AgentKind::RING.len() as f64 * 8.0;
    let estimated_days = (total_hours / roster_hours_per_day).max(1.0);
    Timeline {
        total_hours,
        estimated_days: (estimated_days * 10.0).round() / 10.0,
        estimated_weeks: (estimated_days / 5.0 * 10.0).round() / 10.0,
    }
}

fn accrual_estimate(assignments: &[Assignment], config: &LedgerConfig) -> AccrualEstimate {
    let mut estimate = AccrualEstimate::default();
    for assignment in assignments {
        let mut nectar = assignment.estimated_hours * config.base_rate;
        if assignment.description.to_lowercase().contains("cross") {
            nectar *= 2.0;
        }
        let agent = estimate.by_agent.entry(assignment.agent).or_default();
        agent.hours += assignment.estimated_hours;
        agent.nectar += nectar;
        estimate.total_nectar += nectar;
    }
    estimate
}
