//! Shared deterministic types for council core logic.
//!
//! These types define stable contracts between core components. They should not
//! depend on external state or I/O and must remain deterministic across runs.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The six fixed council agents, identified by kind.
///
/// Agents sit on a six-node ring; the ring position doubles as the index into
/// the registry roster and defines the two neighbors used for redistribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentKind {
    /// Backend architecture and complex systems.
    Veda,
    /// Review, validation, and wellness (absolute veto authority).
    Aura,
    /// Diligence tracking and ledger accounting.
    Hex,
    /// DevOps and API bridge development.
    Node,
    /// Frontend and creative work.
    Spark,
    /// Systems architecture and council chair (tie-breaker).
    Tess,
}

impl AgentKind {
    /// All agents in ring order (position 0 through 5).
    pub const RING: [AgentKind; 6] = [
        AgentKind::Veda,
        AgentKind::Aura,
        AgentKind::Hex,
        AgentKind::Node,
        AgentKind::Spark,
        AgentKind::Tess,
    ];

    /// The council chair, who breaks routing ties.
    pub const CHAIR: AgentKind = AgentKind::Tess;

    pub fn position(self) -> usize {
        match self {
            AgentKind::Veda => 0,
            AgentKind::Aura => 1,
            AgentKind::Hex => 2,
            AgentKind::Node => 3,
            AgentKind::Spark => 4,
            AgentKind::Tess => 5,
        }
    }

    /// Agent at `position` modulo the ring size.
    pub fn from_position(position: usize) -> AgentKind {
        Self::RING[position % Self::RING.len()]
    }

    /// The two ring neighbors: left (position - 1) first, then right
    /// (position + 1).
    pub fn neighbors(self) -> [AgentKind; 2] {
        let pos = self.position();
        [
            Self::from_position(pos + Self::RING.len() - 1),
            Self::from_position(pos + 1),
        ]
    }

    pub fn name(self) -> &'static str {
        match self {
            AgentKind::Veda => "veda",
            AgentKind::Aura => "aura",
            AgentKind::Hex => "hex",
            AgentKind::Node => "node",
            AgentKind::Spark => "spark",
            AgentKind::Tess => "tess",
        }
    }

    pub fn specialization(self) -> &'static str {
        match self {
            AgentKind::Veda => "Backend Architecture & Complex Systems",
            AgentKind::Aura => "Review, Validation & Wellness",
            AgentKind::Hex => "Diligence Tracking & Ledger Accounting",
            AgentKind::Node => "DevOps & API Bridge Development",
            AgentKind::Spark => "Frontend & Creative Work",
            AgentKind::Tess => "Council Chair & Systems Architecture",
        }
    }

    pub fn parse(name: &str) -> Option<AgentKind> {
        Self::RING.iter().copied().find(|kind| kind.name() == name)
    }
}

impl fmt::Display for AgentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Operational status of an agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentStatus {
    Idle,
    Working,
    Deliberating,
    Reviewing,
    /// Resting due to stress or overwork; accepts no new tasks.
    Recovery,
    Offline,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    Critical,
    High,
    Normal,
    Low,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    InProgress,
    Completed,
    Blocked,
}

/// A unit of work assigned to an agent during deployment.
///
/// Tasks are created when an authorized proposal deploys, mutated by the
/// owning agent on start/complete, and never deleted (completed tasks move to
/// the agent's history).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub title: String,
    pub description: String,
    /// Target resource (repository) name; guard-checked before assignment.
    pub resource: String,
    pub priority: TaskPriority,
    pub estimated_hours: f64,
    pub dependencies: Vec<String>,
    pub status: TaskStatus,
    pub assigned_agent: Option<AgentKind>,
    pub assigned_at: Option<DateTime<Utc>>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    /// Credit accrued on completion; never negative.
    pub nectar_accrued: f64,
    /// Quality multiplier in [0, 1] reported at completion.
    pub quality_score: f64,
}

/// One routed critical-path item: the chosen agent plus routing metadata.
///
/// Produced once per ceremony per task. Immutable after deliberation except
/// for the `queued` flag, which deployment may set when capacity changed
/// since authorization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    pub description: String,
    pub agent: AgentKind,
    /// Suitability confidence in [0, 1].
    pub confidence: f64,
    /// Lower-scoring contenders that also cleared the threshold.
    pub alternatives: Vec<AgentKind>,
    pub estimated_hours: f64,
    pub resource: String,
    /// Original agent when the assignment was moved to a ring neighbor.
    pub redistributed_from: Option<AgentKind>,
    /// Descriptions of assignments this one depends on (ordering only).
    pub depends_on: Vec<String>,
    /// No agent or neighbor had capacity; waiting rather than dropped.
    pub queued: bool,
}

/// Conflict recorded when the top two contenders scored within the tie-break
/// margin; the chair resolves it in favor of the higher score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutingConflict {
    pub description: String,
    pub between: [AgentKind; 2],
    pub resolved_by: AgentKind,
}

/// Ecosystem observation attached to a briefing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EcosystemState {
    pub build_stage: Option<String>,
    pub active_repos: Vec<String>,
}

/// Incoming work briefing: the input document that starts a ceremony.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Briefing {
    #[serde(default)]
    pub ecosystem_state: EcosystemState,
    /// Task descriptions to route, one assignment each.
    pub critical_path: Vec<String>,
    /// Sovereign-territory notice; a default is injected when missing.
    #[serde(default)]
    pub protected_notice: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ring_neighbors_wrap_around() {
        assert_eq!(
            AgentKind::Veda.neighbors(),
            [AgentKind::Tess, AgentKind::Aura]
        );
        assert_eq!(
            AgentKind::Tess.neighbors(),
            [AgentKind::Spark, AgentKind::Veda]
        );
    }

    #[test]
    fn positions_match_ring_order() {
        for (index, kind) in AgentKind::RING.iter().enumerate() {
            assert_eq!(kind.position(), index);
            assert_eq!(AgentKind::from_position(index), *kind);
        }
    }

    #[test]
    fn parse_round_trips_names() {
        for kind in AgentKind::RING {
            assert_eq!(AgentKind::parse(kind.name()), Some(kind));
        }
        assert_eq!(AgentKind::parse("sofie"), None);
    }
}
