//! Confidence-based task routing.
//!
//! Routing is literal keyword overlap, not language understanding: each agent
//! kind carries a scoring profile (capability keywords, a normalizing
//! divisor, strong-signal boost terms, off-domain penalty terms) and a task
//! description scores against all six. The chair breaks near-ties.

use serde::{Deserialize, Serialize};

use crate::core::types::{AgentKind, Assignment, RoutingConflict};

/// Routing tunables. The defaults preserve the historical constants; they
/// carry no derivation beyond observed behavior.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoutingConfig {
    /// Minimum score for an agent to be considered a contender.
    pub consideration_threshold: f64,
    /// Top-two score gap below which the chair records and resolves a
    /// conflict.
    pub tie_break_margin: f64,
    /// Agent that receives tasks no contender cleared the threshold for.
    pub default_agent: AgentKind,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            consideration_threshold: 0.3,
            tie_break_margin: 0.2,
            default_agent: AgentKind::Veda,
        }
    }
}

impl RoutingConfig {
    pub fn validate(&self) -> Result<(), String> {
        if !(0.0..=1.0).contains(&self.consideration_threshold) {
            return Err("consideration_threshold must be within [0, 1]".to_string());
        }
        if !(0.0..=1.0).contains(&self.tie_break_margin) {
            return Err("tie_break_margin must be within [0, 1]".to_string());
        }
        Ok(())
    }
}

/// Static scoring strategy for one agent kind.
pub struct ScoringProfile {
    /// Capability keywords matched as case-insensitive substrings.
    pub keywords: &'static [&'static str],
    /// Keyword matches are normalized by this divisor before clamping.
    pub divisor: f64,
    /// Any of these terms adds `boost` to the score.
    pub boost_terms: &'static [&'static str],
    pub boost: f64,
    /// Any of these terms multiplies the score by `penalty`.
    pub penalty_terms: &'static [&'static str],
    pub penalty: f64,
}

const NO_TERMS: &[&str] = &[];

/// The per-kind strategy table (replaces a subclass per agent).
pub fn profile(kind: AgentKind) -> &'static ScoringProfile {
    match kind {
        AgentKind::Veda => &ScoringProfile {
            keywords: &[
                "backend",
                "api",
                "server",
                "database",
                "algorithm",
                "python",
                "node",
                "typescript",
                "logic",
                "core",
                "architecture",
                "schema",
                "migration",
                "orm",
                "microservice",
                "docker",
                "kubernetes",
                "infrastructure",
            ],
            divisor: 3.0,
            boost_terms: &["api", "backend", "server", "database"],
            boost: 0.3,
            penalty_terms: &["ui", "frontend", "css", "react component"],
            penalty: 0.3,
        },
        AgentKind::Aura => &ScoringProfile {
            keywords: &[
                "review",
                "validate",
                "audit",
                "test",
                "check",
                "wellness",
                "health",
                "stress",
                "calm",
                "accessibility",
                "documentation",
                "quality",
                "safety",
                "compliance",
            ],
            divisor: 2.0,
            boost_terms: &["review", "validate", "audit"],
            boost: 0.4,
            penalty_terms: NO_TERMS,
            penalty: 1.0,
        },
        AgentKind::Hex => &ScoringProfile {
            keywords: &[
                "nectar",
                "token",
                "economic",
                "diligence",
                "ledger",
                "accrual",
                "reward",
                "compensation",
                "blockchain",
                "genesis",
            ],
            divisor: 2.0,
            boost_terms: NO_TERMS,
            boost: 0.0,
            penalty_terms: NO_TERMS,
            penalty: 1.0,
        },
        AgentKind::Node => &ScoringProfile {
            keywords: &[
                "docker",
                "kubernetes",
                "k8s",
                "devops",
                "ci/cd",
                "pipeline",
                "integration",
                "bridge",
                "api",
                "service",
                "port",
                "container",
                "deployment",
                "orchestration",
                "health",
                "monitoring",
            ],
            divisor: 3.0,
            boost_terms: &["bridge", "integration"],
            boost: 0.4,
            penalty_terms: NO_TERMS,
            penalty: 1.0,
        },
        AgentKind::Spark => &ScoringProfile {
            keywords: &[
                "frontend",
                "ui",
                "ux",
                "design",
                "css",
                "react",
                "vue",
                "component",
                "interface",
                "visual",
                "creative",
                "documentation",
                "template",
                "html",
                "responsive",
                "calm",
                "accessible",
            ],
            divisor: 2.0,
            boost_terms: &["design", "ui", "ux", "creative"],
            boost: 0.4,
            penalty_terms: &["backend", "database", "algorithm"],
            penalty: 0.2,
        },
        AgentKind::Tess => &ScoringProfile {
            keywords: &[
                "coordinate",
                "facilitate",
                "chair",
                "optimize",
                "balance",
                "timeline",
                "dependency",
                "conflict",
                "topology",
                "distribute",
                "manage",
                "resolve",
                "plan",
                "architecture",
            ],
            divisor: 2.0,
            boost_terms: &["coordinate", "plan", "chair", "manage"],
            boost: 0.4,
            penalty_terms: NO_TERMS,
            penalty: 1.0,
        },
    }
}

/// Suitability score for `kind` on a task description, clamped to [0, 1].
pub fn score(kind: AgentKind, description: &str) -> f64 {
    let profile = profile(kind);
    let lower = description.to_lowercase();

    let matches = profile
        .keywords
        .iter()
        .filter(|keyword| lower.contains(*keyword))
        .count();
    let mut confidence = (matches as f64 / profile.divisor).min(1.0);

    if profile.boost_terms.iter().any(|term| lower.contains(term)) {
        confidence = (confidence + profile.boost).min(1.0);
    }
    if profile.penalty_terms.iter().any(|term| lower.contains(term)) {
        confidence *= profile.penalty;
    }
    confidence.clamp(0.0, 1.0)
}

/// Routing result: one preferred assignment per task plus recorded conflicts.
#[derive(Debug, Clone, PartialEq)]
pub struct RoutePlan {
    pub proposals: Vec<Assignment>,
    pub conflicts: Vec<RoutingConflict>,
}

/// Route each critical-path item to its preferred agent.
///
/// Contenders are agents scoring above the consideration threshold, sorted by
/// descending score (ring position breaks exact ties deterministically). A
/// top-two gap below the tie-break margin is a conflict the chair resolves in
/// favor of the higher score. Zero contenders fall back to the default agent
/// at the threshold confidence.
pub fn route(critical_path: &[String], config: &RoutingConfig) -> RoutePlan {
    let mut proposals = Vec::with_capacity(critical_path.len());
    let mut conflicts = Vec::new();

    for description in critical_path {
        let mut contenders: Vec<(AgentKind, f64)> = AgentKind::RING
            .iter()
            .map(|kind| (*kind, score(*kind, description)))
            .filter(|(_, confidence)| *confidence > config.consideration_threshold)
            .collect();
        contenders.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.0.position().cmp(&b.0.position()))
        });

        let (agent, confidence) = match contenders.first() {
            Some((best, best_score)) => {
                if let Some((runner_up, runner_score)) = contenders.get(1)
                    && best_score - runner_score < config.tie_break_margin
                {
                    conflicts.push(RoutingConflict {
                        description: description.clone(),
                        between: [*best, *runner_up],
                        resolved_by: AgentKind::CHAIR,
                    });
                    tracing::debug!(
                        task = %description,
                        best = %best,
                        runner_up = %runner_up,
                        "routing conflict resolved by chair"
                    );
                }
                (*best, *best_score)
            }
            // Nobody confident: the default agent takes it at threshold
            // confidence.
            None => (config.default_agent, config.consideration_threshold),
        };

        proposals.push(Assignment {
            description: description.clone(),
            agent,
            confidence,
            alternatives: contenders.iter().skip(1).map(|(kind, _)| *kind).collect(),
            estimated_hours: estimate_hours(description),
            resource: infer_resource(description).to_string(),
            redistributed_from: None,
            depends_on: Vec::new(),
            queued: false,
        });
    }

    RoutePlan {
        proposals,
        conflicts,
    }
}

/// Keyword heuristic for task sizing.
pub fn estimate_hours(description: &str) -> f64 {
    let lower = description.to_lowercase();
    if lower.contains("simple") || lower.contains("docs") {
        4.0
    } else if lower.contains("complex") || lower.contains("architecture") {
        16.0
    } else {
        8.0
    }
}

/// Infer the target resource a task belongs to.
pub fn infer_resource(description: &str) -> &'static str {
    let lower = description.to_lowercase();
    if lower.contains("wellness") {
        "pollen"
    } else if lower.contains("bridge") || lower.contains("api") {
        "terracare-bridge"
    } else if lower.contains("hive") {
        "hive-api"
    } else {
        "sandironratio-node"
    }
}
