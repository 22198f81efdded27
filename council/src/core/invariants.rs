//! Semantic invariants over the agent roster.

use crate::core::admission::MAX_CONCURRENT_TASKS;
use crate::core::registry::AgentRegistry;
use crate::core::types::AgentKind;

/// Check roster invariants not enforced by construction:
/// - Exactly six agents, one per ring position
/// - `concurrent_tasks <= MAX_CONCURRENT_TASKS`
/// - Stress and cognitive load within `[0, 1]`
/// - Non-negative hour and nectar totals
pub fn validate_registry(registry: &AgentRegistry) -> Vec<String> {
    let mut errors = Vec::new();

    let mut seen = [false; 6];
    for agent in registry.iter() {
        let position = agent.kind.position();
        if seen[position] {
            errors.push(format!("duplicate agent at ring position {position}"));
        }
        seen[position] = true;
        validate_agent(agent, &mut errors);
    }
    for (position, present) in seen.iter().enumerate() {
        if !present {
            errors.push(format!(
                "missing agent {} at ring position {position}",
                AgentKind::from_position(position)
            ));
        }
    }
    errors
}

fn validate_agent(agent: &crate::core::registry::Agent, errors: &mut Vec<String>) {
    let kind = agent.kind;
    let bio = &agent.biometrics;

    if bio.concurrent_tasks > MAX_CONCURRENT_TASKS {
        errors.push(format!(
            "{kind}: concurrent_tasks {} exceeds maximum {MAX_CONCURRENT_TASKS}",
            bio.concurrent_tasks
        ));
    }
    if !(0.0..=1.0).contains(&bio.stress_level) {
        errors.push(format!(
            "{kind}: stress_level {} outside [0, 1]",
            bio.stress_level
        ));
    }
    if !(0.0..=1.0).contains(&bio.cognitive_load) {
        errors.push(format!(
            "{kind}: cognitive_load {} outside [0, 1]",
            bio.cognitive_load
        ));
    }
    if bio.hours_worked_today < 0.0 {
        errors.push(format!(
            "{kind}: hours_worked_today {} is negative",
            bio.hours_worked_today
        ));
    }
    if agent.total_hours_worked < 0.0 {
        errors.push(format!(
            "{kind}: total_hours_worked {} is negative",
            agent.total_hours_worked
        ));
    }
    if agent.total_nectar_accrued < 0.0 {
        errors.push(format!(
            "{kind}: total_nectar_accrued {} is negative",
            agent.total_nectar_accrued
        ));
    }
}
