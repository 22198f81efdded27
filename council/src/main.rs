//! Six-agent council CLI.
//!
//! Drives the convening ceremony against `.council/` state in the current
//! directory: briefing in, deliberation, proposal, authorization, deployment,
//! then completion reports that accrue diligence credit.

use anyhow::Result;
use clap::{Parser, Subcommand};

use council::convening::{self, CouncilHome};
use council::core::ceremony::{Authorization, CeremonyError, DeliberationOutcome, DeploymentStatus};
use council::core::clock::{Clock, SystemClock};
use council::core::guard;
use council::core::invariants::validate_registry;
use council::core::ledger::CompletionFlags;
use council::core::types::AgentKind;
use council::exit_codes;
use council::io::briefing::load_briefing;
use council::logging;

#[derive(Parser)]
#[command(name = "council", version, about = "Six-agent council orchestration engine")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create `.council/` state with a fresh roster and empty ledger.
    Init {
        /// Overwrite existing state.
        #[arg(short, long)]
        force: bool,
    },
    /// Submit a briefing document and convene the council.
    Brief {
        /// Path to the briefing JSON file.
        file: std::path::PathBuf,
    },
    /// Route the critical path and run the wellness veto gate.
    Deliberate,
    /// Generate the formal proposal and await authorization.
    Propose,
    /// Record the authorization decision for a proposal.
    Authorize {
        /// Proposal id to decide on.
        proposal_id: String,
        /// Reject the proposal instead of approving it.
        #[arg(long)]
        reject: bool,
    },
    /// Create and start tasks for the authorized proposal.
    Deploy,
    /// Report a completed task and accrue diligence credit.
    Complete {
        /// Agent that did the work.
        agent: String,
        /// Task id to complete.
        task_id: String,
        /// Hours actually worked.
        #[arg(long)]
        hours: f64,
        /// Quality score in [0, 1].
        #[arg(long, default_value_t = 1.0)]
        quality: f64,
        /// Work shipped with tests (x2.0 accrual).
        #[arg(long)]
        tested: bool,
        /// Work passed review (x1.5 accrual).
        #[arg(long)]
        approved: bool,
        /// Work spanned resources (x2.0 accrual).
        #[arg(long)]
        cross_resource: bool,
        /// Work shipped with docs (x1.3 accrual).
        #[arg(long)]
        documented: bool,
    },
    /// Send an agent on a short break (relieves stress and cognitive load).
    Break {
        /// Agent to send on break.
        agent: String,
    },
    /// Send an agent on extended rest (resets stress and ends recovery).
    Rest {
        /// Agent to rest.
        agent: String,
    },
    /// Print ceremony phase and the daily standup.
    Status,
    /// Print diligence ledger summaries.
    Ledger {
        /// Limit the summary to one agent.
        #[arg(long)]
        agent: Option<String>,
        /// Print the genesis allocation snapshot instead.
        #[arg(long)]
        genesis: bool,
    },
    /// Check config, state invariants, and ledger totals; with a resource
    /// name, check sovereign-territory access instead.
    Check {
        /// Resource name to run through the access guard.
        resource: Option<String>,
        /// Action to report in a violation.
        #[arg(long, default_value = "access")]
        action: String,
    },
}

fn main() {
    logging::init();
    let code = match run() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{:#}", err);
            exit_codes::INVALID
        }
    };
    std::process::exit(code);
}

fn run() -> Result<i32> {
    let cli = Cli::parse();
    let home = convening::current_home()?;
    let now = SystemClock.now();

    match cli.command {
        Command::Init { force } => {
            home.init(force, now)?;
            println!("initialized {}", home.council_dir.display());
            Ok(exit_codes::OK)
        }
        Command::Brief { file } => {
            let briefing = load_briefing(&file)?;
            let mut council = home.load_council()?;
            let receipt = council.receive_briefing(briefing, now)?;
            home.save_council(&council)?;
            println!("council convened, chaired by {}", receipt.chair);
            println!("{}", receipt.summary);
            for agent in &receipt.agents {
                println!("  {:<6} {}", agent.name(), agent.specialization());
            }
            Ok(exit_codes::OK)
        }
        Command::Deliberate => cmd_deliberate(&home, now),
        Command::Propose => {
            let mut council = home.load_council()?;
            let proposal = council.generate_proposal(now)?;
            home.save_council(&council)?;
            println!("proposal {} awaiting authorization", proposal.id);
            println!("objective: {}", proposal.objective);
            println!(
                "timeline: {:.1}h over ~{:.1} days",
                proposal.timeline.total_hours, proposal.timeline.estimated_days
            );
            println!("estimated accrual: {:.1} nectar", proposal.estimate.total_nectar);
            Ok(exit_codes::OK)
        }
        Command::Authorize { proposal_id, reject } => {
            let mut council = home.load_council()?;
            let decision = council.authorize(&proposal_id, !reject, now)?;
            home.save_council(&council)?;
            match decision {
                Authorization::Approved { proposal_id } => {
                    println!("proposal {proposal_id} authorized, ready to deploy");
                }
                Authorization::Rejected => println!("proposal rejected, council standing down"),
            }
            Ok(exit_codes::OK)
        }
        Command::Deploy => cmd_deploy(&home, now),
        Command::Complete {
            agent,
            task_id,
            hours,
            quality,
            tested,
            approved,
            cross_resource,
            documented,
        } => {
            let flags = CompletionFlags {
                tested,
                approved,
                cross_resource,
                documented,
            };
            cmd_complete(&home, &agent, &task_id, hours, quality, flags, now)
        }
        Command::Break { agent } => cmd_wellness(&home, &agent, WellnessAction::Break, now),
        Command::Rest { agent } => cmd_wellness(&home, &agent, WellnessAction::Rest, now),
        Command::Status => cmd_status(&home, now),
        Command::Ledger { agent, genesis } => cmd_ledger(&home, agent.as_deref(), genesis, now),
        Command::Check { resource, action } => match resource {
            Some(resource) => cmd_check_access(&resource, &action),
            None => cmd_check(&home),
        },
    }
}

fn cmd_deliberate(home: &CouncilHome, now: chrono::DateTime<chrono::Utc>) -> Result<i32> {
    let config = home.load_config()?;
    let mut council = home.load_council()?;
    let outcome = council.deliberate(&config.routing, &config.wellness, &config.ledger, now)?;
    home.save_council(&council)?;

    match outcome {
        DeliberationOutcome::Approved(record) => {
            for assignment in &record.assignments {
                let mut line = format!(
                    "{} -> {} (confidence {:.2}, {}h, {})",
                    assignment.description,
                    assignment.agent,
                    assignment.confidence,
                    assignment.estimated_hours,
                    assignment.resource
                );
                if let Some(from) = assignment.redistributed_from {
                    line.push_str(&format!(" [redistributed from {from}]"));
                }
                if assignment.queued {
                    line.push_str(" [queued: no capacity]");
                }
                println!("{line}");
            }
            for conflict in &record.conflicts {
                println!(
                    "conflict on '{}' between {} and {}, resolved by {}",
                    conflict.description,
                    conflict.between[0],
                    conflict.between[1],
                    conflict.resolved_by
                );
            }
            println!(
                "deliberation approved: {} assignments, {:.1}h total",
                record.assignments.len(),
                record.timeline.total_hours
            );
            Ok(exit_codes::OK)
        }
        DeliberationOutcome::Vetoed { reasons } => {
            println!("deliberation vetoed:");
            for reason in &reasons {
                println!("- {reason}");
            }
            Ok(exit_codes::VETOED)
        }
    }
}

fn cmd_deploy(home: &CouncilHome, now: chrono::DateTime<chrono::Utc>) -> Result<i32> {
    let mut council = home.load_council()?;
    let report = council.deploy(now)?;
    home.save_council(&council)?;

    let mut refused = false;
    for record in &report.results {
        match &record.status {
            DeploymentStatus::Deployed { task_id } => {
                println!("deployed {} -> {} as {}", record.description, record.agent, task_id);
            }
            DeploymentStatus::Queued { reason } => {
                println!("queued   {} ({reason})", record.description);
            }
            DeploymentStatus::Refused { reason } => {
                refused = true;
                println!("refused  {} ({reason})", record.description);
            }
        }
    }
    println!(
        "deployment complete: {} deployed, {} queued",
        report.deployed(),
        report.queued()
    );
    if refused {
        Ok(exit_codes::PROTECTED)
    } else {
        Ok(exit_codes::OK)
    }
}

fn cmd_complete(
    home: &CouncilHome,
    agent: &str,
    task_id: &str,
    hours: f64,
    quality: f64,
    flags: CompletionFlags,
    now: chrono::DateTime<chrono::Utc>,
) -> Result<i32> {
    let agent = AgentKind::parse(agent)
        .ok_or_else(|| CeremonyError::UnknownAgent {
            name: agent.to_string(),
        })?;
    let config = home.load_config()?;
    let mut council = home.load_council()?;
    let mut ledger = home.load_ledger();

    let outcome = council.record_completion(
        agent,
        task_id,
        hours,
        quality,
        flags,
        &mut ledger,
        &config.ledger,
        now,
    )?;
    home.save_council(&council)?;
    // Ledger persistence faults degrade to in-memory accrual; the completion
    // itself is already durable in council.json.
    if let Err(err) = home.save_ledger(&ledger, now) {
        tracing::error!(error = %err, "ledger save failed, accrual kept in memory only");
    }

    println!(
        "{} completed {}: +{:.1} nectar (total {:.1})",
        outcome.agent, outcome.task_id, outcome.entry.nectar_accrued, outcome.total_accrued
    );
    Ok(exit_codes::OK)
}

enum WellnessAction {
    Break,
    Rest,
}

fn cmd_wellness(
    home: &CouncilHome,
    agent: &str,
    action: WellnessAction,
    now: chrono::DateTime<chrono::Utc>,
) -> Result<i32> {
    let agent = AgentKind::parse(agent)
        .ok_or_else(|| CeremonyError::UnknownAgent {
            name: agent.to_string(),
        })?;
    let mut council = home.load_council()?;
    let biometrics = &mut council.registry.agent_mut(agent).biometrics;
    match action {
        WellnessAction::Break => biometrics.take_break(now),
        WellnessAction::Rest => biometrics.rest(now),
    }
    let status = biometrics.status;
    let stress = biometrics.stress_level;
    home.save_council(&council)?;
    println!("{agent} now {status:?} (stress {stress:.2})");
    Ok(exit_codes::OK)
}

fn cmd_status(home: &CouncilHome, now: chrono::DateTime<chrono::Utc>) -> Result<i32> {
    let config = home.load_config()?;
    let council = home.load_council()?;

    println!("phase: {}", council.ceremony.phase);
    if let Some(reasons) = &council.ceremony.veto {
        println!("last deliberation vetoed:");
        for reason in reasons {
            println!("- {reason}");
        }
    }
    if let Some(proposal) = &council.ceremony.proposal {
        println!("proposal: {} (authorized: {:?})", proposal.id, proposal.authorized);
    }
    if let Some(record) = &council.ceremony.deliberation {
        for assignment in record.assignments.iter().filter(|a| a.queued) {
            println!("queued: {} (no capacity)", assignment.description);
        }
    }

    let standup = council.standup(&config.wellness, now);
    println!("health: {}", standup.health);
    for report in &standup.reports {
        println!(
            "{:<6} {:?} tasks={} stress={:.2} load={:.2} nectar={:.1}{}{}",
            report.agent.name(),
            report.status,
            report.concurrent_tasks,
            report.stress_level,
            report.cognitive_load,
            report.total_nectar_accrued,
            if report.needs_break { " [needs break]" } else { "" },
            match &report.current_task {
                Some(task) => format!(" ({task})"),
                None => String::new(),
            }
        );
    }
    for blocker in &standup.blockers {
        println!("blocker: {blocker}");
    }
    Ok(exit_codes::OK)
}

fn cmd_ledger(
    home: &CouncilHome,
    agent: Option<&str>,
    genesis: bool,
    now: chrono::DateTime<chrono::Utc>,
) -> Result<i32> {
    let ledger = home.load_ledger();

    if genesis {
        let snapshot = ledger.genesis_snapshot(now);
        println!("genesis snapshot, total supply {:.1} nectar", snapshot.total_supply);
        for (agent, totals) in &snapshot.allocations {
            println!("{:<6} {:.1}", agent.name(), totals.total_nectar);
        }
        return Ok(exit_codes::OK);
    }

    if let Some(name) = agent {
        let agent = AgentKind::parse(name)
            .ok_or_else(|| CeremonyError::UnknownAgent {
                name: name.to_string(),
            })?;
        let summary = ledger.agent_summary(agent);
        println!(
            "{}: {:.1} nectar over {:.1}h across {} tasks",
            agent, summary.totals.total_nectar, summary.totals.total_hours, summary.totals.tasks_completed
        );
        for entry in &summary.recent_accruals {
            println!(
                "  {} {} +{:.1} ({}h x{:.2})",
                entry.timestamp.format("%Y-%m-%d"),
                entry.task_title,
                entry.nectar_accrued,
                entry.hours_worked,
                entry.quality_multiplier
            );
        }
        return Ok(exit_codes::OK);
    }

    let summary = ledger.council_summary();
    println!(
        "council: {:.1} nectar over {:.1}h across {} tasks",
        summary.total_nectar, summary.total_hours, summary.total_tasks
    );
    for (agent, totals) in &summary.by_agent {
        println!(
            "{:<6} {:.1} nectar, {} tasks",
            agent.name(),
            totals.total_nectar,
            totals.tasks_completed
        );
    }
    Ok(exit_codes::OK)
}

fn cmd_check_access(resource: &str, action: &str) -> Result<i32> {
    match guard::assert_allowed(resource, action) {
        Ok(()) => {
            println!("{resource}: permitted");
            Ok(exit_codes::OK)
        }
        Err(violation) => {
            println!("{violation}");
            Ok(exit_codes::PROTECTED)
        }
    }
}

fn cmd_check(home: &CouncilHome) -> Result<i32> {
    let config = home.load_config()?;
    config.validate()?;
    let council = home.load_council()?;
    let ledger = home.load_ledger();

    let mut errors = validate_registry(&council.registry);
    errors.extend(ledger.verify_totals());
    if errors.is_empty() {
        println!("ok");
        Ok(exit_codes::OK)
    } else {
        println!("invariant violations:");
        for error in &errors {
            println!("- {error}");
        }
        Ok(exit_codes::INVALID)
    }
}
