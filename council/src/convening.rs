//! `.council/` home directory: scaffolding plus load/save for every command.
//!
//! All persistent state lives under `.council/state/` in the project root:
//! `config.toml` (human-edited tunables), `council.json` (roster and ceremony
//! state), `ledger.json` (diligence records). Commands load, mutate in
//! memory, then save atomically.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, Utc};

use crate::core::ceremony::Council;
use crate::core::ledger::DiligenceLedger;
use crate::io::briefing::BRIEFING_SCHEMA;
use crate::io::config::{self, CouncilConfig};
use crate::io::ledger_store;
use crate::io::state;

/// Canonical paths within `.council/` for a project root.
#[derive(Debug, Clone)]
pub struct CouncilHome {
    pub root: PathBuf,
    pub council_dir: PathBuf,
    pub state_dir: PathBuf,
    pub config_path: PathBuf,
    pub council_path: PathBuf,
    pub ledger_path: PathBuf,
    pub schema_path: PathBuf,
}

impl CouncilHome {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let council_dir = root.join(".council");
        let state_dir = council_dir.join("state");
        Self {
            root,
            config_path: state_dir.join("config.toml"),
            council_path: state_dir.join("council.json"),
            ledger_path: state_dir.join("ledger.json"),
            schema_path: state_dir.join("briefing.schema.json"),
            council_dir,
            state_dir,
        }
    }

    /// Create `.council/` scaffolding with a fresh roster and empty ledger.
    ///
    /// Fails if `.council/` already exists unless `force` is set.
    pub fn init(&self, force: bool, now: DateTime<Utc>) -> Result<()> {
        if self.council_dir.exists() && !force {
            return Err(anyhow!(
                "council init: .council already exists (use --force to overwrite)"
            ));
        }
        if self.council_dir.exists() && !self.council_dir.is_dir() {
            return Err(anyhow!("council init: .council exists but is not a directory"));
        }

        fs::create_dir_all(&self.state_dir)
            .with_context(|| format!("create directory {}", self.state_dir.display()))?;
        config::write_config(&self.config_path, &CouncilConfig::default())?;
        state::write_council(&self.council_path, &Council::new(now))?;
        ledger_store::write_ledger(&self.ledger_path, &DiligenceLedger::new(), now)?;
        fs::write(&self.schema_path, BRIEFING_SCHEMA)
            .with_context(|| format!("write {}", self.schema_path.display()))?;
        Ok(())
    }

    pub fn load_config(&self) -> Result<CouncilConfig> {
        config::load_config(&self.config_path)
    }

    pub fn load_council(&self) -> Result<Council> {
        if !self.council_path.exists() {
            return Err(anyhow!(
                "no council state at {} (run `council init` first)",
                self.council_path.display()
            ));
        }
        state::load_council(&self.council_path)
    }

    pub fn save_council(&self, council: &Council) -> Result<()> {
        state::write_council(&self.council_path, council)
    }

    pub fn load_ledger(&self) -> DiligenceLedger {
        ledger_store::load_ledger(&self.ledger_path)
    }

    pub fn save_ledger(&self, ledger: &DiligenceLedger, now: DateTime<Utc>) -> Result<()> {
        ledger_store::write_ledger(&self.ledger_path, ledger, now)
    }
}

/// Resolve the home for the current working directory.
pub fn current_home() -> Result<CouncilHome> {
    let cwd = std::env::current_dir().context("resolve current directory")?;
    Ok(CouncilHome::new(cwd))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ceremony::Phase;
    use crate::test_support::epoch;

    #[test]
    fn init_creates_expected_layout() {
        let temp = tempfile::tempdir().expect("tempdir");
        let home = CouncilHome::new(temp.path());

        home.init(false, epoch()).expect("init");

        assert!(home.state_dir.is_dir());
        assert!(home.config_path.is_file());
        assert!(home.council_path.is_file());
        assert!(home.ledger_path.is_file());
        assert!(home.schema_path.is_file());

        let council = home.load_council().expect("load council");
        assert_eq!(council.ceremony.phase, Phase::Idle);
        assert!(home.load_ledger().records().is_empty());
    }

    #[test]
    fn init_without_force_refuses_existing_home() {
        let temp = tempfile::tempdir().expect("tempdir");
        let home = CouncilHome::new(temp.path());

        home.init(false, epoch()).expect("init");
        let err = home.init(false, epoch()).unwrap_err();
        assert!(err.to_string().contains("already exists"));
    }

    #[test]
    fn load_without_init_points_at_init() {
        let temp = tempfile::tempdir().expect("tempdir");
        let home = CouncilHome::new(temp.path());

        let err = home.load_council().unwrap_err();
        assert!(err.to_string().contains("council init"));
    }
}
