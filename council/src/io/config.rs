//! Council configuration stored under `.council/state/config.toml`.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

use crate::core::ceremony::WellnessConfig;
use crate::core::ledger::LedgerConfig;
use crate::core::router::RoutingConfig;

/// Council configuration (TOML).
///
/// This file is intended to be edited by humans and must remain stable and
/// automatable. Missing fields default to the historical constants.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CouncilConfig {
    pub routing: RoutingConfig,
    pub wellness: WellnessConfig,
    pub ledger: LedgerConfig,
}

impl CouncilConfig {
    pub fn validate(&self) -> Result<()> {
        self.routing.validate().map_err(|msg| anyhow!("routing: {msg}"))?;
        self.wellness
            .validate()
            .map_err(|msg| anyhow!("wellness: {msg}"))?;
        self.ledger.validate().map_err(|msg| anyhow!("ledger: {msg}"))?;
        Ok(())
    }
}

/// Load config from a TOML file.
///
/// If the file is missing, returns `CouncilConfig::default()`.
pub fn load_config(path: &Path) -> Result<CouncilConfig> {
    if !path.exists() {
        let cfg = CouncilConfig::default();
        cfg.validate()?;
        return Ok(cfg);
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: CouncilConfig =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate()?;
    Ok(cfg)
}

/// Atomically write config to disk (temp file + rename).
pub fn write_config(path: &Path, cfg: &CouncilConfig) -> Result<()> {
    cfg.validate()?;
    let mut buf = toml::to_string_pretty(cfg).context("serialize config toml")?;
    buf.push('\n');
    write_atomic(path, &buf)
}

fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let parent = path
        .parent()
        .with_context(|| format!("config path missing parent {}", path.display()))?;
    fs::create_dir_all(parent).with_context(|| format!("create directory {}", parent.display()))?;
    let tmp_path = path.with_extension("toml.tmp");
    fs::write(&tmp_path, contents)
        .with_context(|| format!("write temp config {}", tmp_path.display()))?;
    fs::rename(&tmp_path, path).with_context(|| format!("replace config {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_missing_returns_default() {
        let temp = tempfile::tempdir().expect("tempdir");
        let cfg = load_config(&temp.path().join("missing.toml")).expect("load");
        assert_eq!(cfg, CouncilConfig::default());
    }

    #[test]
    fn write_then_load_round_trips() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("config.toml");
        let mut cfg = CouncilConfig::default();
        cfg.wellness.workload_ceiling_hours = 32.0;
        write_config(&path, &cfg).expect("write");
        let loaded = load_config(&path).expect("load");
        assert_eq!(loaded, cfg);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("config.toml");
        fs::write(&path, "[routing]\nconsideration_threshold = 1.5\n").expect("write");
        let err = load_config(&path).unwrap_err();
        assert!(err.to_string().contains("consideration_threshold"));
    }
}
