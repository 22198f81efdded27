//! Diligence ledger storage (`.council/state/ledger.json`).
//!
//! The ledger is append-only in memory; on disk each append rewrites the
//! whole document atomically. A missing or unreadable file degrades to an
//! empty ledger rather than blocking completions.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::core::ledger::{AgentTotals, DiligenceLedger, LedgerEntry};
use crate::core::types::AgentKind;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LedgerDocument {
    records: Vec<LedgerEntry>,
    totals: BTreeMap<AgentKind, AgentTotals>,
    last_updated: DateTime<Utc>,
}

/// Load the ledger from disk.
///
/// Missing or corrupt files yield an empty ledger; corruption is logged, not
/// fatal. Divergent totals are logged too but the loaded data is kept, so the
/// caller can still inspect and report it.
pub fn load_ledger(path: &Path) -> DiligenceLedger {
    if !path.exists() {
        return DiligenceLedger::new();
    }
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(err) => {
            error!(path = %path.display(), %err, "unreadable ledger, starting empty");
            return DiligenceLedger::new();
        }
    };
    let document: LedgerDocument = match serde_json::from_str(&contents) {
        Ok(document) => document,
        Err(err) => {
            error!(path = %path.display(), %err, "corrupt ledger, starting empty");
            return DiligenceLedger::new();
        }
    };

    let ledger = DiligenceLedger::from_parts(document.records, document.totals);
    for violation in ledger.verify_totals() {
        error!(path = %path.display(), %violation, "ledger totals diverge from entries");
    }
    debug!(records = ledger.records().len(), "ledger loaded");
    ledger
}

/// Atomically write the full ledger document (temp file + rename).
pub fn write_ledger(path: &Path, ledger: &DiligenceLedger, now: DateTime<Utc>) -> Result<()> {
    let document = LedgerDocument {
        records: ledger.records().to_vec(),
        totals: ledger.totals().clone(),
        last_updated: now,
    };
    let mut buf = serde_json::to_string_pretty(&document)?;
    buf.push('\n');
    write_atomic(path, &buf)
}

fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let parent = path
        .parent()
        .with_context(|| format!("ledger path missing parent {}", path.display()))?;
    fs::create_dir_all(parent).with_context(|| format!("create directory {}", parent.display()))?;
    let tmp_path = path.with_extension("json.tmp");
    fs::write(&tmp_path, contents)
        .with_context(|| format!("write temp ledger {}", tmp_path.display()))?;
    fs::rename(&tmp_path, path).with_context(|| format!("replace ledger {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ledger::{CompletionFlags, LedgerConfig};
    use crate::core::types::{Task, TaskPriority, TaskStatus};
    use crate::test_support::epoch;

    fn sample_task() -> Task {
        Task {
            id: "council-veda-0001".to_string(),
            title: "build backend API".to_string(),
            description: "build backend API".to_string(),
            resource: "terracare-bridge".to_string(),
            priority: TaskPriority::High,
            estimated_hours: 8.0,
            dependencies: Vec::new(),
            status: TaskStatus::Completed,
            assigned_agent: Some(AgentKind::Veda),
            assigned_at: Some(epoch()),
            started_at: Some(epoch()),
            completed_at: Some(epoch()),
            nectar_accrued: 0.0,
            quality_score: 1.0,
        }
    }

    #[test]
    fn missing_file_loads_empty() {
        let temp = tempfile::tempdir().expect("tempdir");
        let ledger = load_ledger(&temp.path().join("missing.json"));
        assert!(ledger.records().is_empty());
    }

    #[test]
    fn write_then_load_round_trips() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("ledger.json");

        let mut ledger = DiligenceLedger::new();
        ledger.record_completion(
            AgentKind::Veda,
            &sample_task(),
            4.0,
            1.0,
            CompletionFlags::default(),
            &LedgerConfig::default(),
            epoch(),
        );
        write_ledger(&path, &ledger, epoch()).expect("write");

        let loaded = load_ledger(&path);
        assert_eq!(loaded.records(), ledger.records());
        assert_eq!(loaded.totals(), ledger.totals());
    }

    /// A corrupt ledger file degrades to empty instead of failing the
    /// completion that triggered the load.
    #[test]
    fn corrupt_file_degrades_to_empty() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("ledger.json");
        fs::write(&path, "{not json").expect("write");

        let ledger = load_ledger(&path);
        assert!(ledger.records().is_empty());
    }
}
