//! Council state storage for ceremony bookkeeping.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::debug;

use crate::core::ceremony::Council;
use crate::core::invariants::validate_registry;

/// Load council state from disk (`.council/state/council.json`).
pub fn load_council(path: &Path) -> Result<Council> {
    debug!(path = %path.display(), "loading council state");
    let contents = fs::read_to_string(path)
        .with_context(|| format!("read council state {}", path.display()))?;
    let council: Council = serde_json::from_str(&contents)
        .with_context(|| format!("parse council state {}", path.display()))?;
    let errors = validate_registry(&council.registry);
    if !errors.is_empty() {
        anyhow::bail!("council state invariants failed: {}", errors.join("; "));
    }
    debug!(phase = %council.ceremony.phase, "council state loaded");
    Ok(council)
}

/// Atomically write council state to disk (temp file + rename).
pub fn write_council(path: &Path, council: &Council) -> Result<()> {
    debug!(path = %path.display(), phase = %council.ceremony.phase, "writing council state");
    let mut buf = serde_json::to_string_pretty(council)?;
    buf.push('\n');
    write_atomic(path, &buf)
}

fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let parent = path
        .parent()
        .with_context(|| format!("council state path missing parent {}", path.display()))?;
    fs::create_dir_all(parent).with_context(|| format!("create directory {}", parent.display()))?;
    let tmp_path = path.with_extension("json.tmp");
    fs::write(&tmp_path, contents)
        .with_context(|| format!("write temp council state {}", tmp_path.display()))?;
    fs::rename(&tmp_path, path)
        .with_context(|| format!("replace council state {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ceremony::Phase;
    use crate::core::types::AgentKind;
    use crate::test_support::{briefing, epoch};

    /// Verifies write → read preserves the full council, mid-ceremony state
    /// included.
    #[test]
    fn council_state_round_trips() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("council.json");

        let mut council = Council::new(epoch());
        council
            .receive_briefing(briefing(&["build backend API"]), epoch())
            .expect("briefing");

        write_council(&path, &council).expect("write");
        let loaded = load_council(&path).expect("load");
        assert_eq!(loaded, council);
        assert_eq!(loaded.ceremony.phase, Phase::ReceivingBriefing);
    }

    /// Corrupt biometrics on disk fail the invariant check at load.
    #[test]
    fn load_rejects_invariant_violations() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("council.json");

        let mut council = Council::new(epoch());
        council
            .registry
            .agent_mut(AgentKind::Veda)
            .biometrics
            .stress_level = 2.0;
        let mut buf = serde_json::to_string_pretty(&council).expect("serialize");
        buf.push('\n');
        fs::write(&path, buf).expect("write");

        let err = load_council(&path).unwrap_err();
        assert!(err.to_string().contains("invariants failed"));
    }
}
