//! Briefing load helpers with schema validation.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use jsonschema::validator_for;
use serde_json::Value;

use crate::core::types::Briefing;

/// The briefing document schema, embedded at compile time.
pub const BRIEFING_SCHEMA: &str = include_str!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/schemas/briefing/v1.schema.json"
));

/// Load and validate a briefing document (schema, then deserialize).
pub fn load_briefing(path: &Path) -> Result<Briefing> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("read briefing {}", path.display()))?;
    let value: Value = serde_json::from_str(&contents)
        .with_context(|| format!("parse briefing {}", path.display()))?;
    validate_schema(&value)?;
    let briefing: Briefing = serde_json::from_value(value)
        .with_context(|| format!("deserialize briefing {}", path.display()))?;
    Ok(briefing)
}

fn validate_schema(briefing: &Value) -> Result<()> {
    let schema_value: Value =
        serde_json::from_str(BRIEFING_SCHEMA).context("parse embedded briefing schema")?;
    let compiled =
        validator_for(&schema_value).map_err(|err| anyhow!("invalid schema: {}", err))?;
    if !compiled.is_valid(briefing) {
        let messages = compiled
            .iter_errors(briefing)
            .map(|err| err.to_string())
            .collect::<Vec<_>>();
        return Err(anyhow!(
            "briefing schema validation failed: {}",
            messages.join("; ")
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_briefing_loads() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("briefing.json");
        fs::write(
            &path,
            r#"{
  "ecosystem_state": {
    "build_stage": "integration_phase",
    "active_repos": ["pollen", "hive-api"]
  },
  "critical_path": ["build backend API", "design UI component"],
  "protected_notice": "sovereign territory is off limits"
}
"#,
        )
        .expect("write briefing");

        let briefing = load_briefing(&path).expect("load");
        assert_eq!(briefing.critical_path.len(), 2);
        assert_eq!(
            briefing.ecosystem_state.build_stage.as_deref(),
            Some("integration_phase")
        );
    }

    /// The schema requires at least one critical-path item.
    #[test]
    fn empty_critical_path_fails_schema_validation() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("briefing.json");
        fs::write(&path, r#"{"critical_path": []}"#).expect("write briefing");

        let err = load_briefing(&path).unwrap_err();
        assert!(err.to_string().contains("schema validation failed"));
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("briefing.json");
        fs::write(
            &path,
            r#"{"critical_path": ["task"], "surprise": true}"#,
        )
        .expect("write briefing");

        let err = load_briefing(&path).unwrap_err();
        assert!(err.to_string().contains("schema validation failed"));
    }
}
