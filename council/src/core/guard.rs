//! Sovereign-territory access guard.
//!
//! A fixed set of resource names and glob patterns is absolutely protected:
//! no council operation may clone, read, modify, or otherwise target them.
//! The check runs before any resource name reaches a collaborator.

use std::sync::OnceLock;

use regex::Regex;
use thiserror::Error;

/// Exact resource names that are sovereign territory.
pub const SOVEREIGN_TERRITORY: [&str; 2] = ["sofie-llama-backend", "sofie-backend"];

/// Glob patterns (case-sensitive, `*` wildcard) that are also protected.
pub const PROTECTED_PATTERNS: [&str; 2] = ["sofie-*", "*sofie*"];

/// Hard per-operation stop: the named resource is protected.
///
/// Callers must not continue the offending operation past this error. It
/// aborts that operation only, never the whole process.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("sovereign territory violation: '{resource}' is protected (attempted action: {action})")]
pub struct SovereignAccessViolation {
    pub resource: String,
    pub action: String,
}

/// True if `name` is sovereign territory. An owner-prefixed name
/// (`owner/name`) is reduced to its bare name before matching.
pub fn is_protected(name: &str) -> bool {
    let bare = bare_name(name);
    SOVEREIGN_TERRITORY.contains(&bare)
        || patterns().iter().any(|pattern| pattern.is_match(bare))
}

/// Guard boundary for every resource operation.
pub fn assert_allowed(name: &str, action: &str) -> Result<(), SovereignAccessViolation> {
    if is_protected(name) {
        tracing::error!(resource = name, action, "sovereign territory violation");
        return Err(SovereignAccessViolation {
            resource: name.to_string(),
            action: action.to_string(),
        });
    }
    Ok(())
}

/// Filter a resource list down to the names the council may touch.
pub fn permitted<'a, I>(names: I) -> Vec<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    names
        .into_iter()
        .filter(|name| !is_protected(name))
        .collect()
}

fn bare_name(name: &str) -> &str {
    name.rsplit('/').next().unwrap_or(name)
}

fn patterns() -> &'static [Regex] {
    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        PROTECTED_PATTERNS
            .iter()
            .map(|pattern| {
                Regex::new(&glob_to_regex(pattern)).expect("static protected pattern compiles")
            })
            .collect()
    })
}

/// Translate a `*`-only glob into an anchored regex.
fn glob_to_regex(glob: &str) -> String {
    let literals: Vec<String> = glob.split('*').map(|part| regex::escape(part)).collect();
    format!("^{}$", literals.join(".*"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_sovereign_names_are_protected() {
        assert!(is_protected("sofie-llama-backend"));
        assert!(is_protected("sofie-backend"));
    }

    #[test]
    fn owner_prefix_is_stripped_before_matching() {
        assert!(is_protected("owner/sofie-llama-backend"));
        assert!(is_protected("DudeAdrian/sofie-backend"));
    }

    #[test]
    fn pattern_matches_any_name_containing_sofie() {
        assert!(is_protected("sofie-dashboard"));
        assert!(is_protected("my-sofie-app"));
    }

    #[test]
    fn permitted_resources_pass() {
        assert!(!is_protected("pollen"));
        assert!(!is_protected("terracare-bridge"));
        assert!(!is_protected("sandironratio-node"));
    }

    /// Matching is case-sensitive: only the lowercase names are sovereign.
    #[test]
    fn matching_is_case_sensitive() {
        assert!(!is_protected("Sofie-Backend"));
        assert!(is_protected("sofie-backend-mirror"));
    }

    #[test]
    fn assert_allowed_carries_resource_and_action() {
        let err = assert_allowed("sofie-backend", "clone").expect_err("protected");
        assert_eq!(err.resource, "sofie-backend");
        assert_eq!(err.action, "clone");
        assert!(err.to_string().contains("sofie-backend"));
        assert!(err.to_string().contains("clone"));
    }

    #[test]
    fn assert_allowed_passes_permitted_names() {
        assert_allowed("pollen", "clone").expect("permitted");
    }

    #[test]
    fn permitted_filters_out_sovereign_names() {
        let names = vec!["pollen", "sofie-llama-backend", "hive-api"];
        assert_eq!(permitted(names), vec!["pollen", "hive-api"]);
    }
}
