//! Resolution of the `rule_set_file` reference into filesystem paths.
//!
//! The reference is a list separated by `;` or `,`. Entries may use
//! `${project_loc}` for the project root and `${env_var:NAME}` for an
//! environment variable; relative entries resolve against the project root.

use crate::models::ProjectId;
use regex::Regex;
use std::path::PathBuf;
use std::sync::OnceLock;
use tracing::debug;

pub trait RuleSetFileResolver: Send + Sync {
    fn resolve(&self, project: &ProjectId, rule_set_file: &str) -> Vec<PathBuf>;
}

#[derive(Debug, Default, Clone, Copy)]
/// Default resolver for path-list references.
pub struct PathListResolver;

fn variable_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\$\{(project_loc|env_var:([A-Za-z_][A-Za-z0-9_]*))\}")
            .expect("valid variable pattern")
    })
}

/// Expand `${project_loc}` and `${env_var:NAME}`. Unknown variables expand to
/// an empty string.
pub fn expand_variables(project: &ProjectId, entry: &str) -> String {
    variable_re()
        .replace_all(entry, |caps: &regex::Captures| match caps.get(2) {
            Some(var) => std::env::var(var.as_str()).unwrap_or_default(),
            None => project.root().to_string_lossy().to_string(),
        })
        .to_string()
}

impl RuleSetFileResolver for PathListResolver {
    fn resolve(&self, project: &ProjectId, rule_set_file: &str) -> Vec<PathBuf> {
        rule_set_file
            .split(|c| c == ';' || c == ',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|entry| {
                let expanded = PathBuf::from(expand_variables(project, entry));
                let path = if expanded.is_absolute() {
                    expanded
                } else {
                    project.root().join(expanded)
                };
                debug!("Resolved rule set reference {} to {}", entry, path.display());
                path
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_splits_and_resolves_relative_entries() {
        let project = ProjectId::new("/ws/demo");
        let paths = PathListResolver.resolve(&project, " rules/a.toml ; rules/b.yaml,,");
        assert_eq!(
            paths,
            vec![
                PathBuf::from("/ws/demo/rules/a.toml"),
                PathBuf::from("/ws/demo/rules/b.yaml")
            ]
        );
        assert!(PathListResolver.resolve(&project, "  ").is_empty());
    }

    #[test]
    fn test_expands_project_loc_and_keeps_absolute() {
        let project = ProjectId::new("/ws/demo");
        let paths =
            PathListResolver.resolve(&project, "${project_loc}/.ruleset;/etc/pmd/global.toml");
        assert_eq!(
            paths,
            vec![
                PathBuf::from("/ws/demo/.ruleset"),
                PathBuf::from("/etc/pmd/global.toml")
            ]
        );
    }

    #[test]
    fn test_unknown_env_var_expands_empty() {
        let project = ProjectId::new("/ws/demo");
        let s = expand_variables(&project, "${env_var:PMDCONF_SURELY_UNSET_VAR}x.toml");
        assert_eq!(s, "x.toml");
    }
}
