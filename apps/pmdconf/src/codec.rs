//! Persisted form of `ProjectProperties`.
//!
//! The document is TOML with camelCase keys:
//!
//! ```toml
//! ruleSetStoredInProject = false
//! ruleSetFile = ".ruleset"
//! workingSetName = "core"
//! includeDerivedFiles = false
//! violationsAsErrors = true
//! fullBuildEnabled = true
//! excludePatterns = ["**/generated/**"]
//! includePatterns = []
//!
//! [[rules]]
//! name = "EmptyCatchBlock"
//! ruleset = "basic"
//! ```
//!
//! Rules and patterns are written only when the rule-set is not stored in the
//! project; file-backed rule-sets are re-derived from their files on load.
//! `pmd_enabled` and `need_rebuild` are never persisted.

use crate::error::Result;
use crate::models::{ProjectId, ProjectProperties, Rule, RuleSet, RuleSpec};
use serde::{Deserialize, Serialize};

const HEADER: &str = "# Project analysis settings. Managed by pmdconf.\n";

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PropertiesDoc {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    rule_set_stored_in_project: Option<bool>,
    #[serde(default)]
    rule_set_file: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    working_set_name: Option<String>,
    #[serde(default)]
    include_derived_files: bool,
    #[serde(default = "default_true")]
    violations_as_errors: bool,
    #[serde(default = "default_true")]
    full_build_enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    exclude_patterns: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    include_patterns: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    rules: Option<Vec<RuleSpec>>,
}

fn default_true() -> bool {
    true
}

/// Encode `props` to the persisted document text.
pub fn encode(props: &ProjectProperties) -> Result<String> {
    let mut doc = PropertiesDoc {
        rule_set_stored_in_project: Some(props.is_rule_set_stored_in_project()),
        rule_set_file: Some(props.rule_set_file().to_string()),
        working_set_name: props.working_set_name().map(str::to_string),
        include_derived_files: props.is_include_derived_files(),
        violations_as_errors: props.violations_as_errors(),
        full_build_enabled: props.is_full_build_enabled(),
        ..Default::default()
    };
    if !props.is_rule_set_stored_in_project() {
        let rs = props.project_rule_set();
        doc.exclude_patterns = Some(rs.exclude_patterns.clone());
        doc.include_patterns = Some(rs.include_patterns.clone());
        doc.rules = Some(rs.specs());
    }
    let body = toml::to_string_pretty(&doc)?;
    Ok(format!("{}{}", HEADER, body))
}

/// Decode a persisted document for `project`.
///
/// Returns `Ok(None)` when the document carries no `ruleSetStoredInProject`
/// flag, which callers treat as "no properties found". In synchronized mode
/// the decoded rules carry identity only (see [`decoded_specs`]); the store
/// binds them to the global definitions.
pub fn decode(project: &ProjectId, text: &str) -> Result<Option<ProjectProperties>> {
    let doc: PropertiesDoc = toml::from_str(text)?;
    let stored = match doc.rule_set_stored_in_project {
        Some(s) => s,
        None => return Ok(None),
    };

    let mut props = ProjectProperties::new(project.clone());
    if let Some(file) = doc.rule_set_file {
        props.set_rule_set_file(file);
    }
    props.set_rule_set_stored_in_project(stored);
    props.set_working_set_name(doc.working_set_name.filter(|n| !n.is_empty()));
    props.set_include_derived_files(doc.include_derived_files);
    props.set_violations_as_errors(doc.violations_as_errors);
    props.set_full_build_enabled(doc.full_build_enabled);

    if !stored {
        let mut rs = RuleSet::default();
        rs.rules = doc
            .rules
            .unwrap_or_default()
            .into_iter()
            .map(|spec| Rule::new(spec.name, spec.ruleset))
            .collect();
        rs.exclude_patterns = doc.exclude_patterns.unwrap_or_default();
        rs.include_patterns = doc.include_patterns.unwrap_or_default();
        props.set_project_rule_set(rs);
    }
    Ok(Some(props))
}

/// Persisted rule references of a decoded record.
pub fn decoded_specs(props: &ProjectProperties) -> Vec<RuleSpec> {
    props.project_rule_set().specs()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn project() -> ProjectId {
        ProjectId::new("/ws/demo")
    }

    fn synchronized_props() -> ProjectProperties {
        let mut p = ProjectProperties::new(project());
        p.set_rule_set_file("rules/a.toml;rules/b.toml");
        p.set_working_set_name(Some("core".into()));
        p.set_include_derived_files(true);
        p.set_violations_as_errors(false);
        p.set_full_build_enabled(false);
        let mut rs = RuleSet::default();
        rs.rules.push(Rule::new("EmptyCatchBlock", "basic").with_message("m"));
        rs.rules.push(Rule::new("GodClass", "design"));
        rs.exclude_patterns.push("**/generated/**".into());
        rs.include_patterns.push("src/**".into());
        p.set_project_rule_set(rs);
        p
    }

    #[test]
    fn test_round_trip_synchronized_mode() {
        let p = synchronized_props();
        let text = encode(&p).unwrap();
        assert!(text.starts_with('#'));
        let back = decode(&project(), &text).unwrap().unwrap();
        assert!(!back.is_rule_set_stored_in_project());
        assert_eq!(back.rule_set_file(), "rules/a.toml;rules/b.toml");
        assert_eq!(back.working_set_name(), Some("core"));
        assert!(back.is_include_derived_files());
        assert!(!back.violations_as_errors());
        assert!(!back.is_full_build_enabled());
        assert_eq!(
            back.project_rule_set().membership(),
            p.project_rule_set().membership()
        );
        assert!(back.project_rule_set().same_patterns(p.project_rule_set()));

        // encoding again reproduces the same document
        assert_eq!(encode(&back).unwrap(), text);
    }

    #[test]
    fn test_file_backed_mode_does_not_persist_rules() {
        let mut p = synchronized_props();
        p.set_rule_set_stored_in_project(true);
        let text = encode(&p).unwrap();
        assert!(!text.contains("[[rules]]"));
        assert!(!text.contains("excludePatterns"));
        let back = decode(&project(), &text).unwrap().unwrap();
        assert!(back.is_rule_set_stored_in_project());
        assert!(back.project_rule_set().is_empty());
        assert!(back.is_need_rebuild());
        assert_eq!(back.working_set_name(), Some("core"));
    }

    #[test]
    fn test_missing_flag_means_no_properties() {
        assert!(decode(&project(), "").unwrap().is_none());
        assert!(decode(&project(), "ruleSetFile = \"x\"\n")
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_malformed_document() {
        let err = decode(&project(), "ruleSetStoredInProject = [").unwrap_err();
        assert!(matches!(err, crate::error::PropertiesError::Malformed(_)));
    }

    #[test]
    fn test_decoded_specs() {
        let text = "ruleSetStoredInProject = false\n[[rules]]\nname = \"A\"\nruleset = \"basic\"\n";
        let back = decode(&project(), text).unwrap().unwrap();
        let specs = decoded_specs(&back);
        assert_eq!(specs.len(), 1);
        assert_eq!(specs[0].name, "A");
        assert_eq!(specs[0].ruleset, "basic");
        assert!(back.is_need_rebuild());
    }
}
