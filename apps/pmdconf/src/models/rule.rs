//! Rule and rule-set schema.
//!
//! Key components:
//! - `Rule`: one named rule as defined by a catalog. Identity is the pair
//!   `(name, ruleset_name)`; the remaining fields are metadata.
//! - `RuleSet`: the effective rule-set of a project: ordered rules unique by
//!   name, plus include/exclude path patterns.
//! - `RuleSpec`: the persisted `(name, ruleset)` reference to a rule.

use glob::Pattern;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

pub const DEFAULT_RULESET_NAME: &str = "pmd-project";
pub const DEFAULT_RULESET_DESCRIPTION: &str = "Rules selected for this project";

fn default_priority() -> u8 {
    3
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// A single rule definition.
pub struct Rule {
    pub name: String,
    /// Name of the catalog the rule was defined in.
    #[serde(rename = "ruleset")]
    pub ruleset_name: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub description: String,
    /// 1 (highest) ..= 5 (lowest)
    #[serde(default = "default_priority")]
    pub priority: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, String>,
}

impl Rule {
    /// Rule with identity only and default metadata.
    pub fn new(name: impl Into<String>, ruleset_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ruleset_name: ruleset_name.into(),
            message: String::new(),
            description: String::new(),
            priority: default_priority(),
            language: None,
            properties: BTreeMap::new(),
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn with_priority(mut self, priority: u8) -> Self {
        self.priority = priority;
        self
    }

    pub fn spec(&self) -> RuleSpec {
        RuleSpec {
            name: self.name.clone(),
            ruleset: self.ruleset_name.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Persisted reference to a rule.
pub struct RuleSpec {
    pub name: String,
    #[serde(default)]
    pub ruleset: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
/// Effective rule-set applied to a project.
pub struct RuleSet {
    pub name: String,
    pub description: String,
    pub rules: Vec<Rule>,
    pub include_patterns: Vec<String>,
    pub exclude_patterns: Vec<String>,
}

impl Default for RuleSet {
    fn default() -> Self {
        Self::empty(DEFAULT_RULESET_NAME, DEFAULT_RULESET_DESCRIPTION)
    }
}

impl RuleSet {
    pub fn empty(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            rules: Vec::new(),
            include_patterns: Vec::new(),
            exclude_patterns: Vec::new(),
        }
    }

    /// Build a rule-set from persisted specs, binding each spec to the rule of
    /// the same name in `reference`. Specs with no counterpart are dropped.
    /// Patterns are taken from `reference`.
    pub fn from_specs(specs: &[RuleSpec], reference: &RuleSet) -> Self {
        let mut set = Self::default();
        for spec in specs {
            match reference.rule_by_name(&spec.name) {
                Some(rule) => {
                    if set.rule_by_name(&rule.name).is_none() {
                        set.rules.push(rule.clone());
                    }
                }
                None => debug!("The rule {} cannot be found. ignore.", spec.name),
            }
        }
        set.include_patterns = reference.include_patterns.clone();
        set.exclude_patterns = reference.exclude_patterns.clone();
        set
    }

    pub fn rule_by_name(&self, name: &str) -> Option<&Rule> {
        self.rules.iter().find(|r| r.name == name)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Ordered `(name, ruleset_name)` identity of every member rule.
    pub fn membership(&self) -> Vec<(&str, &str)> {
        self.rules
            .iter()
            .map(|r| (r.name.as_str(), r.ruleset_name.as_str()))
            .collect()
    }

    /// Structural equality of the member rules (names and source catalogs).
    pub fn same_rules(&self, other: &RuleSet) -> bool {
        self.membership() == other.membership()
    }

    pub fn same_patterns(&self, other: &RuleSet) -> bool {
        self.include_patterns == other.include_patterns
            && self.exclude_patterns == other.exclude_patterns
    }

    pub fn specs(&self) -> Vec<RuleSpec> {
        self.rules.iter().map(Rule::spec).collect()
    }

    /// Whether `path` passes the include/exclude patterns. Exclusion wins;
    /// an empty include list includes everything. Invalid patterns never match.
    pub fn applies_to(&self, path: &Path) -> bool {
        let matches = |pat: &String| {
            Pattern::new(pat)
                .map(|p| p.matches_path(path))
                .unwrap_or(false)
        };
        if self.exclude_patterns.iter().any(matches) {
            return false;
        }
        self.include_patterns.is_empty() || self.include_patterns.iter().any(matches)
    }
}
