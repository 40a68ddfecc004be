//! Project identity and per-project configuration record.

use super::rule::RuleSet;
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

pub const DEFAULT_RULESET_FILE: &str = ".ruleset";

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
/// Stable project identifier: the project root directory.
pub struct ProjectId(PathBuf);

impl ProjectId {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self(root.into())
    }

    pub fn root(&self) -> &Path {
        &self.0
    }

    /// Last path component, used in log lines.
    pub fn name(&self) -> String {
        self.0
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| self.0.to_string_lossy().to_string())
    }
}

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
/// Configuration record for one project.
///
/// `rule_set_stored_in_project` selects the mode: `true` derives the rule-set
/// from the files in `rule_set_file`, `false` keeps it synchronized with the
/// global rule-set. `need_rebuild` is sticky and only cleared by a successful
/// merge from files.
pub struct ProjectProperties {
    project: ProjectId,
    pmd_enabled: bool,
    rule_set_stored_in_project: bool,
    rule_set_file: String,
    project_rule_set: RuleSet,
    include_derived_files: bool,
    violations_as_errors: bool,
    full_build_enabled: bool,
    need_rebuild: bool,
    working_set_name: Option<String>,
}

impl ProjectProperties {
    pub fn new(project: ProjectId) -> Self {
        Self {
            project,
            pmd_enabled: false,
            rule_set_stored_in_project: false,
            rule_set_file: DEFAULT_RULESET_FILE.to_string(),
            project_rule_set: RuleSet::default(),
            include_derived_files: false,
            violations_as_errors: true,
            full_build_enabled: true,
            need_rebuild: false,
            working_set_name: None,
        }
    }

    pub fn project(&self) -> &ProjectId {
        &self.project
    }

    pub fn is_pmd_enabled(&self) -> bool {
        self.pmd_enabled
    }

    pub fn set_pmd_enabled(&mut self, enabled: bool) {
        self.pmd_enabled = enabled;
    }

    pub fn is_rule_set_stored_in_project(&self) -> bool {
        self.rule_set_stored_in_project
    }

    pub fn set_rule_set_stored_in_project(&mut self, stored: bool) {
        if self.rule_set_stored_in_project != stored {
            self.rule_set_stored_in_project = stored;
            self.need_rebuild = true;
        }
    }

    pub fn rule_set_file(&self) -> &str {
        &self.rule_set_file
    }

    pub fn set_rule_set_file(&mut self, file: impl Into<String>) {
        let file = file.into();
        if self.rule_set_file != file {
            self.rule_set_file = file;
            self.need_rebuild = true;
        }
    }

    pub fn project_rule_set(&self) -> &RuleSet {
        &self.project_rule_set
    }

    /// Replace the rule-set. A membership change marks the project for rebuild.
    pub fn set_project_rule_set(&mut self, rule_set: RuleSet) {
        if !self.project_rule_set.same_rules(&rule_set) {
            self.need_rebuild = true;
        }
        self.project_rule_set = rule_set;
    }

    pub fn is_include_derived_files(&self) -> bool {
        self.include_derived_files
    }

    pub fn set_include_derived_files(&mut self, include: bool) {
        if self.include_derived_files != include {
            self.include_derived_files = include;
            self.need_rebuild = true;
        }
    }

    pub fn violations_as_errors(&self) -> bool {
        self.violations_as_errors
    }

    pub fn set_violations_as_errors(&mut self, as_errors: bool) {
        self.violations_as_errors = as_errors;
    }

    pub fn is_full_build_enabled(&self) -> bool {
        self.full_build_enabled
    }

    pub fn set_full_build_enabled(&mut self, enabled: bool) {
        self.full_build_enabled = enabled;
    }

    pub fn is_need_rebuild(&self) -> bool {
        self.need_rebuild
    }

    pub fn set_need_rebuild(&mut self, need: bool) {
        self.need_rebuild = need;
    }

    pub fn working_set_name(&self) -> Option<&str> {
        self.working_set_name.as_deref()
    }

    pub fn set_working_set_name(&mut self, name: Option<String>) {
        self.working_set_name = name;
    }
}
