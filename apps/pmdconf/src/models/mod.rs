//! Shared data models: rules, rule-sets, and project properties.

pub mod properties;
pub mod rule;

pub use properties::{ProjectId, ProjectProperties};
pub use rule::{Rule, RuleSet, RuleSpec};

use serde::Serialize;
use std::path::PathBuf;

#[derive(Debug, Serialize)]
/// A rule-set file that could not be used during a merge.
pub struct SkippedFile {
    pub file: PathBuf,
    pub reason: String,
}

#[derive(Debug, Serialize)]
/// Result of one reconciliation pass over a project's rule-set.
pub struct SyncReport {
    pub project: ProjectId,
    pub stored_in_project: bool,
    pub rules: usize,
    pub need_rebuild: bool,
}
