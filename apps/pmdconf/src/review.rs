//! Review command: run an external analyzer over resources in the background.
//!
//! A `ReviewCommand` collects its inputs, validates them synchronously in
//! `perform_execute`, then hands the work to a `ReviewTask`. Markers are only
//! available through `ReviewTask::join`. Input precedence when validating:
//! a missing resource *and* resource delta is rejected first, before any
//! required-input check.

use crate::error::CommandError;
use crate::models::{ProjectProperties, RuleSet};
use glob::{glob_with, MatchOptions, Pattern};
use rayon::prelude::*;
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use tracing::{debug, info, warn};

/// Markers per reviewed file. Reviewed files without violations map to an empty set.
pub type Markers = HashMap<PathBuf, BTreeSet<MarkerInfo>>;

#[derive(Debug, Clone, Default)]
/// Files touched since the last review. Removed files are reported with an
/// empty marker set.
pub struct ResourceDelta {
    pub changed: Vec<PathBuf>,
    pub removed: Vec<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// A violation reported by an analyzer.
pub struct Violation {
    pub rule: String,
    pub line: usize,
    pub message: String,
}

/// The analysis engine. Implemented by the host.
pub trait Analyzer: Send + Sync {
    fn analyze(&self, file: &Path, rules: &RuleSet) -> Vec<Violation>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum MarkerKind {
    #[serde(rename = "violation-error")]
    Error,
    #[serde(rename = "violation-warning")]
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
/// Marker attached to a file location for one violation.
pub struct MarkerInfo {
    pub line: usize,
    pub rule: String,
    pub kind: MarkerKind,
    pub priority: u8,
    pub message: String,
}

#[derive(Default)]
pub struct ReviewCommand {
    resources: Vec<PathBuf>,
    delta: Option<ResourceDelta>,
    rule_set: Option<RuleSet>,
    analyzer: Option<Arc<dyn Analyzer>>,
    violations_as_errors: bool,
    base_dir: Option<PathBuf>,
}

impl ReviewCommand {
    pub fn new() -> Self {
        Self {
            violations_as_errors: true,
            ..Default::default()
        }
    }

    /// Use the rule-set and severity settings of a project. Include/exclude
    /// patterns are matched relative to the project root.
    pub fn for_project(props: &ProjectProperties) -> Self {
        let mut cmd = Self::new();
        cmd.set_rule_set(props.project_rule_set().clone());
        cmd.violations_as_errors = props.violations_as_errors();
        cmd.base_dir = Some(props.project().root().to_path_buf());
        cmd
    }

    /// `None` is accepted and ignored.
    pub fn add_resource(&mut self, resource: Option<PathBuf>) {
        if let Some(r) = resource {
            self.resources.push(r);
        }
    }

    pub fn set_resource_delta(&mut self, delta: Option<ResourceDelta>) {
        self.delta = delta;
    }

    pub fn set_rule_set(&mut self, rule_set: RuleSet) {
        self.rule_set = Some(rule_set);
    }

    pub fn set_analyzer(&mut self, analyzer: Arc<dyn Analyzer>) {
        self.analyzer = Some(analyzer);
    }

    pub fn set_violations_as_errors(&mut self, as_errors: bool) {
        self.violations_as_errors = as_errors;
    }

    /// Validate inputs and start the review in the background.
    pub fn perform_execute(self) -> Result<ReviewTask, CommandError> {
        if self.resources.is_empty() && self.delta.is_none() {
            return Err(CommandError::Validation(
                "a resource or a resource delta must be set".into(),
            ));
        }
        let rule_set = self.rule_set.ok_or(CommandError::UnsetInput("rule set"))?;
        let analyzer = self.analyzer.ok_or(CommandError::UnsetInput("analyzer"))?;

        let cancel = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&cancel);
        let resources = self.resources;
        let delta = self.delta;
        let base_dir = self.base_dir;
        let kind = if self.violations_as_errors {
            MarkerKind::Error
        } else {
            MarkerKind::Warning
        };
        let handle = std::thread::spawn(move || {
            let files = collect_files(&resources, delta.as_ref(), &rule_set, base_dir.as_deref());
            info!("Reviewing {} files", files.len());
            let mut markers: Markers = files
                .par_iter()
                .filter(|_| !flag.load(Ordering::Relaxed))
                .map(|file| {
                    let set = analyzer
                        .analyze(file, &rule_set)
                        .into_iter()
                        .map(|v| MarkerInfo {
                            priority: rule_set
                                .rule_by_name(&v.rule)
                                .map(|r| r.priority)
                                .unwrap_or(3),
                            line: v.line,
                            rule: v.rule,
                            kind,
                            message: v.message,
                        })
                        .collect();
                    (file.clone(), set)
                })
                .collect();
            if flag.load(Ordering::Relaxed) {
                return Err(CommandError::Cancelled);
            }
            // removed files keep an empty set so their old markers get cleared
            if let Some(d) = delta.as_ref() {
                for removed in &d.removed {
                    markers.entry(removed.clone()).or_default();
                }
            }
            Ok(markers)
        });
        Ok(ReviewTask {
            handle,
            cancel,
        })
    }
}

/// Running review. `join` blocks until the markers are available.
pub struct ReviewTask {
    handle: JoinHandle<Result<Markers, CommandError>>,
    cancel: Arc<AtomicBool>,
}

impl ReviewTask {
    /// Request cancellation; `join` then reports `CommandError::Cancelled`
    /// unless the review already completed.
    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::Relaxed);
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    pub fn join(self) -> Result<Markers, CommandError> {
        self.handle
            .join()
            .map_err(|_| CommandError::Failed("review thread panicked".into()))?
    }
}

/// Files to review, each paired with the directory its patterns are relative to.
fn collect_files(
    resources: &[PathBuf],
    delta: Option<&ResourceDelta>,
    rule_set: &RuleSet,
    base: Option<&Path>,
) -> Vec<PathBuf> {
    let mut found: Vec<(PathBuf, PathBuf)> = Vec::new();
    for r in resources {
        if r.is_dir() {
            let anchor = base.unwrap_or(r.as_path()).to_path_buf();
            found.extend(glob_files(r).into_iter().map(|f| (f, anchor.clone())));
        } else if r.is_file() {
            found.push((r.clone(), anchor_of(r, base)));
        }
    }
    if let Some(d) = delta {
        found.extend(
            d.changed
                .iter()
                .filter(|p| p.is_file())
                .map(|p| (p.clone(), anchor_of(p, base))),
        );
    }
    found.sort();
    found.dedup_by(|a, b| a.0 == b.0);
    found
        .into_iter()
        .filter(|(file, anchor)| {
            let keep = rule_set.applies_to(relative_to(file, anchor));
            if !keep {
                debug!("Excluded from review: {}", file.display());
            }
            keep
        })
        .map(|(file, _)| file)
        .collect()
}

fn anchor_of(file: &Path, base: Option<&Path>) -> PathBuf {
    base.or_else(|| file.parent())
        .map(Path::to_path_buf)
        .unwrap_or_default()
}

fn relative_to<'a>(file: &'a Path, anchor: &Path) -> &'a Path {
    file.strip_prefix(anchor).unwrap_or(file)
}

/// Regular files under `root`, skipping hidden files and directories.
fn glob_files(root: &Path) -> Vec<PathBuf> {
    let pattern = format!("{}/**/*", Pattern::escape(&root.to_string_lossy()));
    let options = MatchOptions {
        require_literal_leading_dot: true,
        ..MatchOptions::new()
    };
    match glob_with(&pattern, options) {
        Ok(paths) => paths.flatten().filter(|p| p.is_file()).collect(),
        Err(e) => {
            warn!("Cannot list files under {}: {}", root.display(), e);
            Vec::new()
        }
    }
}
