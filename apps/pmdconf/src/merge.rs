//! Merge rule-set files into one effective rule-set.
//!
//! Files are processed left to right. The first catalog that loads seeds the
//! result; every later rule replaces the accumulated rule of the same name in
//! place, or is appended. Include/exclude patterns of every loaded catalog are
//! accumulated in order without repeats. Files that fail to load are skipped.

use crate::catalog::{CatalogLoader, RuleCatalog};
use crate::models::{RuleSet, SkippedFile};
use std::path::PathBuf;
use tracing::{debug, warn};

/// Outcome of merging a list of rule-set files.
pub struct MergeOutcome {
    /// `None` when no file could be loaded.
    pub rule_set: Option<RuleSet>,
    pub skipped: Vec<SkippedFile>,
}

/// Merge already loaded catalogs in order. Returns `None` for an empty list.
pub fn merge_catalogs<'a, I>(catalogs: I) -> Option<RuleSet>
where
    I: IntoIterator<Item = &'a RuleCatalog>,
{
    let mut merged: Option<RuleSet> = None;
    for catalog in catalogs {
        match merged.as_mut() {
            None => merged = Some(catalog.to_rule_set()),
            Some(acc) => {
                for rule in &catalog.rules {
                    match acc.rules.iter_mut().find(|r| r.name == rule.name) {
                        Some(slot) => {
                            debug!(
                                "Rule {} from {} overrides definition from {}",
                                rule.name, rule.ruleset_name, slot.ruleset_name
                            );
                            *slot = rule.clone();
                        }
                        None => acc.rules.push(rule.clone()),
                    }
                }
                extend_unique(&mut acc.include_patterns, &catalog.include_patterns);
                extend_unique(&mut acc.exclude_patterns, &catalog.exclude_patterns);
            }
        }
    }
    merged
}

/// Append the patterns missing from `target`, keeping order.
pub(crate) fn extend_unique(target: &mut Vec<String>, patterns: &[String]) {
    for p in patterns {
        if !target.contains(p) {
            target.push(p.clone());
        }
    }
}

/// Load each file with `loader` and merge the catalogs that load.
pub fn merge_files(loader: &dyn CatalogLoader, files: &[PathBuf]) -> MergeOutcome {
    let mut catalogs = Vec::with_capacity(files.len());
    let mut skipped = Vec::new();
    for file in files {
        match loader.load(file) {
            Ok(cat) => {
                debug!("Loaded rule set {} ({} rules)", cat.name, cat.rules.len());
                catalogs.push(cat);
            }
            Err(e) => {
                warn!("Skipping rule set file {}: {}", file.display(), e);
                skipped.push(SkippedFile {
                    file: file.clone(),
                    reason: e.to_string(),
                });
            }
        }
    }
    MergeOutcome {
        rule_set: merge_catalogs(&catalogs),
        skipped,
    }
}
