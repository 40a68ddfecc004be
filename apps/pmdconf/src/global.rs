//! Providers of the global rule-set used by synchronized projects.

use crate::catalog::CatalogLoader;
use crate::merge::{extend_unique, merge_files};
use crate::models::RuleSet;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::warn;

/// Current global rule-set, queried on every synchronization.
pub trait GlobalRuleSet: Send + Sync {
    fn rule_set(&self) -> RuleSet;
}

#[derive(Debug, Clone, Default)]
/// A fixed global rule-set.
pub struct StaticRuleSet(pub RuleSet);

impl GlobalRuleSet for StaticRuleSet {
    fn rule_set(&self) -> RuleSet {
        self.0.clone()
    }
}

/// Global rule-set merged from catalog files each time it is requested.
/// Configured patterns are added after the patterns of the catalogs.
pub struct CatalogRuleSet {
    loader: Arc<dyn CatalogLoader>,
    files: Vec<PathBuf>,
    include_patterns: Vec<String>,
    exclude_patterns: Vec<String>,
}

impl CatalogRuleSet {
    pub fn new(loader: Arc<dyn CatalogLoader>, files: Vec<PathBuf>) -> Self {
        Self {
            loader,
            files,
            include_patterns: Vec::new(),
            exclude_patterns: Vec::new(),
        }
    }

    pub fn with_patterns(mut self, include: Vec<String>, exclude: Vec<String>) -> Self {
        self.include_patterns = include;
        self.exclude_patterns = exclude;
        self
    }
}

impl GlobalRuleSet for CatalogRuleSet {
    fn rule_set(&self) -> RuleSet {
        let outcome = merge_files(self.loader.as_ref(), &self.files);
        let mut rs = match outcome.rule_set {
            Some(rs) => rs,
            None => {
                if !self.files.is_empty() {
                    warn!("No global rule set file could be loaded; using an empty global rule set.");
                }
                RuleSet::empty("global", "")
            }
        };
        extend_unique(&mut rs.include_patterns, &self.include_patterns);
        extend_unique(&mut rs.exclude_patterns, &self.exclude_patterns);
        rs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::FsCatalogLoader;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_catalog_rule_set_reads_files_on_each_call() {
        let dir = tempdir().unwrap();
        let f = dir.path().join("global.toml");
        fs::write(&f, "name = \"basic\"\n[[rule]]\nname = \"A\"\n").unwrap();
        let provider = CatalogRuleSet::new(Arc::new(FsCatalogLoader), vec![f.clone()])
            .with_patterns(vec![], vec!["**/gen/**".into()]);
        let rs = provider.rule_set();
        assert_eq!(rs.membership(), vec![("A", "basic")]);
        assert_eq!(rs.exclude_patterns, vec!["**/gen/**".to_string()]);

        fs::write(&f, "name = \"basic\"\n[[rule]]\nname = \"B\"\n").unwrap();
        assert_eq!(provider.rule_set().membership(), vec![("B", "basic")]);
    }

    #[test]
    fn test_configured_patterns_follow_catalog_patterns() {
        let dir = tempdir().unwrap();
        let f = dir.path().join("global.toml");
        fs::write(
            &f,
            "exclude = [\"**/gen/**\"]\n[[rule]]\nname = \"A\"\n",
        )
        .unwrap();
        let provider = CatalogRuleSet::new(Arc::new(FsCatalogLoader), vec![f])
            .with_patterns(vec!["src/**".into()], vec!["**/gen/**".into(), "**/tmp/**".into()]);
        let rs = provider.rule_set();
        assert_eq!(rs.include_patterns, vec!["src/**".to_string()]);
        assert_eq!(
            rs.exclude_patterns,
            vec!["**/gen/**".to_string(), "**/tmp/**".to_string()]
        );
    }

    #[test]
    fn test_catalog_rule_set_without_files_is_empty() {
        let provider = CatalogRuleSet::new(Arc::new(FsCatalogLoader), Vec::new());
        assert!(provider.rule_set().is_empty());
    }
}
