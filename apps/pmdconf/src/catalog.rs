//! Rule catalogs: the rules defined by one rule-set file.
//!
//! A catalog file is TOML (or YAML for `.yaml|.yml`):
//!
//! ```toml
//! name = "basic"
//! description = "Basic rules"
//! include = ["src/**"]
//! exclude = ["**/generated/**"]
//!
//! [[rule]]
//! name = "EmptyCatchBlock"
//! message = "Avoid empty catch blocks"
//! priority = 3
//! language = "java"
//! [rule.properties]
//! allowCommentedBlocks = "false"
//! ```
//!
//! Every loaded rule records the catalog name as its `ruleset_name`. When the
//! file has no `name`, the file stem is used. `include`/`exclude` are path
//! patterns relative to the project root.

use crate::error::CatalogError;
use crate::models::{Rule, RuleSet};
use serde::Deserialize;
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::Path;

#[derive(Deserialize)]
struct CatalogDoc {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    description: String,
    #[serde(default)]
    include: Vec<String>,
    #[serde(default)]
    exclude: Vec<String>,
    #[serde(default, rename = "rule")]
    rules: Vec<RuleDoc>,
}

#[derive(Deserialize)]
struct RuleDoc {
    name: String,
    #[serde(default)]
    message: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    priority: Option<u8>,
    #[serde(default)]
    language: Option<String>,
    #[serde(default)]
    properties: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq)]
/// Rules parsed from one rule-set file, in file order.
pub struct RuleCatalog {
    pub name: String,
    pub description: String,
    pub rules: Vec<Rule>,
    pub include_patterns: Vec<String>,
    pub exclude_patterns: Vec<String>,
}

impl RuleCatalog {
    pub fn rule_by_name(&self, name: &str) -> Option<&Rule> {
        self.rules.iter().find(|r| r.name == name)
    }

    /// Rule-set seeded with every rule and pattern of this catalog.
    pub fn to_rule_set(&self) -> RuleSet {
        let mut rs = RuleSet::empty(self.name.clone(), self.description.clone());
        rs.rules = self.rules.clone();
        rs.include_patterns = self.include_patterns.clone();
        rs.exclude_patterns = self.exclude_patterns.clone();
        rs
    }
}

/// Source of rule catalogs. The store and the merger only see this trait.
pub trait CatalogLoader: Send + Sync {
    fn load(&self, path: &Path) -> Result<RuleCatalog, CatalogError>;
}

#[derive(Debug, Default, Clone, Copy)]
/// Loads catalogs from the local filesystem.
pub struct FsCatalogLoader;

impl CatalogLoader for FsCatalogLoader {
    fn load(&self, path: &Path) -> Result<RuleCatalog, CatalogError> {
        if !path.is_file() {
            return Err(CatalogError::NotFound {
                path: path.to_path_buf(),
            });
        }
        let content = fs::read_to_string(path).map_err(|e| CatalogError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        parse_catalog(path, &content)
    }
}

/// Parse catalog `content`; `path` picks the syntax and the fallback name.
pub fn parse_catalog(path: &Path, content: &str) -> Result<RuleCatalog, CatalogError> {
    let parse_err = |message: String| CatalogError::Parse {
        path: path.to_path_buf(),
        message,
    };
    let is_yaml = path
        .extension()
        .map(|e| e.eq_ignore_ascii_case("yaml") || e.eq_ignore_ascii_case("yml"))
        .unwrap_or(false);
    let doc: CatalogDoc = if is_yaml {
        serde_yaml::from_str(content).map_err(|e| parse_err(e.to_string()))?
    } else {
        toml::from_str(content).map_err(|e| parse_err(e.to_string()))?
    };

    let name = doc
        .name
        .filter(|n| !n.trim().is_empty())
        .or_else(|| {
            path.file_stem()
                .map(|s| s.to_string_lossy().trim_start_matches('.').to_string())
        })
        .unwrap_or_default();

    let mut seen = HashSet::new();
    let mut rules = Vec::with_capacity(doc.rules.len());
    for rd in doc.rules {
        let rule_name = rd.name.trim().to_string();
        if rule_name.is_empty() {
            return Err(parse_err("rule without a name".into()));
        }
        if !seen.insert(rule_name.clone()) {
            return Err(parse_err(format!("rule '{}' defined twice", rule_name)));
        }
        let mut rule = Rule::new(rule_name, name.clone());
        rule.message = rd.message;
        rule.description = rd.description;
        if let Some(p) = rd.priority {
            rule.priority = p.clamp(1, 5);
        }
        rule.language = rd.language;
        rule.properties = rd.properties;
        rules.push(rule);
    }

    Ok(RuleCatalog {
        name,
        description: doc.description,
        rules,
        include_patterns: non_empty(doc.include),
        exclude_patterns: non_empty(doc.exclude),
    })
}

fn non_empty(patterns: Vec<String>) -> Vec<String> {
    patterns
        .into_iter()
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_load_toml_catalog() {
        let dir = tempdir().unwrap();
        let p = dir.path().join("basic.toml");
        fs::write(
            &p,
            r#"
name = "basic"
description = "Basic rules"

[[rule]]
name = "EmptyCatchBlock"
message = "Avoid empty catch blocks"
priority = 2
[rule.properties]
allowCommentedBlocks = "false"

[[rule]]
name = "UnusedImports"
"#,
        )
        .unwrap();
        let cat = FsCatalogLoader.load(&p).unwrap();
        assert_eq!(cat.name, "basic");
        assert_eq!(cat.rules.len(), 2);
        let r = cat.rule_by_name("EmptyCatchBlock").unwrap();
        assert_eq!(r.ruleset_name, "basic");
        assert_eq!(r.priority, 2);
        assert_eq!(
            r.properties.get("allowCommentedBlocks").map(String::as_str),
            Some("false")
        );
        assert_eq!(cat.rule_by_name("UnusedImports").unwrap().priority, 3);
    }

    #[test]
    fn test_catalog_patterns_carried_to_rule_set() {
        let content = r#"
include = ["src/**", " "]
exclude = ["**/gen/**"]

[[rule]]
name = "A"
"#;
        let cat = parse_catalog(Path::new("rules/basic.toml"), content).unwrap();
        assert_eq!(cat.include_patterns, vec!["src/**".to_string()]);
        assert_eq!(cat.exclude_patterns, vec!["**/gen/**".to_string()]);
        let rs = cat.to_rule_set();
        assert_eq!(rs.name, "basic");
        assert_eq!(rs.include_patterns, vec!["src/**".to_string()]);
        assert_eq!(rs.exclude_patterns, vec!["**/gen/**".to_string()]);
    }

    #[test]
    fn test_load_yaml_catalog_named_after_file() {
        let dir = tempdir().unwrap();
        let p = dir.path().join("design.yaml");
        fs::write(
            &p,
            r#"
exclude:
  - "**/target/**"
rule:
  - name: GodClass
    language: java
"#,
        )
        .unwrap();
        let cat = FsCatalogLoader.load(&p).unwrap();
        assert_eq!(cat.name, "design");
        assert_eq!(cat.rules[0].language.as_deref(), Some("java"));
        assert_eq!(cat.exclude_patterns, vec!["**/target/**".to_string()]);
    }

    #[test]
    fn test_missing_and_malformed() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        assert!(matches!(
            FsCatalogLoader.load(&missing),
            Err(CatalogError::NotFound { .. })
        ));

        let bad = dir.path().join("bad.toml");
        fs::write(&bad, "[[rule]\nname = ").unwrap();
        assert!(matches!(
            FsCatalogLoader.load(&bad),
            Err(CatalogError::Parse { .. })
        ));

        let dup = dir.path().join("dup.toml");
        fs::write(&dup, "[[rule]]\nname = \"A\"\n[[rule]]\nname = \"A\"\n").unwrap();
        assert!(matches!(
            FsCatalogLoader.load(&dup),
            Err(CatalogError::Parse { .. })
        ));
    }
}
