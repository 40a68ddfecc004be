//! Configuration discovery and effective settings resolution.
//!
//! pmdconf reads `pmdconf.toml|yaml|yml` from the workspace root (or closest
//! ancestor) and merges it with CLI flags to produce an `Effective` config.
//! Defaults:
//! - `output`: `human`
//! - `log`: `info`
//! - `propertiesFile`: `.pmd`
//! - `capabilityFile`: `.pmd-enabled`
//! - `[global]`: no rule-set files, no patterns
//!
//! Overrides precedence: CLI > config file > defaults.

use crate::catalog::FsCatalogLoader;
use crate::global::CatalogRuleSet;
use crate::storage::{CAPABILITY_FILE, PROPERTIES_FILE};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub const CONFIG_NAMES: [&str; 3] = ["pmdconf.toml", "pmdconf.yaml", "pmdconf.yml"];

#[derive(Debug, Default, Deserialize, Clone)]
/// Global rule-set section under `[global]`.
pub struct GlobalCfg {
    #[serde(default)]
    pub rulesets: Vec<String>,
    #[serde(default)]
    pub include: Vec<String>,
    #[serde(default)]
    pub exclude: Vec<String>,
}

#[derive(Debug, Default, Deserialize, Clone)]
/// Root configuration loaded from `pmdconf.toml|yaml`.
pub struct ToolConfig {
    pub output: Option<String>,
    pub log: Option<String>,
    #[serde(rename = "propertiesFile")]
    pub properties_file: Option<String>,
    #[serde(rename = "capabilityFile")]
    pub capability_file: Option<String>,
    #[serde(default)]
    pub global: Option<GlobalCfg>,
}

#[derive(Debug, Clone)]
/// Fully-resolved configuration used by commands after applying precedence.
pub struct Effective {
    pub root: PathBuf,
    pub config_found: bool,
    pub output: String,
    pub log: String,
    pub properties_file: String,
    pub capability_file: String,
    pub global_rulesets: Vec<PathBuf>,
    pub global_include: Vec<String>,
    pub global_exclude: Vec<String>,
}

impl Effective {
    /// Global rule-set provider described by the `[global]` section.
    pub fn global_rule_set(&self) -> CatalogRuleSet {
        CatalogRuleSet::new(Arc::new(FsCatalogLoader), self.global_rulesets.clone())
            .with_patterns(self.global_include.clone(), self.global_exclude.clone())
    }
}

/// Walk upward from `start` to detect the workspace root.
///
/// Stops when a `pmdconf.toml|yaml|yml` or a `.git` directory is found.
pub fn detect_root(start: &Path) -> PathBuf {
    let mut cur = start;
    loop {
        if CONFIG_NAMES.iter().any(|n| cur.join(n).exists()) {
            return cur.to_path_buf();
        }
        if cur.join(".git").exists() {
            return cur.to_path_buf();
        }
        match cur.parent() {
            Some(p) => cur = p,
            None => return start.to_path_buf(),
        }
    }
}

/// Load `ToolConfig` from `pmdconf.toml` or `pmdconf.yaml|yml` if present.
pub fn load_config(root: &Path) -> Option<ToolConfig> {
    let toml_path = root.join("pmdconf.toml");
    if toml_path.exists() {
        let s = fs::read_to_string(&toml_path).ok()?;
        let cfg: ToolConfig = toml::from_str(&s).ok()?;
        return Some(cfg);
    }
    for yml in ["pmdconf.yaml", "pmdconf.yml"] {
        let p = root.join(yml);
        if p.exists() {
            let s = fs::read_to_string(&p).ok()?;
            let cfg: ToolConfig = serde_yaml::from_str(&s).ok()?;
            return Some(cfg);
        }
    }
    None
}

/// Resolve `Effective` by merging CLI flags, discovered config, and defaults.
pub fn resolve_effective(
    cli_root: Option<&str>,
    cli_output: Option<&str>,
    cli_log: Option<&str>,
) -> Effective {
    let start = PathBuf::from(cli_root.unwrap_or("."));
    let root = detect_root(&start);
    let loaded = load_config(&root);
    let config_found = loaded.is_some();
    let cfg = loaded.unwrap_or_default();

    let output = cli_output
        .map(|s| s.to_string())
        .or(cfg.output)
        .unwrap_or_else(|| "human".to_string());
    let log = cli_log
        .map(|s| s.to_string())
        .or(cfg.log)
        .unwrap_or_else(|| "info".to_string());
    let properties_file = cfg
        .properties_file
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| PROPERTIES_FILE.to_string());
    let capability_file = cfg
        .capability_file
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| CAPABILITY_FILE.to_string());

    let global = cfg.global.unwrap_or_default();
    let global_rulesets = global
        .rulesets
        .iter()
        .map(|p| {
            let p = PathBuf::from(p);
            if p.is_absolute() {
                p
            } else {
                root.join(p)
            }
        })
        .collect();

    Effective {
        root,
        config_found,
        output,
        log,
        properties_file,
        capability_file,
        global_rulesets,
        global_include: global.include,
        global_exclude: global.exclude,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::global::GlobalRuleSet;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn test_detect_and_load_toml() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        let mut f = fs::File::create(root.join("pmdconf.toml")).unwrap();
        writeln!(
            f,
            "{}",
            r#"
output = "json"
propertiesFile = ".pmdrc"
[global]
rulesets = ["rules/basic.toml"]
exclude = ["**/generated/**"]
    "#
        )
        .unwrap();

        // Resolve using explicit root to avoid global CWD races
        let eff = resolve_effective(root.to_str(), None, None);
        assert!(eff.config_found);
        assert_eq!(eff.output, "json");
        assert_eq!(eff.properties_file, ".pmdrc");
        assert_eq!(eff.capability_file, CAPABILITY_FILE);
        assert_eq!(eff.global_rulesets, vec![root.join("rules/basic.toml")]);
        assert_eq!(eff.global_exclude, vec!["**/generated/**".to_string()]);
    }

    #[test]
    fn test_load_yaml_and_defaults() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        let mut f = fs::File::create(root.join("pmdconf.yaml")).unwrap();
        writeln!(
            f,
            "{}",
            r#"
log: debug
global:
  include:
    - "src/**"
            "#
        )
        .unwrap();

        let eff = resolve_effective(root.to_str(), None, None);
        assert_eq!(eff.log, "debug");
        assert_eq!(eff.output, "human");
        assert_eq!(eff.properties_file, PROPERTIES_FILE);
        assert!(eff.global_rulesets.is_empty());
        assert_eq!(eff.global_include, vec!["src/**".to_string()]);
    }

    #[test]
    fn test_cli_precedence() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fs::write(root.join("pmdconf.toml"), "output = \"json\"\nlog = \"warn\"\n").unwrap();
        let eff = resolve_effective(root.to_str(), Some("human"), Some("trace"));
        assert_eq!(eff.output, "human");
        assert_eq!(eff.log, "trace");
    }

    #[test]
    fn test_detect_root_walks_up_to_config() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fs::write(root.join("pmdconf.toml"), "").unwrap();
        let nested = root.join("a/b");
        fs::create_dir_all(&nested).unwrap();
        assert_eq!(detect_root(&nested), root.to_path_buf());
        let eff = resolve_effective(nested.to_str(), None, None);
        assert!(eff.config_found);
    }

    #[test]
    fn test_global_rule_set_from_config() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("rules")).unwrap();
        fs::write(
            root.join("rules/basic.toml"),
            "name = \"basic\"\n[[rule]]\nname = \"A\"\n",
        )
        .unwrap();
        fs::write(
            root.join("pmdconf.toml"),
            "[global]\nrulesets = [\"rules/basic.toml\"]\nexclude = [\"**/gen/**\"]\n",
        )
        .unwrap();
        let eff = resolve_effective(root.to_str(), None, None);
        let rs = eff.global_rule_set().rule_set();
        assert_eq!(rs.membership(), vec![("A", "basic")]);
        assert_eq!(rs.exclude_patterns, vec!["**/gen/**".to_string()]);
    }
}
