//! Output rendering for show, set, sync, and merge commands.
//!
//! Supports `human` (default) and `json` outputs.

use crate::models::{ProjectProperties, RuleSet, SkippedFile, SyncReport};
use crate::utils;
use owo_colors::OwoColorize;
use serde_json::json;
use serde_json::Value as JsonVal;
use std::path::Path;

fn use_colors(output: &str) -> bool {
    output != "json" && std::env::var_os("NO_COLOR").is_none()
}

fn print_json(value: &JsonVal) {
    match serde_json::to_string_pretty(value) {
        Ok(s) => println!("{}", s),
        Err(e) => eprintln!("{} {}", utils::error_prefix(), e),
    }
}

/// Print project properties in the requested format.
pub fn print_properties(props: &ProjectProperties, output: &str) {
    match output {
        "json" => print_json(&compose_properties_json(props)),
        _ => {
            let color = use_colors(output);
            let title = format!("Project {}", props.project());
            if color {
                println!("{}", title.bold());
            } else {
                println!("{}", title);
            }
            let mode = if props.is_rule_set_stored_in_project() {
                "file-backed"
            } else {
                "synchronized"
            };
            println!("  analysis enabled:      {}", props.is_pmd_enabled());
            println!("  rule-set mode:         {}", mode);
            println!("  rule-set file:         {}", props.rule_set_file());
            println!(
                "  working set:           {}",
                props.working_set_name().unwrap_or("-")
            );
            println!("  include derived files: {}", props.is_include_derived_files());
            println!("  violations as errors:  {}", props.violations_as_errors());
            println!("  full build enabled:    {}", props.is_full_build_enabled());
            println!("  need rebuild:          {}", props.is_need_rebuild());
            print_rules_human(props.project_rule_set(), color);
        }
    }
}

fn print_rules_human(rs: &RuleSet, color: bool) {
    let header = format!("— Rules — {} ({})", rs.name, rs.len());
    if color {
        println!("{}", header.bold());
    } else {
        println!("{}", header);
    }
    for r in &rs.rules {
        let src = if color {
            r.ruleset_name.bright_black().to_string()
        } else {
            r.ruleset_name.clone()
        };
        println!("  ◆ {} ❲{}❳ p{}", r.name, src, r.priority);
    }
    if !rs.include_patterns.is_empty() {
        println!("  include: [{}]", rs.include_patterns.join(", "));
    }
    if !rs.exclude_patterns.is_empty() {
        println!("  exclude: [{}]", rs.exclude_patterns.join(", "));
    }
}

/// Print the outcome of a merge: the effective rule-set and skipped files.
pub fn print_merge(rs: Option<&RuleSet>, skipped: &[SkippedFile], base: &Path, output: &str) {
    match output {
        "json" => print_json(&compose_merge_json(rs, skipped)),
        _ => {
            let color = use_colors(output);
            for s in skipped {
                println!(
                    "{} skipped {} — {}",
                    utils::note_prefix(),
                    utils::rel_display(&s.file, base),
                    s.reason
                );
            }
            match rs {
                Some(rs) => print_rules_human(rs, color),
                None => println!("{} no rule-set file could be loaded", utils::error_prefix()),
            }
        }
    }
}

/// Print a reconciliation report.
pub fn print_sync(report: &SyncReport, wrote: bool, output: &str) {
    match output {
        "json" => {
            let mut v = json!(report);
            v["wrote"] = json!(wrote);
            print_json(&v);
        }
        _ => {
            let color = use_colors(output);
            let status = if report.need_rebuild {
                "needs rebuild"
            } else {
                "up to date"
            };
            let line = format!(
                "{} — {} rules, {}{}",
                report.project,
                report.rules,
                status,
                if wrote { ", written" } else { "" }
            );
            if color && report.need_rebuild {
                println!("{}", line.yellow());
            } else if color {
                println!("{}", line.green());
            } else {
                println!("{}", line);
            }
        }
    }
}

/// Compose JSON for project properties.
pub fn compose_properties_json(props: &ProjectProperties) -> JsonVal {
    json!({
        "project": props.project(),
        "pmdEnabled": props.is_pmd_enabled(),
        "ruleSetStoredInProject": props.is_rule_set_stored_in_project(),
        "ruleSetFile": props.rule_set_file(),
        "workingSetName": props.working_set_name(),
        "includeDerivedFiles": props.is_include_derived_files(),
        "violationsAsErrors": props.violations_as_errors(),
        "fullBuildEnabled": props.is_full_build_enabled(),
        "needRebuild": props.is_need_rebuild(),
        "ruleSet": props.project_rule_set(),
    })
}

/// Compose JSON for a merge outcome.
pub fn compose_merge_json(rs: Option<&RuleSet>, skipped: &[SkippedFile]) -> JsonVal {
    json!({
        "ruleSet": rs,
        "skipped": skipped,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ProjectId, Rule};
    use std::path::PathBuf;

    #[test]
    fn test_compose_properties_json() {
        let mut p = ProjectProperties::new(ProjectId::new("/ws/demo"));
        let mut rs = RuleSet::default();
        rs.rules.push(Rule::new("X", "basic"));
        p.set_project_rule_set(rs);
        let v = compose_properties_json(&p);
        assert_eq!(v["project"], "/ws/demo");
        assert_eq!(v["ruleSetStoredInProject"], false);
        assert_eq!(v["workingSetName"], JsonVal::Null);
        assert_eq!(v["ruleSet"]["rules"][0]["name"], "X");
        assert_eq!(v["ruleSet"]["rules"][0]["ruleset"], "basic");
    }

    #[test]
    fn test_compose_merge_json() {
        let skipped = vec![SkippedFile {
            file: PathBuf::from("missing.toml"),
            reason: "Rule set not found: missing.toml".into(),
        }];
        let v = compose_merge_json(None, &skipped);
        assert_eq!(v["ruleSet"], JsonVal::Null);
        assert_eq!(v["skipped"][0]["file"], "missing.toml");
    }
}
