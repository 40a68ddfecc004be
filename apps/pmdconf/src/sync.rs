//! Synchronize a project rule-set with the global rule-set.
//!
//! Applies to projects whose rule-set is not stored in the project. Rules
//! removed globally are removed from the project, surviving rules are rebound
//! to the current global definitions, and rules the project never selected
//! are never added. Include/exclude patterns always come from the global set.

use crate::models::RuleSet;
use tracing::{debug, info};

/// Reconcile `project` against `global`.
///
/// Returns the rule-set the project should use and whether it differs from
/// `project`. Inputs are never modified; when nothing changed the returned
/// value equals `project`.
pub fn synchronize(project: &RuleSet, global: &RuleSet) -> (RuleSet, bool) {
    let patterns_changed = !project.same_patterns(global);
    if project.same_rules(global) {
        if !patterns_changed {
            return (project.clone(), false);
        }
        let mut out = project.clone();
        inherit_patterns(&mut out, global);
        return (out, true);
    }

    debug!("The project ruleset is different from the global ruleset; synchronizing.");
    let mut haystack: Vec<_> = global.rules.iter().collect();
    let mut next = RuleSet::empty(project.name.clone(), project.description.clone());
    for rule in &project.rules {
        match haystack.iter().position(|g| g.name == rule.name) {
            Some(idx) => {
                // each global rule satisfies at most one project rule
                next.rules.push(haystack.remove(idx).clone());
            }
            None => debug!(
                "The rule {} is not defined in the global ruleset. Remove it.",
                rule.name
            ),
        }
    }
    inherit_patterns(&mut next, global);

    if next.same_rules(project) {
        if !patterns_changed {
            return (project.clone(), false);
        }
        let mut out = project.clone();
        inherit_patterns(&mut out, global);
        return (out, true);
    }
    info!(
        "Set the project ruleset according to the global ruleset ({} -> {} rules).",
        project.len(),
        next.len()
    );
    (next, true)
}

fn inherit_patterns(target: &mut RuleSet, global: &RuleSet) {
    target.include_patterns = global.include_patterns.clone();
    target.exclude_patterns = global.exclude_patterns.clone();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Rule;

    fn rule_set(name: &str, rules: &[(&str, &str)]) -> RuleSet {
        let mut rs = RuleSet::empty(name, "");
        rs.rules = rules.iter().map(|(n, c)| Rule::new(*n, *c)).collect();
        rs
    }

    #[test]
    fn test_narrowing_drops_rules_missing_globally() {
        let project = rule_set("project", &[("P", "basic"), ("Q", "basic")]);
        let global = rule_set("global", &[("P", "basic"), ("R", "basic")]);
        let (out, changed) = synchronize(&project, &global);
        assert!(changed);
        assert_eq!(out.membership(), vec![("P", "basic")]);
        assert_eq!(out.name, "project");
        // inputs untouched
        assert_eq!(project.len(), 2);
    }

    #[test]
    fn test_stable_when_structurally_equal() {
        let project = rule_set("project", &[("P", "basic"), ("R", "basic")]);
        let global = rule_set("global", &[("P", "basic"), ("R", "basic")]);
        let (out, changed) = synchronize(&project, &global);
        assert!(!changed);
        assert_eq!(out, project);
    }

    #[test]
    fn test_subset_keeps_order_and_does_not_add() {
        let project = rule_set("project", &[("R", "basic"), ("P", "basic")]);
        let global = rule_set("global", &[("P", "basic"), ("R", "basic"), ("S", "basic")]);
        let (out, changed) = synchronize(&project, &global);
        assert!(!changed);
        assert_eq!(out.membership(), vec![("R", "basic"), ("P", "basic")]);
    }

    #[test]
    fn test_rebinds_to_global_catalog() {
        let project = rule_set("project", &[("P", "old")]);
        let mut global = rule_set("global", &[("P", "new")]);
        global.rules[0].message = "updated".into();
        let (out, changed) = synchronize(&project, &global);
        assert!(changed);
        assert_eq!(out.membership(), vec![("P", "new")]);
        assert_eq!(out.rules[0].message, "updated");
    }

    #[test]
    fn test_one_to_one_matching() {
        let project = rule_set("project", &[("P", "a"), ("P", "b")]);
        let global = rule_set("global", &[("P", "a")]);
        let (out, changed) = synchronize(&project, &global);
        assert!(changed);
        assert_eq!(out.membership(), vec![("P", "a")]);
    }

    #[test]
    fn test_patterns_inherited_from_global() {
        let project = rule_set("project", &[("P", "basic")]);
        let mut global = rule_set("global", &[("P", "basic")]);
        global.exclude_patterns.push("**/gen/**".into());
        let (out, changed) = synchronize(&project, &global);
        assert!(changed);
        assert_eq!(out.exclude_patterns, vec!["**/gen/**".to_string()]);
        assert_eq!(out.membership(), project.membership());

        let (again, changed) = synchronize(&out, &global);
        assert!(!changed);
        assert_eq!(again, out);
    }
}
