#![allow(clippy::unwrap_used, clippy::expect_used)]

/// Scenario F: ignore rules on sub-keys of a nested map
use catdiff_core::diff::{diff_catalogs_with_rules, AttrPath, DiffEntry, DiffKind};
use catdiff_core::ignore::IgnoreRuleSet;
use catdiff_core::{preview, Settings};
use serde_json::{json, Value};

mod common;
use common::{catalog, file};

fn doc(config: Value) -> String {
    json!({ "resources": [file("/etc/app", json!({ "config": config }))] }).to_string()
}

fn ignoring(rules: &[&str]) -> Settings {
    Settings {
        ignore_rules: rules.iter().map(|r| r.to_string()).collect(),
        ..Default::default()
    }
}

#[test]
fn test_scenario_06_every_sub_key_ignored_leaves_nothing() {
    // GIVEN two sub-keys of one map that both change, each covered by a rule
    let old = doc(json!({"a": 1, "b": 2}));
    let new = doc(json!({"a": 9, "b": 3}));
    let settings = ignoring(&[
        "File[/etc/app]parameters::config::a",
        "File[/etc/app]parameters::config::b",
    ]);

    // WHEN previewing
    let report = preview(&old, &new, &settings).unwrap();

    // THEN the map produces no entry and both sub-edits are accounted for
    assert!(!report.has_changes(), "left: {:?}", report.entries);
    assert_eq!(report.suppressed_by_rules.len(), 2);
}

#[test]
fn test_scenario_06_partially_ignored_map_still_aggregates() {
    // GIVEN the same change with only one sub-key covered
    let old = doc(json!({"a": 1, "b": 2}));
    let new = doc(json!({"a": 9, "b": 3}));
    let settings = ignoring(&["File[/etc/app]parameters::config::a"]);

    // WHEN previewing
    let report = preview(&old, &new, &settings).unwrap();

    // THEN one NestedChange carries the full map on both sides
    assert_eq!(report.entries.len(), 1);
    let entry = &report.entries[0];
    assert_eq!(entry.kind(), DiffKind::NestedChange);
    assert_eq!(entry.path(), AttrPath::from_keys(["parameters", "config"]));
    assert_eq!(entry.old_value(), Some(json!({"a": 1, "b": 2})));
    assert_eq!(entry.new_value(), Some(json!({"a": 9, "b": 3})));
    assert!(report.suppressed_by_rules.is_empty());
}

#[test]
fn test_scenario_06_sub_key_rule_independent_of_siblings() {
    // GIVEN a rule for `a`, applied once when only `a` changes
    let rule = ["File[/etc/app]parameters::config::a"];
    let alone = preview(
        &doc(json!({"a": 1, "b": 2})),
        &doc(json!({"a": 9, "b": 2})),
        &ignoring(&rule),
    )
    .unwrap();

    // WHEN a sibling key that is also ignored changes at the same time
    let with_sibling = preview(
        &doc(json!({"a": 1, "b": 2})),
        &doc(json!({"a": 9, "b": 3})),
        &ignoring(&[rule[0], "File[/etc/app]parameters::config::b"]),
    )
    .unwrap();

    // THEN both runs suppress everything
    assert!(!alone.has_changes());
    assert!(!with_sibling.has_changes());
}

#[test]
fn test_scenario_06_differ_reports_elementary_suppressions() {
    // GIVEN a map with a changed key and an added key, both ignored
    let old = catalog(vec![file("/etc/app", json!({"config": {"a": 1}}))]);
    let new = catalog(vec![file("/etc/app", json!({"config": {"a": 2, "c": true}}))]);
    let rules = IgnoreRuleSet::from_shorthand(&[
        "File[/etc/app]parameters::config::a",
        "File[/etc/app]+parameters::config::c",
    ])
    .unwrap();

    // WHEN diffing with the rules
    let outcome = diff_catalogs_with_rules(&old, &new, &rules).unwrap();

    // THEN the suppressed entries sit at the sub-key paths, in path order
    assert!(outcome.entries.is_empty());
    let paths: Vec<AttrPath> = outcome.suppressed.iter().map(DiffEntry::path).collect();
    assert_eq!(
        paths,
        vec![
            AttrPath::from_keys(["parameters", "config", "a"]),
            AttrPath::from_keys(["parameters", "config", "c"]),
        ]
    );
    assert!(outcome.suppressed[1].is_addition());
}
