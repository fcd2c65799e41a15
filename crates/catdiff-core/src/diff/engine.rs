//! Structural differ.
//!
//! The core entry point is [`diff_catalogs`], which compares two valid
//! catalogs and produces an ordered list of [`DiffEntry`] values.

use crate::catalog::{Catalog, Resource, ResourceKey};
use crate::diff::lcs::{align, Op};
use crate::diff::model::{AttrChange, AttrPath, DiffEntry, PathSegment};
use crate::errors::{CatdiffError, ExError};
use crate::ignore::engine::audit_suppression;
use crate::ignore::{IgnoreRule, IgnoreRuleSet};
use crate::{log_op_end, log_op_start};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};
use std::time::Instant;

/// Smallest unit of structural difference before aggregation.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementaryEdit {
    pub path: AttrPath,
    pub old: Option<Value>,
    pub new: Option<Value>,
}

impl ElementaryEdit {
    fn is_substitution(&self) -> bool {
        self.old.is_some() && self.new.is_some()
    }
}

/// Entries a rule-aware diff reports, plus the elementary entries its rules
/// removed before aggregation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DiffOutcome {
    pub entries: Vec<DiffEntry>,
    pub suppressed: Vec<DiffEntry>,
}

/// Compute the diff between two catalogs.
///
/// Output order is by resource key, then by attribute path, independent of
/// the order resources or parameters appear in the input documents.
///
/// # Errors
///
/// - `DifferInput` — either catalog failed to parse
pub fn diff_catalogs(old: &Catalog, new: &Catalog) -> Result<Vec<DiffEntry>, ExError> {
    diff_catalogs_with_rules(old, new, &IgnoreRuleSet::new()).map(|outcome| outcome.entries)
}

/// Compute the diff, letting `rules` see every elementary edit beneath an
/// attribute before the edits are aggregated.
///
/// An attribute whose elementary edits are all matched produces no entry.
/// Rules are not applied to the aggregated entries; callers run
/// [`IgnoreRuleSet::partition`] over the result for that.
///
/// # Errors
///
/// - `DifferInput` — either catalog failed to parse
pub fn diff_catalogs_with_rules(
    old: &Catalog,
    new: &Catalog,
    rules: &IgnoreRuleSet,
) -> Result<DiffOutcome, ExError> {
    check_input("old", old)?;
    check_input("new", new)?;

    let started = Instant::now();
    log_op_start!(
        "diff_catalogs",
        old_resources = old.len(),
        new_resources = new.len(),
        rule_count = rules.len()
    );

    let old_map: BTreeMap<ResourceKey, &Resource> =
        old.resources().iter().map(|r| (r.key(), r)).collect();
    let new_map: BTreeMap<ResourceKey, &Resource> =
        new.resources().iter().map(|r| (r.key(), r)).collect();
    let keys: BTreeSet<&ResourceKey> = old_map.keys().chain(new_map.keys()).collect();

    let mut outcome = DiffOutcome::default();
    for key in keys {
        match (old_map.get(key), new_map.get(key)) {
            (Some(o), None) => outcome.entries.push(DiffEntry::ResourceRemoved {
                key: key.clone(),
                resource: (*o).clone(),
            }),
            (None, Some(n)) => outcome.entries.push(DiffEntry::ResourceAdded {
                key: key.clone(),
                resource: (*n).clone(),
            }),
            (Some(o), Some(n)) => {
                let resource = diff_resource_with_rules(o, n, rules);
                outcome.entries.extend(resource.entries);
                outcome.suppressed.extend(resource.suppressed);
            }
            (None, None) => {}
        }
    }

    log_op_end!(
        "diff_catalogs",
        duration_ms = started.elapsed().as_millis() as u64,
        entry_count = outcome.entries.len(),
        suppressed_count = outcome.suppressed.len()
    );
    Ok(outcome)
}

fn check_input(side: &str, catalog: &Catalog) -> Result<(), ExError> {
    match catalog.error_message() {
        None => Ok(()),
        Some(reason) => Err(ExError::from(CatdiffError::InvalidCatalog {
            side: side.to_string(),
            reason: reason.to_string(),
        })
        .with_op("diff_catalogs")),
    }
}

/// Diff two versions of the same resource into reported entries.
pub fn diff_resource(old: &Resource, new: &Resource) -> Vec<DiffEntry> {
    diff_resource_with_rules(old, new, &IgnoreRuleSet::new()).entries
}

/// Diff two versions of the same resource, dropping every attribute whose
/// elementary edits are all matched by `rules`.
///
/// The shape of a surviving entry is decided by all of its attribute's edits,
/// matched or not, so a partially ignored attribute still aggregates.
pub fn diff_resource_with_rules(
    old: &Resource,
    new: &Resource,
    rules: &IgnoreRuleSet,
) -> DiffOutcome {
    let old_tree = old.attribute_tree();
    let new_tree = new.attribute_tree();

    let mut edits = Vec::new();
    compare_values(&AttrPath::root(), &old_tree, &new_tree, &mut edits);
    if edits.is_empty() {
        return DiffOutcome::default();
    }

    let mut groups: BTreeMap<AttrPath, Vec<ElementaryEdit>> = BTreeMap::new();
    for edit in edits {
        let top = top_attribute_path(&edit.path, &old_tree, &new_tree);
        groups.entry(top).or_default().push(edit);
    }

    let key = new.key();
    let make = |path: AttrPath, old_v: Option<Value>, new_v: Option<Value>| AttrChange {
        key: key.clone(),
        path,
        old: old_v,
        new: new_v,
        old_location: old.location().clone(),
        new_location: new.location().clone(),
    };

    let mut outcome = DiffOutcome::default();
    for (top, group) in groups {
        if !rules.is_empty() {
            let elementary: Vec<DiffEntry> = group
                .iter()
                .map(|edit| {
                    elementary_entry(make(edit.path.clone(), edit.old.clone(), edit.new.clone()))
                })
                .collect();
            let matched: Option<Vec<&IgnoreRule>> =
                elementary.iter().map(|e| rules.matching_rule(e)).collect();
            if let Some(matched) = matched {
                for (rule, entry) in matched.into_iter().zip(&elementary) {
                    audit_suppression(rule, entry);
                }
                outcome.suppressed.extend(elementary);
                continue;
            }
        }

        let entry = match group.as_slice() {
            [single] if single.is_substitution() => DiffEntry::Changed(make(
                single.path.clone(),
                single.old.clone(),
                single.new.clone(),
            )),
            [single] if single.path == top => {
                DiffEntry::NestedChange(make(top, single.old.clone(), single.new.clone()))
            }
            _ => {
                let old_v = top.lookup(&old_tree).cloned();
                let new_v = top.lookup(&new_tree).cloned();
                DiffEntry::NestedChange(make(top, old_v, new_v))
            }
        };
        outcome.entries.push(entry);
    }
    outcome
}

/// One elementary edit seen as an entry at its own path.
fn elementary_entry(change: AttrChange) -> DiffEntry {
    if change.old.is_some() && change.new.is_some() {
        DiffEntry::Changed(change)
    } else {
        DiffEntry::NestedChange(change)
    }
}

/// The attribute an edit belongs to: its first segment, extended by one key
/// when that first segment is a map container (so `parameters.mode`, not
/// `parameters`).
fn top_attribute_path(path: &AttrPath, old_tree: &Value, new_tree: &Value) -> AttrPath {
    let first = path.prefix(1);
    let is_container = first.lookup(old_tree).map(Value::is_object).unwrap_or(false)
        || first.lookup(new_tree).map(Value::is_object).unwrap_or(false);
    if is_container && path.len() >= 2 {
        path.prefix(2)
    } else {
        first
    }
}

/// Recursive comparison producing elementary edits.
pub fn compare_values(path: &AttrPath, old: &Value, new: &Value, edits: &mut Vec<ElementaryEdit>) {
    if old == new {
        return;
    }
    match (old, new) {
        (Value::Object(a), Value::Object(b)) => compare_maps(path, a, b, edits),
        (Value::Array(a), Value::Array(b)) => compare_arrays(path, a, b, edits),
        _ => edits.push(ElementaryEdit {
            path: path.clone(),
            old: Some(old.clone()),
            new: Some(new.clone()),
        }),
    }
}

fn compare_maps(
    path: &AttrPath,
    old: &Map<String, Value>,
    new: &Map<String, Value>,
    edits: &mut Vec<ElementaryEdit>,
) {
    let keys: BTreeSet<&String> = old.keys().chain(new.keys()).collect();
    for k in keys {
        let child = path.child(PathSegment::Key(k.clone()));
        match (old.get(k), new.get(k)) {
            (Some(a), Some(b)) => compare_values(&child, a, b, edits),
            (Some(a), None) => edits.push(ElementaryEdit {
                path: child,
                old: Some(a.clone()),
                new: None,
            }),
            (None, Some(b)) => edits.push(ElementaryEdit {
                path: child,
                old: None,
                new: Some(b.clone()),
            }),
            (None, None) => {}
        }
    }
}

fn compare_arrays(path: &AttrPath, old: &[Value], new: &[Value], edits: &mut Vec<ElementaryEdit>) {
    for op in align(old, new) {
        match op {
            Op::Equal(..) => {}
            Op::Delete(i) => edits.push(ElementaryEdit {
                path: path.child(PathSegment::Index(i)),
                old: Some(old[i].clone()),
                new: None,
            }),
            Op::Insert(j) => edits.push(ElementaryEdit {
                path: path.child(PathSegment::Index(j)),
                old: None,
                new: Some(new[j].clone()),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn resource(params: Value) -> Resource {
        let map = params.as_object().cloned().unwrap_or_default();
        Resource::new("File", "/tmp/x", map)
    }

    #[test]
    fn test_scalar_change_is_changed() {
        let entries = diff_resource(
            &resource(json!({"mode": "0444"})),
            &resource(json!({"mode": "0755"})),
        );
        assert_eq!(entries.len(), 1);
        match &entries[0] {
            DiffEntry::Changed(c) => {
                assert_eq!(c.path, AttrPath::from_keys(["parameters", "mode"]));
                assert_eq!(c.old, Some(json!("0444")));
                assert_eq!(c.new, Some(json!("0755")));
            }
            other => panic!("expected Changed, got {:?}", other),
        }
    }

    #[test]
    fn test_parameter_added_is_nested_change_with_absent_old() {
        let entries = diff_resource(&resource(json!({})), &resource(json!({"owner": "root"})));
        assert_eq!(entries.len(), 1);
        match &entries[0] {
            DiffEntry::NestedChange(c) => {
                assert_eq!(c.path, AttrPath::from_keys(["parameters", "owner"]));
                assert_eq!(c.old, None);
                assert_eq!(c.new, Some(json!("root")));
            }
            other => panic!("expected NestedChange, got {:?}", other),
        }
    }

    #[test]
    fn test_array_insertions_aggregate() {
        let entries = diff_resource(
            &resource(json!({"list": [1, 3, 5]})),
            &resource(json!({"list": [1, 2, 3, 4, 5]})),
        );
        assert_eq!(entries.len(), 1);
        match &entries[0] {
            DiffEntry::NestedChange(c) => {
                assert_eq!(c.path, AttrPath::from_keys(["parameters", "list"]));
                assert_eq!(c.old, Some(json!([1, 3, 5])));
                assert_eq!(c.new, Some(json!([1, 2, 3, 4, 5])));
            }
            other => panic!("expected NestedChange, got {:?}", other),
        }
    }

    #[test]
    fn test_single_array_insertion_carries_full_values() {
        let entries = diff_resource(
            &resource(json!({"list": ["a"]})),
            &resource(json!({"list": ["a", "b"]})),
        );
        assert_eq!(entries.len(), 1);
        let c = entries[0].attr_change().unwrap();
        assert_eq!(entries[0].kind(), crate::diff::DiffKind::NestedChange);
        assert_eq!(c.old, Some(json!(["a"])));
        assert_eq!(c.new, Some(json!(["a", "b"])));
    }

    #[test]
    fn test_nested_map_single_leaf_change_keeps_full_path() {
        let entries = diff_resource(
            &resource(json!({"config": {"a": 1, "b": 2}})),
            &resource(json!({"config": {"a": 1, "b": 3}})),
        );
        assert_eq!(entries.len(), 1);
        assert_eq!(
            entries[0].path(),
            AttrPath::from_keys(["parameters", "config", "b"])
        );
        assert_eq!(entries[0].kind(), crate::diff::DiffKind::Changed);
    }

    #[test]
    fn test_nested_map_multiple_changes_aggregate() {
        let entries = diff_resource(
            &resource(json!({"config": {"a": 1, "b": 2}})),
            &resource(json!({"config": {"a": 9, "c": 3}})),
        );
        assert_eq!(entries.len(), 1);
        let c = entries[0].attr_change().unwrap();
        assert_eq!(c.path, AttrPath::from_keys(["parameters", "config"]));
        assert_eq!(c.old, Some(json!({"a": 1, "b": 2})));
        assert_eq!(c.new, Some(json!({"a": 9, "c": 3})));
    }

    #[test]
    fn test_exported_flag_change() {
        let old = resource(json!({}));
        let new = resource(json!({})).with_exported(true);
        let entries = diff_resource(&old, &new);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].path(), AttrPath::from_keys(["exported"]));
        assert_eq!(entries[0].kind(), crate::diff::DiffKind::Changed);
    }

    #[test]
    fn test_type_change_scalar_to_array_is_changed() {
        let entries = diff_resource(
            &resource(json!({"require": "Package[a]"})),
            &resource(json!({"require": ["Package[a]"]})),
        );
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].kind(), crate::diff::DiffKind::Changed);
    }

    #[test]
    fn test_identical_resources_produce_nothing() {
        let r = resource(json!({"a": [1, {"b": 2}]}));
        assert!(diff_resource(&r, &r).is_empty());
    }
}
