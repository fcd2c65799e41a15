//! Diff entry types.
//!
//! Paths are explicit segment lists rather than delimiter-joined strings, so a
//! title or parameter name containing a delimiter needs no escaping.

use crate::catalog::{Location, Resource, ResourceKey};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Legacy path separator used by joined-string renderings.
pub const LEGACY_SEPARATOR: char = '\u{0c}';

/// One step into a nested attribute value.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathSegment {
    Index(usize),
    Key(String),
}

impl PathSegment {
    pub fn key(k: impl Into<String>) -> Self {
        PathSegment::Key(k.into())
    }
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Index(i) => write!(f, "{}", i),
            PathSegment::Key(k) => write!(f, "{}", k),
        }
    }
}

/// Attribute path rooted at the resource, e.g. `["parameters", "mode"]`.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttrPath(Vec<PathSegment>);

impl AttrPath {
    pub fn new(segments: Vec<PathSegment>) -> Self {
        Self(segments)
    }

    /// The empty path, used by whole-resource entries.
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Build a path of string keys.
    pub fn from_keys<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(keys.into_iter().map(|k| PathSegment::Key(k.into())).collect())
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn child(&self, segment: PathSegment) -> Self {
        let mut segments = self.0.clone();
        segments.push(segment);
        Self(segments)
    }

    pub fn prefix(&self, len: usize) -> Self {
        Self(self.0[..len.min(self.0.len())].to_vec())
    }

    /// Segments rendered as strings.
    pub fn rendered(&self) -> Vec<String> {
        self.0.iter().map(ToString::to_string).collect()
    }

    /// Form-feed joined rendering used by the legacy output format.
    pub fn to_legacy_string(&self) -> String {
        self.rendered().join(&LEGACY_SEPARATOR.to_string())
    }

    /// Resolve this path inside a JSON value.
    pub fn lookup<'a>(&self, root: &'a Value) -> Option<&'a Value> {
        self.0.iter().try_fold(root, |node, segment| match segment {
            PathSegment::Key(k) => node.get(k.as_str()),
            PathSegment::Index(i) => node.get(*i),
        })
    }
}

impl fmt::Display for AttrPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.rendered().join("."))
    }
}

/// Kind of a diff entry, with the single-character symbol used in output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiffKind {
    ResourceAdded,
    ResourceRemoved,
    Changed,
    NestedChange,
}

impl DiffKind {
    pub fn symbol(&self) -> &'static str {
        match self {
            DiffKind::ResourceAdded => "+",
            DiffKind::ResourceRemoved => "-",
            DiffKind::Changed => "~",
            DiffKind::NestedChange => "!",
        }
    }
}

/// An attribute-level difference on a resource present in both catalogs.
#[derive(Debug, Clone, PartialEq)]
pub struct AttrChange {
    pub key: ResourceKey,
    pub path: AttrPath,
    /// `None` when the path does not exist in the old catalog
    pub old: Option<Value>,
    /// `None` when the path does not exist in the new catalog
    pub new: Option<Value>,
    pub old_location: Location,
    pub new_location: Location,
}

/// One reported difference between two catalogs.
#[derive(Debug, Clone, PartialEq)]
pub enum DiffEntry {
    ResourceAdded { key: ResourceKey, resource: Resource },
    ResourceRemoved { key: ResourceKey, resource: Resource },
    Changed(AttrChange),
    NestedChange(AttrChange),
}

impl DiffEntry {
    pub fn kind(&self) -> DiffKind {
        match self {
            DiffEntry::ResourceAdded { .. } => DiffKind::ResourceAdded,
            DiffEntry::ResourceRemoved { .. } => DiffKind::ResourceRemoved,
            DiffEntry::Changed(_) => DiffKind::Changed,
            DiffEntry::NestedChange(_) => DiffKind::NestedChange,
        }
    }

    pub fn key(&self) -> &ResourceKey {
        match self {
            DiffEntry::ResourceAdded { key, .. } | DiffEntry::ResourceRemoved { key, .. } => key,
            DiffEntry::Changed(c) | DiffEntry::NestedChange(c) => &c.key,
        }
    }

    pub fn type_name(&self) -> &str {
        &self.key().type_name
    }

    pub fn title(&self) -> &str {
        &self.key().title
    }

    /// Attribute path; whole-resource entries have the root path.
    pub fn path(&self) -> AttrPath {
        match self {
            DiffEntry::Changed(c) | DiffEntry::NestedChange(c) => c.path.clone(),
            _ => AttrPath::root(),
        }
    }

    pub fn attr_change(&self) -> Option<&AttrChange> {
        match self {
            DiffEntry::Changed(c) | DiffEntry::NestedChange(c) => Some(c),
            _ => None,
        }
    }

    /// Old-side value. Whole-resource removals expose the resource document.
    pub fn old_value(&self) -> Option<Value> {
        match self {
            DiffEntry::ResourceRemoved { resource, .. } => Some(resource.to_value()),
            DiffEntry::ResourceAdded { .. } => None,
            DiffEntry::Changed(c) | DiffEntry::NestedChange(c) => c.old.clone(),
        }
    }

    /// New-side value. Whole-resource additions expose the resource document.
    pub fn new_value(&self) -> Option<Value> {
        match self {
            DiffEntry::ResourceAdded { resource, .. } => Some(resource.to_value()),
            DiffEntry::ResourceRemoved { .. } => None,
            DiffEntry::Changed(c) | DiffEntry::NestedChange(c) => c.new.clone(),
        }
    }

    pub fn old_location(&self) -> Option<&Location> {
        match self {
            DiffEntry::ResourceRemoved { resource, .. } => Some(resource.location()),
            DiffEntry::ResourceAdded { .. } => None,
            DiffEntry::Changed(c) | DiffEntry::NestedChange(c) => Some(&c.old_location),
        }
    }

    pub fn new_location(&self) -> Option<&Location> {
        match self {
            DiffEntry::ResourceAdded { resource, .. } => Some(resource.location()),
            DiffEntry::ResourceRemoved { .. } => None,
            DiffEntry::Changed(c) | DiffEntry::NestedChange(c) => Some(&c.new_location),
        }
    }

    /// True when the entry only exists on the new side.
    pub fn is_addition(&self) -> bool {
        match self {
            DiffEntry::ResourceAdded { .. } => true,
            DiffEntry::NestedChange(c) => c.old.is_none() && c.new.is_some(),
            _ => false,
        }
    }

    /// True when the entry only exists on the old side.
    pub fn is_removal(&self) -> bool {
        match self {
            DiffEntry::ResourceRemoved { .. } => true,
            DiffEntry::NestedChange(c) => c.old.is_some() && c.new.is_none(),
            _ => false,
        }
    }

    /// `Type[Title] path` form used in audit events.
    pub fn identity(&self) -> String {
        let path = self.path();
        if path.is_root() {
            self.key().to_string()
        } else {
            format!("{} {}", self.key(), path)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Map};

    fn change(old: Option<Value>, new: Option<Value>) -> DiffEntry {
        DiffEntry::NestedChange(AttrChange {
            key: ResourceKey::new("File", "/x"),
            path: AttrPath::from_keys(["parameters", "owner"]),
            old,
            new,
            old_location: Location::default(),
            new_location: Location::default(),
        })
    }

    #[test]
    fn test_path_lookup() {
        let v = json!({"parameters": {"list": [1, {"a": 2}]}});
        let p = AttrPath::from_keys(["parameters", "list"])
            .child(PathSegment::Index(1))
            .child(PathSegment::key("a"));
        assert_eq!(p.lookup(&v), Some(&json!(2)));
        assert_eq!(AttrPath::from_keys(["nope"]).lookup(&v), None);
        assert_eq!(AttrPath::root().lookup(&v), Some(&v));
    }

    #[test]
    fn test_path_renderings() {
        let p = AttrPath::from_keys(["parameters", "mode"]);
        assert_eq!(p.to_string(), "parameters.mode");
        assert_eq!(p.to_legacy_string(), "parameters\u{0c}mode");
    }

    #[test]
    fn test_path_serializes_as_segment_list() {
        let p = AttrPath::from_keys(["parameters", "list"]).child(PathSegment::Index(3));
        assert_eq!(serde_json::to_value(&p).unwrap(), json!(["parameters", "list", 3]));
    }

    #[test]
    fn test_addition_and_removal_classification() {
        assert!(change(None, Some(json!("root"))).is_addition());
        assert!(change(Some(json!("root")), None).is_removal());
        let both = change(Some(json!("a")), Some(json!("b")));
        assert!(!both.is_addition() && !both.is_removal());

        let added = DiffEntry::ResourceAdded {
            key: ResourceKey::new("File", "/x"),
            resource: Resource::new("File", "/x", Map::new()),
        };
        assert!(added.is_addition());
        assert_eq!(added.kind().symbol(), "+");
        assert_eq!(added.identity(), "File[/x]");
    }
}
