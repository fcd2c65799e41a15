//! Resource model

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeSet;
use std::fmt;

/// Identity of a resource within one catalog: `(type, title)`.
///
/// `type_name` is always stored in canonical capitalisation (see
/// [`canonical_type`]), so keys built from differently-cased input compare equal.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ResourceKey {
    pub type_name: String,
    pub title: String,
}

impl ResourceKey {
    pub fn new(type_name: &str, title: impl Into<String>) -> Self {
        Self {
            type_name: canonical_type(type_name),
            title: title.into(),
        }
    }
}

impl fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.type_name, self.title)
    }
}

/// Source provenance of a resource declaration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub file: Option<String>,
    pub line: Option<u64>,
}

impl Location {
    pub fn new(file: Option<String>, line: Option<u64>) -> Self {
        Self { file, line }
    }

    pub fn is_known(&self) -> bool {
        self.file.is_some() || self.line.is_some()
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.file, self.line) {
            (Some(file), Some(line)) => write!(f, "{}:{}", file, line),
            (Some(file), None) => write!(f, "{}", file),
            (None, Some(line)) => write!(f, "<unknown>:{}", line),
            (None, None) => write!(f, "<unknown>"),
        }
    }
}

/// One managed resource, immutable after catalog construction.
#[derive(Debug, Clone, PartialEq)]
pub struct Resource {
    type_name: String,
    title: String,
    parameters: Map<String, Value>,
    tags: BTreeSet<String>,
    exported: bool,
    location: Location,
}

impl Resource {
    pub fn new(type_name: &str, title: impl Into<String>, parameters: Map<String, Value>) -> Self {
        Self {
            type_name: canonical_type(type_name),
            title: title.into(),
            parameters,
            tags: BTreeSet::new(),
            exported: false,
            location: Location::default(),
        }
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_exported(mut self, exported: bool) -> Self {
        self.exported = exported;
        self
    }

    pub fn with_location(mut self, location: Location) -> Self {
        self.location = location;
        self
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn parameters(&self) -> &Map<String, Value> {
        &self.parameters
    }

    pub fn parameter(&self, name: &str) -> Option<&Value> {
        self.parameters.get(name)
    }

    pub fn tags(&self) -> &BTreeSet<String> {
        &self.tags
    }

    pub fn exported(&self) -> bool {
        self.exported
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    pub fn key(&self) -> ResourceKey {
        ResourceKey {
            type_name: self.type_name.clone(),
            title: self.title.clone(),
        }
    }

    /// Secondary titles declared through the `alias` parameter.
    pub fn aliases(&self) -> Vec<&str> {
        match self.parameters.get("alias") {
            Some(Value::String(s)) => vec![s.as_str()],
            Some(Value::Array(items)) => items.iter().filter_map(Value::as_str).collect(),
            _ => Vec::new(),
        }
    }

    /// The subtree the differ compares: parameters plus the exported flag.
    pub fn attribute_tree(&self) -> Value {
        let mut tree = Map::new();
        tree.insert(
            "parameters".to_string(),
            Value::Object(self.parameters.clone()),
        );
        tree.insert("exported".to_string(), Value::Bool(self.exported));
        Value::Object(tree)
    }

    /// Full JSON form, used as the value of whole-resource diff entries.
    pub fn to_value(&self) -> Value {
        let mut obj = Map::new();
        obj.insert("type".to_string(), Value::String(self.type_name.clone()));
        obj.insert("title".to_string(), Value::String(self.title.clone()));
        obj.insert(
            "tags".to_string(),
            Value::Array(self.tags.iter().cloned().map(Value::String).collect()),
        );
        obj.insert("exported".to_string(), Value::Bool(self.exported));
        if let Some(file) = &self.location.file {
            obj.insert("file".to_string(), Value::String(file.clone()));
        }
        if let Some(line) = self.location.line {
            obj.insert("line".to_string(), Value::Number(line.into()));
        }
        obj.insert(
            "parameters".to_string(),
            Value::Object(self.parameters.clone()),
        );
        Value::Object(obj)
    }
}

/// Canonical capitalisation of a resource type name.
///
/// Each `::`-separated segment gets an upper-case first letter and lower-case
/// remainder: `file` -> `File`, `FOO::bar_baz` -> `Foo::Bar_baz`.
pub fn canonical_type(raw: &str) -> String {
    raw.split("::")
        .map(|segment| {
            let mut chars = segment.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join("::")
}

/// Parameter holding the real identity for types whose title may be a
/// composite key.
pub fn namevar_for(type_name: &str) -> &'static str {
    match type_name {
        "File" => "path",
        "Exec" => "command",
        _ => "name",
    }
}
