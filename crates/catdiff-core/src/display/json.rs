//! Structured JSON renderings.

use crate::catalog::Location;
use crate::diff::model::{AttrPath, DiffEntry, LEGACY_SEPARATOR};
use crate::display::DisplayOptions;
use crate::errors::{CatdiffError, ExError};
use serde::Serialize;
use serde_json::{json, Value};

pub const DIFF_FORMAT_VERSION: u32 = 2;

/// One entry of the `json` format.
#[derive(Debug, Clone, Serialize)]
pub struct DiffRecord {
    pub diff_type: &'static str,
    #[serde(rename = "type")]
    pub type_name: String,
    pub title: String,
    pub structure: AttrPath,
    pub old_value: Option<Value>,
    pub new_value: Option<Value>,
    pub old_file: Option<String>,
    pub old_line: Option<u64>,
    pub new_file: Option<String>,
    pub new_line: Option<u64>,
}

impl From<&DiffEntry> for DiffRecord {
    fn from(entry: &DiffEntry) -> Self {
        let old_loc = entry.old_location().cloned().unwrap_or_default();
        let new_loc = entry.new_location().cloned().unwrap_or_default();
        Self {
            diff_type: entry.kind().symbol(),
            type_name: entry.type_name().to_string(),
            title: entry.title().to_string(),
            structure: entry.path(),
            old_value: entry.old_value(),
            new_value: entry.new_value(),
            old_file: old_loc.file,
            old_line: old_loc.line,
            new_file: new_loc.file,
            new_line: new_loc.line,
        }
    }
}

#[derive(Debug, Serialize)]
struct JsonDocument<'a> {
    header: Option<&'a str>,
    diff_format_version: u32,
    diff: Vec<DiffRecord>,
}

/// `{header, diff_format_version, diff: [record...]}`.
///
/// # Errors
///
/// - `Serialization` — encoding failed
pub fn render_json(entries: &[DiffEntry], options: &DisplayOptions) -> Result<String, ExError> {
    let doc = JsonDocument {
        header: options.header.as_deref(),
        diff_format_version: DIFF_FORMAT_VERSION,
        diff: entries.iter().map(DiffRecord::from).collect(),
    };
    encode(&doc)
}

/// `{header, diff: [[symbol, "Type\fTitle\fpath", value(s), location(s)]]}`.
///
/// # Errors
///
/// - `Serialization` — encoding failed
pub fn render_legacy_json(
    entries: &[DiffEntry],
    options: &DisplayOptions,
) -> Result<String, ExError> {
    let diff: Vec<Value> = entries.iter().map(legacy_record).collect();
    encode(&json!({ "header": options.header, "diff": diff }))
}

fn legacy_record(entry: &DiffEntry) -> Value {
    let mut key = format!("{}{}{}", entry.type_name(), LEGACY_SEPARATOR, entry.title());
    let path = entry.path();
    if !path.is_root() {
        key.push(LEGACY_SEPARATOR);
        key.push_str(&path.to_legacy_string());
    }
    let symbol = entry.kind().symbol();
    match entry {
        DiffEntry::ResourceAdded { resource, .. } | DiffEntry::ResourceRemoved { resource, .. } => {
            json!([symbol, key, resource.to_value(), legacy_location(resource.location())])
        }
        DiffEntry::Changed(c) | DiffEntry::NestedChange(c) => json!([
            symbol,
            key,
            c.old,
            c.new,
            legacy_location(&c.old_location),
            legacy_location(&c.new_location)
        ]),
    }
}

fn legacy_location(loc: &Location) -> Value {
    if loc.is_known() {
        json!({ "file": loc.file, "line": loc.line })
    } else {
        Value::Null
    }
}

fn encode<T: Serialize>(doc: &T) -> Result<String, ExError> {
    serde_json::to_string_pretty(doc)
        .map_err(|e| ExError::from(CatdiffError::from(e)).with_op("render"))
}
