//! Post-diff filter pipeline.
//!
//! Each filter is a stateless policy behind [`DiffFilter`]. Filters are
//! resolved by name once, when the pipeline is built; an unknown name fails
//! there rather than mid-run.

mod compilation_dir;
mod json;
mod single_item_array;
mod yaml;

pub use compilation_dir::CompilationDirFilter;
pub use json::JsonFilter;
pub use single_item_array::SingleItemArrayFilter;
pub use yaml::YamlFilter;

use crate::core_types::schema::{EVENT_SUPPRESSED, OP_FILTER_MATCH};
use crate::diff::model::DiffEntry;
use crate::errors::{CatdiffError, ExError};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Inputs available to every filter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FilterOptions {
    /// Directory the old catalog was compiled in
    #[serde(default)]
    pub old_compilation_dir: Option<String>,
    /// Directory the new catalog was compiled in
    #[serde(default)]
    pub new_compilation_dir: Option<String>,
}

/// A named suppression policy.
pub trait DiffFilter: Send + Sync {
    /// Registry name, matched case-sensitively.
    fn name(&self) -> &'static str;

    /// True when the entry should be removed from the output.
    fn filtered(&self, entry: &DiffEntry, options: &FilterOptions) -> bool;
}

/// Names of every built-in filter.
pub const BUILTIN_FILTERS: &[&str] = &["JSON", "YAML", "SingleItemArray", "CompilationDir"];

/// Instantiate a built-in filter by name.
pub fn lookup(name: &str) -> Option<Box<dyn DiffFilter>> {
    match name {
        "JSON" => Some(Box::new(JsonFilter)),
        "YAML" => Some(Box::new(YamlFilter)),
        "SingleItemArray" => Some(Box::new(SingleItemArrayFilter)),
        "CompilationDir" => Some(Box::new(CompilationDirFilter)),
        _ => None,
    }
}

/// An ordered set of resolved filters plus their options.
pub struct FilterPipeline {
    filters: Vec<Box<dyn DiffFilter>>,
    options: FilterOptions,
}

impl FilterPipeline {
    /// Resolve each name once. Duplicate names are collapsed.
    ///
    /// # Errors
    ///
    /// - `UnknownFilter` — a name is not registered
    pub fn from_names<S: AsRef<str>>(names: &[S], options: FilterOptions) -> Result<Self, ExError> {
        let mut filters: Vec<Box<dyn DiffFilter>> = Vec::new();
        for name in names {
            let name = name.as_ref();
            if filters.iter().any(|f| f.name() == name) {
                continue;
            }
            let filter = lookup(name).ok_or_else(|| {
                ExError::from(CatdiffError::UnknownFilter {
                    name: name.to_string(),
                })
                .with_op("configure_filters")
            })?;
            filters.push(filter);
        }
        Ok(Self { filters, options })
    }

    /// Pipeline from explicit filter instances.
    pub fn with_filters(filters: Vec<Box<dyn DiffFilter>>, options: FilterOptions) -> Self {
        Self { filters, options }
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.filters.iter().map(|f| f.name()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Split entries into `(kept, suppressed)`.
    pub fn partition(&self, entries: Vec<DiffEntry>) -> (Vec<DiffEntry>, Vec<DiffEntry>) {
        if self.filters.is_empty() {
            return (entries, Vec::new());
        }
        let mut kept = Vec::with_capacity(entries.len());
        let mut suppressed = Vec::new();
        for entry in entries {
            match self.filters.iter().find(|f| f.filtered(&entry, &self.options)) {
                Some(filter) => {
                    tracing::info!(
                        op = OP_FILTER_MATCH,
                        event = EVENT_SUPPRESSED,
                        filter = filter.name(),
                        resource_type = entry.type_name(),
                        resource_title = entry.title(),
                        path = %entry.path(),
                        diff_type = entry.kind().symbol(),
                    );
                    suppressed.push(entry);
                }
                None => kept.push(entry),
            }
        }
        (kept, suppressed)
    }

    pub fn apply(&self, entries: Vec<DiffEntry>) -> Vec<DiffEntry> {
        self.partition(entries).0
    }
}

/// Resolve `names` and remove every entry any of them filters.
///
/// # Errors
///
/// - `UnknownFilter` — a name is not registered; no entry is touched
pub fn apply_filters<S: AsRef<str>>(
    entries: Vec<DiffEntry>,
    names: &[S],
    options: &FilterOptions,
) -> Result<Vec<DiffEntry>, ExError> {
    Ok(FilterPipeline::from_names(names, options.clone())?.apply(entries))
}

/// Both sides of a `parameters.content` change on a `File` whose title has
/// one of `extensions`.
fn file_content_change<'a>(
    entry: &'a DiffEntry,
    extensions: &[&str],
) -> Option<(&'a str, &'a str)> {
    let change = entry.attr_change()?;
    if entry.type_name() != "File" || change.path.rendered() != ["parameters", "content"] {
        return None;
    }
    if !extensions.iter().any(|ext| entry.title().ends_with(ext)) {
        return None;
    }
    match (change.old.as_ref()?, change.new.as_ref()?) {
        (Value::String(old), Value::String(new)) => Some((old.as_str(), new.as_str())),
        _ => None,
    }
}
