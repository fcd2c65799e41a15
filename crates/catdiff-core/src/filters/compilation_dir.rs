use super::{DiffFilter, FilterOptions};
use crate::diff::model::DiffEntry;
use serde_json::Value;

/// Suppresses a change whose only difference is the old compilation
/// directory replaced by the new one.
#[derive(Debug, Clone, Copy, Default)]
pub struct CompilationDirFilter;

impl DiffFilter for CompilationDirFilter {
    fn name(&self) -> &'static str {
        "CompilationDir"
    }

    fn filtered(&self, entry: &DiffEntry, options: &FilterOptions) -> bool {
        let (Some(old_dir), Some(new_dir)) = (
            options.old_compilation_dir.as_deref(),
            options.new_compilation_dir.as_deref(),
        ) else {
            return false;
        };
        if old_dir.is_empty() || old_dir == new_dir {
            return false;
        }
        let DiffEntry::Changed(change) = entry else {
            return false;
        };
        match (&change.old, &change.new) {
            (Some(Value::String(old)), Some(Value::String(new))) => {
                old.contains(old_dir) && old.replace(old_dir, new_dir) == *new
            }
            _ => false,
        }
    }
}
