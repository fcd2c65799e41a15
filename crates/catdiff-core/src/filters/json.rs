use super::{file_content_change, DiffFilter, FilterOptions};
use crate::diff::model::DiffEntry;
use serde_json::Value;

/// Suppresses content changes to `.json` files that parse to the same
/// document (whitespace and key order only).
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonFilter;

impl DiffFilter for JsonFilter {
    fn name(&self) -> &'static str {
        "JSON"
    }

    fn filtered(&self, entry: &DiffEntry, _options: &FilterOptions) -> bool {
        let Some((old, new)) = file_content_change(entry, &[".json"]) else {
            return false;
        };
        match (
            serde_json::from_str::<Value>(old),
            serde_json::from_str::<Value>(new),
        ) {
            (Ok(a), Ok(b)) => a == b,
            _ => false,
        }
    }
}
