use super::{DiffFilter, FilterOptions};
use crate::diff::model::DiffEntry;
use serde_json::Value;

/// Suppresses a change between a scalar `x` and the one-element array `[x]`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SingleItemArrayFilter;

impl DiffFilter for SingleItemArrayFilter {
    fn name(&self) -> &'static str {
        "SingleItemArray"
    }

    fn filtered(&self, entry: &DiffEntry, _options: &FilterOptions) -> bool {
        let Some(change) = entry.attr_change() else {
            return false;
        };
        match (&change.old, &change.new) {
            (Some(a), Some(b)) => wraps(a, b) || wraps(b, a),
            _ => false,
        }
    }
}

fn wraps(scalar: &Value, array: &Value) -> bool {
    match array {
        Value::Array(items) if items.len() == 1 => {
            !scalar.is_array() && !scalar.is_object() && items[0] == *scalar
        }
        _ => false,
    }
}
