use super::{file_content_change, DiffFilter, FilterOptions};
use crate::diff::model::DiffEntry;

/// Suppresses content changes to `.yaml`/`.yml` files that parse to the same
/// document.
#[derive(Debug, Clone, Copy, Default)]
pub struct YamlFilter;

impl DiffFilter for YamlFilter {
    fn name(&self) -> &'static str {
        "YAML"
    }

    fn filtered(&self, entry: &DiffEntry, _options: &FilterOptions) -> bool {
        let Some((old, new)) = file_content_change(entry, &[".yaml", ".yml"]) else {
            return false;
        };
        match (
            serde_yaml::from_str::<serde_yaml::Value>(old),
            serde_yaml::from_str::<serde_yaml::Value>(new),
        ) {
            (Ok(a), Ok(b)) => a == b,
            _ => false,
        }
    }
}
