//! Tag expansion: blanket ignore rules for resources carrying ignore tags.

use crate::catalog::{Catalog, ResourceKey};
use crate::core_types::schema::OP_TAG_EXPAND;
use crate::ignore::{CatalogSide, IgnoreRule, RuleOrigin};
use std::collections::BTreeSet;

/// Synthesize one `Type[Title] *` rule per tagged resource in either catalog.
///
/// A resource tagged on both sides yields one rule per side, each attributed
/// to the catalog it was found in. Empty `tags` yields no rules.
pub fn expand<S: AsRef<str>>(tags: &[S], old: &Catalog, new: &Catalog) -> Vec<IgnoreRule> {
    let wanted: BTreeSet<&str> = tags.iter().map(AsRef::as_ref).collect();
    if wanted.is_empty() {
        return Vec::new();
    }

    let mut rules = Vec::new();
    for (side, catalog) in [(CatalogSide::Old, old), (CatalogSide::New, new)] {
        for resource in catalog.resources() {
            let Some(tag) = resource.tags().iter().find(|t| wanted.contains(t.as_str())) else {
                continue;
            };
            let key: ResourceKey = resource.key();
            tracing::info!(
                op = OP_TAG_EXPAND,
                resource_type = %key.type_name,
                resource_title = %key.title,
                tag = %tag,
                catalog_side = %side,
                "ignore tag found"
            );
            rules.push(IgnoreRule::for_resource(&key).with_origin(RuleOrigin::Tag {
                tag: tag.clone(),
                side,
            }));
        }
    }
    rules
}
