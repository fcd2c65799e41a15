//! Structural catalog differ.
//!
//! ## Entry point
//!
//! ```
//! use catdiff_core::catalog::Catalog;
//! use catdiff_core::diff::diff_catalogs;
//!
//! let old = Catalog::parse(r#"{"resources": []}"#);
//! let new = Catalog::parse(r#"{"resources": [{"type": "File", "title": "/a"}]}"#);
//! let entries = diff_catalogs(&old, &new).unwrap();
//! assert_eq!(entries.len(), 1);
//! ```
//!
//! ## Guarantees
//!
//! - **Determinism**: the same catalog pair always yields the same ordered list.
//! - **Idempotence**: a catalog diffed against itself yields no entries.
//! - **Aggregation**: several elementary edits beneath one attribute collapse
//!   into a single `NestedChange` carrying the attribute's full old and new
//!   values.
//! - **Suppression before aggregation**: [`diff_catalogs_with_rules`] drops an
//!   attribute when ignore rules match every one of its elementary edits.

pub mod engine;
pub mod lcs;
pub mod model;

pub use engine::{
    diff_catalogs, diff_catalogs_with_rules, diff_resource, diff_resource_with_rules, DiffOutcome,
};
pub use model::{AttrChange, AttrPath, DiffEntry, DiffKind, PathSegment};
