//! catdiff Core - catalog diff-and-suppression engine
//!
//! This crate compares two compiled configuration catalogs and reports which
//! resources would be added, removed, or altered, including:
//! - Catalog parsing with schema variants, composite titles and redaction
//! - A deterministic structural differ with per-attribute aggregation
//! - An ignore-rule language (globs, regexes, value operators, AND/OR)
//! - Tag-derived suppression and a pluggable filter pipeline
//! - Text, coloured text and JSON rendering with unified line diffs

pub mod catalog;
pub mod diff;
pub mod display;
pub mod errors;
pub mod filters;
pub mod ignore;
pub mod logging_facility;
pub mod pipeline;
pub mod settings;
pub mod tags;

pub use catdiff_core_types as core_types;

// Re-export commonly used types
pub use catalog::{Catalog, Resource, ResourceKey};
pub use diff::{diff_catalogs, AttrPath, DiffEntry, DiffKind};
pub use display::{render, DisplayOptions, OutputFormat};
pub use errors::{CatdiffError, ExError, ExErrorKind, Result};
pub use filters::{apply_filters, DiffFilter, FilterOptions, FilterPipeline};
pub use ignore::{IgnoreRule, IgnoreRuleSet, RuleDeclaration};
pub use pipeline::{preview, DiffReport};
pub use settings::Settings;
