//! End-to-end preview: parse, diff, suppress, filter.
//!
//! All configuration (rules, filters) is compiled before the diff runs, and
//! any failure aborts the whole run; a partial entry list is never returned.

use crate::catalog::Catalog;
use crate::core_types::{RequestContext, RequestId};
use crate::diff::model::DiffEntry;
use crate::diff::diff_catalogs_with_rules;
use crate::display::{self, DisplayOptions};
use crate::errors::ExError;
use crate::settings::Settings;
use crate::tags;
use crate::{log_op_end, log_op_error, log_op_start};
use std::time::Instant;

/// Outcome of one preview run.
#[derive(Debug, Clone)]
pub struct DiffReport {
    pub request_id: RequestId,
    /// Entries that survived rules and filters, in diff order
    pub entries: Vec<DiffEntry>,
    pub suppressed_by_rules: Vec<DiffEntry>,
    pub suppressed_by_filters: Vec<DiffEntry>,
}

impl DiffReport {
    pub fn has_changes(&self) -> bool {
        !self.entries.is_empty()
    }
}

/// Preview the change between two catalog JSON documents.
///
/// # Errors
///
/// - `InvalidRule` / `PatternError` — a configured rule does not compile
/// - `UnknownFilter` — a configured filter is not registered
/// - `DifferInput` — either document is not a valid catalog
pub fn preview(old_json: &str, new_json: &str, settings: &Settings) -> Result<DiffReport, ExError> {
    let old = Catalog::parse(old_json);
    let new = Catalog::parse(new_json);
    preview_catalogs(&old, &new, settings, &RequestContext::new())
}

/// Preview over already-built catalogs under a caller-supplied context.
///
/// # Errors
///
/// See [`preview`].
pub fn preview_catalogs(
    old: &Catalog,
    new: &Catalog,
    settings: &Settings,
    ctx: &RequestContext,
) -> Result<DiffReport, ExError> {
    let started = Instant::now();
    log_op_start!(
        "preview",
        request_id = %ctx.request_id,
        label = ctx.label.as_deref().unwrap_or("")
    );

    match run(old, new, settings, &ctx.request_id) {
        Ok(report) => {
            log_op_end!(
                "preview",
                duration_ms = started.elapsed().as_millis() as u64,
                request_id = %ctx.request_id,
                entry_count = report.entries.len(),
                suppressed_by_rules = report.suppressed_by_rules.len(),
                suppressed_by_filters = report.suppressed_by_filters.len()
            );
            Ok(report)
        }
        Err(err) => {
            let err = err.with_request_id(ctx.request_id.clone());
            log_op_error!(
                "preview",
                err.clone(),
                duration_ms = started.elapsed().as_millis() as u64,
                request_id = %ctx.request_id
            );
            Err(err)
        }
    }
}

fn run(
    old: &Catalog,
    new: &Catalog,
    settings: &Settings,
    request_id: &RequestId,
) -> Result<DiffReport, ExError> {
    let declared = settings.rule_set()?;
    let filters = settings.filter_pipeline()?;

    let rules = declared.with_rules(tags::expand(&settings.ignore_tags, old, new));

    let raw = diff_catalogs_with_rules(old, new, &rules)?;
    let (after_rules, mut suppressed_by_rules) = rules.partition(raw.entries);
    suppressed_by_rules.splice(0..0, raw.suppressed);
    let (entries, suppressed_by_filters) = filters.partition(after_rules);

    Ok(DiffReport {
        request_id: request_id.clone(),
        entries,
        suppressed_by_rules,
        suppressed_by_filters,
    })
}

/// Render a report's surviving entries.
///
/// # Errors
///
/// - `Serialization` — a JSON document could not be encoded
pub fn render(report: &DiffReport, options: &DisplayOptions) -> Result<String, ExError> {
    display::render(&report.entries, options)
        .map_err(|e| e.with_request_id(report.request_id.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ExErrorKind;

    const OLD: &str = r#"{"resources": [
        {"type": "File", "title": "/etc/motd", "parameters": {"mode": "0444"}},
        {"type": "File", "title": "/tmp/scratch", "tags": ["ignored"], "parameters": {}}
    ]}"#;
    const NEW: &str = r#"{"resources": [
        {"type": "File", "title": "/etc/motd", "parameters": {"mode": "0755"}}
    ]}"#;

    #[test]
    fn test_preview_reports_and_suppresses() {
        let settings = Settings {
            ignore_tags: vec!["ignored".to_string()],
            ..Default::default()
        };
        let report = preview(OLD, NEW, &settings).unwrap();
        assert!(report.has_changes());
        assert_eq!(report.entries.len(), 1);
        assert_eq!(report.suppressed_by_rules.len(), 1);
        assert!(report.suppressed_by_filters.is_empty());
    }

    #[test]
    fn test_invalid_catalog_aborts() {
        let err = preview("{not json", NEW, &Settings::default()).unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::DifferInput);
        assert_eq!(err.catalog(), Some("old"));
        assert!(err.request_id().is_some());
    }

    #[test]
    fn test_bad_rule_fails_before_diff() {
        let settings = Settings {
            ignore_rules: vec!["File[/etc/motd]parameters::mode=~>(".to_string()],
            ..Default::default()
        };
        let err = preview(OLD, NEW, &settings).unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::PatternError);
    }

    #[test]
    fn test_unknown_filter_fails_fast() {
        let settings = Settings {
            filters: vec!["Nope".to_string()],
            ..Default::default()
        };
        let err = preview(OLD, NEW, &settings).unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::UnknownFilter);
    }

    #[test]
    fn test_identical_catalogs_have_no_changes() {
        let report = preview(NEW, NEW, &Settings::default()).unwrap();
        assert!(!report.has_changes());
        assert!(render(&report, &DisplayOptions::default()).unwrap().is_empty());
    }
}
