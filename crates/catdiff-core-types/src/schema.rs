//! Canonical schema constants for structured logging and events
//!
//! These constants keep audit events and error reports consistent.
//!
//! `tracing` macros take field names as literal identifiers, so emitting code
//! spells each key out; these constants are the names log consumers and
//! tests look fields up by.

// Canonical field keys for structured logging
pub const FIELD_COMPONENT: &str = "component";
pub const FIELD_OP: &str = "op";
pub const FIELD_EVENT: &str = "event";
pub const FIELD_DURATION_MS: &str = "duration_ms";
pub const FIELD_REQUEST_ID: &str = "request_id";

// Entry identity
pub const FIELD_RESOURCE_TYPE: &str = "resource_type";
pub const FIELD_RESOURCE_TITLE: &str = "resource_title";
pub const FIELD_PATH: &str = "path";
pub const FIELD_DIFF_TYPE: &str = "diff_type";

// Suppression audit
pub const FIELD_RULE: &str = "rule";
pub const FIELD_RULE_ORIGIN: &str = "rule_origin";
pub const FIELD_FILTER: &str = "filter";
pub const FIELD_CATALOG_SIDE: &str = "catalog_side";
pub const FIELD_TAG: &str = "tag";

// Collection sizes
pub const FIELD_ENTRY_COUNT: &str = "entry_count";
pub const FIELD_SUPPRESSED_COUNT: &str = "suppressed_count";

// Error fields
pub const FIELD_ERR_KIND: &str = "err.kind";
pub const FIELD_ERR_CODE: &str = "err.code";

// Canonical event names
pub const EVENT_START: &str = "start";
pub const EVENT_END: &str = "end";
pub const EVENT_END_ERROR: &str = "end_error";
pub const EVENT_SUPPRESSED: &str = "suppressed";

// Audit operations
pub const OP_IGNORE_MATCH: &str = "ignore_match";
pub const OP_FILTER_MATCH: &str = "filter_match";
pub const OP_TAG_EXPAND: &str = "tag_expand";
