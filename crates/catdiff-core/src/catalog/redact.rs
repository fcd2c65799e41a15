//! Sensitive parameter redaction

use catdiff_core_types::Sensitive;
use serde_json::Value;
use sha2::{Digest, Sha256};

/// Prefix of every redacted value.
pub const SENSITIVE_PREFIX: &str = "Sensitive [sha256 ";

/// Replace a sensitive value with its fixed-length fingerprint.
///
/// The digest covers the compact JSON form of the value, so equal secrets
/// still compare equal after redaction and unequal secrets still diff.
pub fn fingerprint(value: Sensitive<&Value>) -> Value {
    let canonical = serde_json::to_string(value.expose()).unwrap_or_default();
    let mut hasher = Sha256::new();
    hasher.update(canonical.as_bytes());
    Value::String(format!(
        "{}{}]",
        SENSITIVE_PREFIX,
        hex::encode(hasher.finalize())
    ))
}

pub fn is_redacted(value: &Value) -> bool {
    value
        .as_str()
        .map(|s| s.starts_with(SENSITIVE_PREFIX))
        .unwrap_or(false)
}
