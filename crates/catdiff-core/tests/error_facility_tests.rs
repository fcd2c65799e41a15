#![allow(clippy::unwrap_used, clippy::expect_used)]

use catdiff_core::errors::ExErrorKind;
use catdiff_core::ignore::{IgnoreRuleSet, RuleDeclaration};
use catdiff_core::{diff_catalogs, Catalog, OutputFormat, Settings};

const VALID: &str = r#"{"resources": [{"type": "File", "title": "/a"}]}"#;

#[test]
fn test_malformed_json_is_captured_not_raised() {
    let catalog = Catalog::parse("{\"resources\": [");
    assert!(!catalog.is_valid());
    assert!(catalog.is_empty());
    assert!(catalog.error_message().unwrap().contains("not valid JSON"));
}

#[test]
fn test_missing_resources_array() {
    let catalog = Catalog::parse(r#"{"name": "host"}"#);
    assert!(!catalog.is_valid());
    assert!(catalog.error_message().unwrap().contains("resources"));
}

#[test]
fn test_duplicate_resource_invalidates_catalog() {
    let catalog = Catalog::parse(
        r#"{"resources": [{"type": "File", "title": "/a"}, {"type": "file", "title": "/a"}]}"#,
    );
    assert!(!catalog.is_valid());
    assert!(catalog.error_message().unwrap().contains("File[/a]"));
}

#[test]
fn test_differ_rejects_invalid_catalog() {
    let good = Catalog::parse(VALID);
    let bad = Catalog::parse("nope");

    let err = diff_catalogs(&good, &bad).unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::DifferInput);
    assert_eq!(err.code(), "ERR_DIFFER_INPUT");
    assert_eq!(err.catalog(), Some("new"));
    assert_eq!(err.op(), Some("diff_catalogs"));
}

#[test]
fn test_rule_errors_name_the_rule() {
    let err = IgnoreRuleSet::from_shorthand(&["File"]).unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::InvalidRule);
    assert_eq!(err.rule(), Some("File"));

    let err = IgnoreRuleSet::from_shorthand(&["File[/a]parameters::content=~>(x"]).unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::PatternError);
    assert_eq!(err.rule(), Some("File[/a]parameters::content=~>(x"));
    assert!(err.message().contains("`(x`"));
}

#[test]
fn test_pattern_errors_in_declarations_name_the_declaration() {
    // GIVEN a declared rule whose second condition has a broken regex
    let decl: RuleDeclaration = serde_json::from_value(serde_json::json!({
        "type": "Exec",
        "attr": ["parameters\u{0c}timeout=>300", "parameters\u{0c}command=&>[a-"]
    }))
    .unwrap();

    // WHEN the declaration is compiled
    let err = IgnoreRuleSet::from_declarations(&[decl]).unwrap_err();

    // THEN the error is attributed to the whole declaration, not just the operand
    assert_eq!(err.kind(), ExErrorKind::PatternError);
    let rule = err.rule().unwrap();
    assert!(rule.contains("Exec"), "rule was {}", rule);
    assert!(rule.contains("=&>[a-"), "rule was {}", rule);
}

#[test]
fn test_settings_and_format_errors() {
    let err = Settings::from_toml_str("filters = 7").unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::InvalidSettings);

    let err = "xml".parse::<OutputFormat>().unwrap_err();
    assert_eq!(err.code(), "ERR_UNSUPPORTED_FORMAT");
}
