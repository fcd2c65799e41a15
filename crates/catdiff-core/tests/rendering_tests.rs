#![allow(clippy::unwrap_used, clippy::expect_used)]

use catdiff_core::display::unified::NO_NEWLINE;
use catdiff_core::display::{render, DisplayOptions, OutputFormat};
use catdiff_core::{preview, Settings};
use serde_json::{json, Value};

fn doc(resources: Value) -> String {
    json!({ "resources": resources }).to_string()
}

fn sample() -> (String, String) {
    let old = doc(json!([
        {"type": "File", "title": "/etc/motd", "file": "site.pp", "line": 4,
         "parameters": {"content": "hello\nworld\n", "mode": "0444"}},
        {"type": "Package", "title": "apache", "parameters": {"ensure": "installed"}}
    ]));
    let new = doc(json!([
        {"type": "File", "title": "/etc/motd", "file": "site.pp", "line": 4,
         "parameters": {"content": "hello\nthere", "mode": "0755"}},
        {"type": "Package", "title": "nginx", "parameters": {"ensure": "latest"}}
    ]));
    (old, new)
}

#[test]
fn test_text_rendering_end_to_end() {
    let (old, new) = sample();
    let report = preview(&old, &new, &Settings::default()).unwrap();
    let options = DisplayOptions {
        header: Some("diff a/b".to_string()),
        display_source_file_line: true,
        ..Default::default()
    };
    let out = render(&report.entries, &options).unwrap();
    let expected = [
        "diff a/b",
        "  File[/etc/motd] =>",
        "   Defined at site.pp:4",
        "   parameters =>",
        "     content =>",
        "       @@ -1,2 +1,2 @@",
        "        hello",
        "       -world",
        "       +there",
        &format!("       {}", NO_NEWLINE),
        "     mode =>",
        "       - 0444",
        "       + 0755",
        "*******************************************",
        "- Package[apache]",
        "*******************************************",
        "+ Package[nginx]",
        "",
    ]
    .join("\n");
    assert_eq!(out, expected);
}

#[test]
fn test_json_rendering_end_to_end() {
    let (old, new) = sample();
    let report = preview(&old, &new, &Settings::default()).unwrap();
    let out = render(&report.entries, &DisplayOptions::new(OutputFormat::Json)).unwrap();
    let doc: Value = serde_json::from_str(&out).unwrap();
    let types: Vec<&str> = doc["diff"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["diff_type"].as_str().unwrap())
        .collect();
    assert_eq!(types, vec!["~", "~", "-", "+"]);
    assert_eq!(doc["diff"][0]["structure"], json!(["parameters", "content"]));
    assert_eq!(doc["diff"][0]["old_file"], json!("site.pp"));
    assert_eq!(doc["diff"][0]["new_line"], json!(4));
}

#[test]
fn test_renderings_are_stable() {
    let (old, new) = sample();
    let a = preview(&old, &new, &Settings::default()).unwrap();
    let b = preview(&old, &new, &Settings::default()).unwrap();
    for format in [OutputFormat::Text, OutputFormat::Json, OutputFormat::LegacyJson] {
        let options = DisplayOptions::new(format);
        assert_eq!(
            render(&a.entries, &options).unwrap(),
            render(&b.entries, &options).unwrap()
        );
    }
}

#[test]
fn test_color_text_uses_ansi_sequences() {
    let (old, new) = sample();
    let report = preview(&old, &new, &Settings::default()).unwrap();
    let out = render(&report.entries, &DisplayOptions::new(OutputFormat::ColorText)).unwrap();
    assert!(out.contains("\u{1b}["));
    assert!(out.contains("Package[nginx]"));
}

#[test]
fn test_color_text_does_not_leak_into_later_renders() {
    // GIVEN a coloured render of a diff
    let (old, new) = sample();
    let report = preview(&old, &new, &Settings::default()).unwrap();
    let coloured = render(&report.entries, &DisplayOptions::new(OutputFormat::ColorText)).unwrap();
    assert!(coloured.contains("\u{1b}["));

    // WHEN the same entries are rendered as plain text afterwards
    let plain = render(&report.entries, &DisplayOptions::new(OutputFormat::Text)).unwrap();

    // THEN the plain output carries no escape sequences
    assert!(!plain.contains("\u{1b}["), "plain output was {:?}", plain);
    assert_eq!(
        plain,
        render(&report.entries, &DisplayOptions::default()).unwrap()
    );
}

#[test]
fn test_sensitive_values_are_never_rendered() {
    let old = doc(json!([{"type": "User", "title": "app",
        "sensitive_parameters": ["password"], "parameters": {"password": "hunter2"}}]));
    let new = doc(json!([{"type": "User", "title": "app",
        "sensitive_parameters": ["password"], "parameters": {"password": "correct horse"}}]));
    let report = preview(&old, &new, &Settings::default()).unwrap();
    assert_eq!(report.entries.len(), 1);
    for format in [OutputFormat::Text, OutputFormat::Json] {
        let out = render(&report.entries, &DisplayOptions::new(format)).unwrap();
        assert!(!out.contains("hunter2"));
        assert!(!out.contains("correct horse"));
        assert!(out.contains("Sensitive [sha256 "));
    }
}
