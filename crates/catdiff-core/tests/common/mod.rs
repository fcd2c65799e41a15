use catdiff_core::Catalog;
use serde_json::{json, Value};

/// Build a valid catalog from a list of resource documents.
#[allow(dead_code)]
pub fn catalog(resources: Vec<Value>) -> Catalog {
    let catalog = Catalog::from_value(&json!({ "resources": resources }));
    assert!(catalog.is_valid(), "fixture catalog should parse");
    catalog
}

/// A `File` resource document with the given parameters.
#[allow(dead_code)]
pub fn file(title: &str, parameters: Value) -> Value {
    json!({ "type": "File", "title": title, "parameters": parameters })
}

/// A resource document carrying tags.
#[allow(dead_code)]
pub fn tagged(type_name: &str, title: &str, tags: &[&str], parameters: Value) -> Value {
    json!({ "type": type_name, "title": title, "tags": tags, "parameters": parameters })
}
