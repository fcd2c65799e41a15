//! Catalog model.
//!
//! A [`Catalog`] is built once from a compiled catalog JSON document and is
//! read-only afterwards. Two document shapes are accepted:
//!
//! - current: `{"resources": [...]}`
//! - legacy: `{"data": {"resources": [...]}}`
//!
//! Parsing never raises. A malformed document yields an invalid catalog that
//! carries an error message and no resources; handing such a catalog to the
//! differ is what fails.

pub mod redact;
pub mod resource;

pub use resource::{canonical_type, Location, Resource, ResourceKey};

use crate::errors::CatdiffError;
use catdiff_core_types::Sensitive;
use serde_json::{Map, Value};
use std::collections::{BTreeSet, HashMap};
use std::sync::OnceLock;

/// Lookup index: `(lower-cased type, title) -> position in resources`.
type ResourceIndex = HashMap<(String, String), usize>;

#[derive(Debug)]
pub struct Catalog {
    resources: Vec<Resource>,
    error_message: Option<String>,
    index: OnceLock<ResourceIndex>,
}

impl Catalog {
    /// Parse a catalog from raw JSON text.
    pub fn parse(json: &str) -> Catalog {
        match serde_json::from_str::<Value>(json) {
            Ok(doc) => Catalog::from_value(&doc),
            Err(e) => Catalog::invalid(
                CatdiffError::MalformedJson {
                    message: e.to_string(),
                }
                .to_string(),
            ),
        }
    }

    /// Build a catalog from an already-parsed document.
    pub fn from_value(doc: &Value) -> Catalog {
        match parse_resources(doc) {
            Ok(resources) => Catalog::from_resources(resources),
            Err(e) => Catalog::invalid(e.to_string()),
        }
    }

    /// Build a valid catalog directly from resources.
    ///
    /// The caller is responsible for `(type, title)` uniqueness.
    pub fn from_resources(resources: Vec<Resource>) -> Catalog {
        Catalog {
            resources,
            error_message: None,
            index: OnceLock::new(),
        }
    }

    fn invalid(message: String) -> Catalog {
        tracing::warn!(
            component = module_path!(),
            op = "parse_catalog",
            error = %message,
            "catalog rejected"
        );
        Catalog {
            resources: Vec::new(),
            error_message: Some(message),
            index: OnceLock::new(),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.error_message.is_none()
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    pub fn resources(&self) -> &[Resource] {
        &self.resources
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    pub fn resource_keys(&self) -> BTreeSet<ResourceKey> {
        self.resources.iter().map(Resource::key).collect()
    }

    /// Look up a resource by type (any capitalisation) and title or alias.
    pub fn resource(&self, type_name: &str, title: &str) -> Option<&Resource> {
        let index = self.index.get_or_init(|| self.build_index());
        index
            .get(&(type_name.to_lowercase(), title.to_string()))
            .and_then(|&i| self.resources.get(i))
    }

    fn build_index(&self) -> ResourceIndex {
        let mut index = HashMap::with_capacity(self.resources.len());
        for (i, resource) in self.resources.iter().enumerate() {
            let type_key = resource.type_name().to_lowercase();
            index.insert((type_key.clone(), resource.title().to_string()), i);
            for alias in resource.aliases() {
                // A real title always wins over someone else's alias.
                index.entry((type_key.clone(), alias.to_string())).or_insert(i);
            }
        }
        index
    }
}

fn resources_array(doc: &Value) -> Result<&Vec<Value>, CatdiffError> {
    if let Some(items) = doc.get("resources").and_then(Value::as_array) {
        return Ok(items);
    }
    doc.get("data")
        .and_then(|d| d.get("resources"))
        .and_then(Value::as_array)
        .ok_or(CatdiffError::MissingResources)
}

fn parse_resources(doc: &Value) -> Result<Vec<Resource>, CatdiffError> {
    let items = resources_array(doc)?;
    let mut seen: BTreeSet<ResourceKey> = BTreeSet::new();
    let mut resources = Vec::with_capacity(items.len());

    for (index, item) in items.iter().enumerate() {
        let resource = parse_resource(index, item)?;
        if !seen.insert(resource.key()) {
            return Err(CatdiffError::DuplicateResource {
                resource: resource.key().to_string(),
            });
        }
        resources.push(resource);
    }
    Ok(resources)
}

fn parse_resource(index: usize, item: &Value) -> Result<Resource, CatdiffError> {
    let invalid = |reason: &str| CatdiffError::InvalidResource {
        index,
        reason: reason.to_string(),
    };

    let obj = item.as_object().ok_or_else(|| invalid("not an object"))?;
    let type_name = obj
        .get("type")
        .and_then(Value::as_str)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| invalid("missing string `type`"))?;
    let raw_title = obj
        .get("title")
        .and_then(Value::as_str)
        .ok_or_else(|| invalid("missing string `title`"))?;

    let mut parameters = match obj.get("parameters") {
        None | Some(Value::Null) => Map::new(),
        Some(Value::Object(map)) => map.clone(),
        Some(_) => return Err(invalid("`parameters` must be an object")),
    };

    let sensitive: Vec<&str> = obj
        .get("sensitive_parameters")
        .and_then(Value::as_array)
        .map(|names| names.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default();
    for name in sensitive {
        if let Some(value) = parameters.get_mut(name) {
            let redacted = redact::fingerprint(Sensitive::new(&*value));
            *value = redacted;
        }
    }

    let canonical = canonical_type(type_name);
    let title = restore_title(&canonical, raw_title, &parameters);

    let tags: Vec<String> = obj
        .get("tags")
        .and_then(Value::as_array)
        .map(|t| t.iter().filter_map(Value::as_str).map(String::from).collect())
        .unwrap_or_default();
    let exported = obj.get("exported").and_then(Value::as_bool).unwrap_or(false);
    let location = Location::new(
        obj.get("file").and_then(Value::as_str).map(String::from),
        obj.get("line").and_then(Value::as_u64),
    );

    Ok(Resource::new(&canonical, title, parameters)
        .with_tags(tags)
        .with_exported(exported)
        .with_location(location))
}

/// Undo composite-key titles.
///
/// Some compilers emit multi-key resources with a JSON-array title such as
/// `["root","ssh-rsa AAA"]`. The real title is the namevar parameter, or the
/// first key component when the namevar is not set.
fn restore_title(type_name: &str, raw_title: &str, parameters: &Map<String, Value>) -> String {
    let trimmed = raw_title.trim();
    if !(trimmed.starts_with('[') && trimmed.ends_with(']')) {
        return raw_title.to_string();
    }
    let Ok(Value::Array(parts)) = serde_json::from_str::<Value>(trimmed) else {
        return raw_title.to_string();
    };

    if let Some(Value::String(name)) = parameters.get(resource::namevar_for(type_name)) {
        return name.clone();
    }
    parts
        .iter()
        .find_map(Value::as_str)
        .map(String::from)
        .unwrap_or_else(|| raw_title.to_string())
}
