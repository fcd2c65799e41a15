//! Ignore rules and their declaration forms.

use crate::catalog::ResourceKey;
use crate::diff::model::{DiffEntry, LEGACY_SEPARATOR};
use crate::errors::CatdiffError;
use crate::ignore::condition::{find_operator, AttrCondition};
use crate::ignore::matcher::Matcher;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which input catalog a tag-derived rule came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CatalogSide {
    Old,
    New,
}

impl CatalogSide {
    pub fn as_str(&self) -> &'static str {
        match self {
            CatalogSide::Old => "old",
            CatalogSide::New => "new",
        }
    }
}

impl fmt::Display for CatalogSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} catalog", self.as_str())
    }
}

/// Where a rule came from, for the audit trail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleOrigin {
    /// Supplied by the caller (settings file or command line)
    Declared,
    /// Synthesised from a resource carrying an ignore tag
    Tag { tag: String, side: CatalogSide },
}

impl fmt::Display for RuleOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleOrigin::Declared => write!(f, "declared"),
            RuleOrigin::Tag { tag, side } => write!(f, "tag '{}' in {}", tag, side),
        }
    }
}

/// A compiled suppression rule.
///
/// Matches when the type matcher, the title matcher and every attribute
/// condition match the same entry. An empty condition list matches any path.
#[derive(Debug, Clone)]
pub struct IgnoreRule {
    type_matcher: Matcher,
    title_matcher: Matcher,
    conditions: Vec<AttrCondition>,
    origin: RuleOrigin,
}

impl IgnoreRule {
    pub fn new(type_matcher: Matcher, title_matcher: Matcher) -> Self {
        Self {
            type_matcher,
            title_matcher,
            conditions: Vec::new(),
            origin: RuleOrigin::Declared,
        }
    }

    /// Blanket rule for one exact resource, any path.
    pub fn for_resource(key: &ResourceKey) -> Self {
        Self::new(
            Matcher::literal(&key.type_name, true),
            Matcher::literal(&key.title, false),
        )
    }

    pub fn with_condition(mut self, condition: AttrCondition) -> Self {
        if !condition.is_any() {
            self.conditions.push(condition);
        }
        self
    }

    pub fn with_origin(mut self, origin: RuleOrigin) -> Self {
        self.origin = origin;
        self
    }

    pub fn origin(&self) -> &RuleOrigin {
        &self.origin
    }

    pub fn conditions(&self) -> &[AttrCondition] {
        &self.conditions
    }

    pub fn matches(&self, entry: &DiffEntry) -> bool {
        self.type_matcher.matches(entry.type_name())
            && self.title_matcher.matches(entry.title())
            && self.conditions.iter().all(|c| c.matches(entry))
    }

    /// Parse the command-line shorthand `Type[Title]path::segments=>operand`.
    ///
    /// The title runs to the last `]` before the first operator token, so
    /// titles may contain brackets. `::` in the path part becomes a segment
    /// separator; the operand is taken verbatim.
    ///
    /// # Errors
    ///
    /// - `MalformedRule` — no `Type[Title]` prefix, or a bad condition
    /// - `BadPattern` — a regex operand does not compile
    pub fn parse_shorthand(text: &str) -> Result<Self, CatdiffError> {
        let malformed = |reason: &str| CatdiffError::MalformedRule {
            rule: text.to_string(),
            reason: reason.to_string(),
        };

        let head_end = find_operator(text).map(|(at, _)| at).unwrap_or(text.len());
        let head = &text[..head_end];
        let open = head
            .find('[')
            .ok_or_else(|| malformed("expected `Type[Title]`"))?;
        let close = head
            .rfind(']')
            .filter(|close| *close > open)
            .ok_or_else(|| malformed("unterminated title"))?;

        let type_text = &head[..open];
        let title_text = &head[open + 1..close];
        if type_text.is_empty() {
            return Err(malformed("empty resource type"));
        }

        let path = head[close + 1..].replace("::", &LEGACY_SEPARATOR.to_string());
        let condition = format!("{}{}", path, &text[head_end..]);

        let rule = Self::new(
            Matcher::text(type_text, true).map_err(|e| e.within_rule(text))?,
            Matcher::text(title_text, false).map_err(|e| e.within_rule(text))?,
        );
        if condition.is_empty() {
            Ok(rule)
        } else {
            let condition = AttrCondition::parse(&condition).map_err(|e| e.within_rule(text))?;
            Ok(rule.with_condition(condition))
        }
    }
}

impl fmt::Display for IgnoreRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.type_matcher, self.title_matcher)?;
        if self.conditions.is_empty() {
            return write!(f, " *");
        }
        let rendered: Vec<String> = self.conditions.iter().map(ToString::to_string).collect();
        write!(f, " {}", rendered.join(" && "))
    }
}

/// Type or title as written in a declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MatcherSpec {
    /// Literal, or glob when it contains `*`
    Text(String),
    /// Regular expression, used unanchored
    Regex { regex: String },
}

impl MatcherSpec {
    fn compile(&self, fold_case: bool) -> Result<Matcher, CatdiffError> {
        match self {
            MatcherSpec::Text(text) => Matcher::text(text, fold_case),
            MatcherSpec::Regex { regex } => Matcher::regex(regex),
        }
    }
}

/// `attr` as written in a declaration: one condition, or several AND-ed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttrSpec {
    One(String),
    All(Vec<String>),
}

/// Serialized `{type, title, attr}` form, as read from settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleDeclaration {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub type_name: Option<MatcherSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<MatcherSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attr: Option<AttrSpec>,
}

impl RuleDeclaration {
    /// Validate and compile into a rule.
    ///
    /// # Errors
    ///
    /// - `MalformedRule` — empty `attr` list or unparsable condition
    /// - `BadPattern` — any regex fails to compile
    pub fn compile(&self) -> Result<IgnoreRule, CatdiffError> {
        let attributed = |e: CatdiffError| e.within_rule(&self.describe());
        let type_matcher = match &self.type_name {
            Some(spec) => spec.compile(true).map_err(attributed)?,
            None => Matcher::any(),
        };
        let title_matcher = match &self.title {
            Some(spec) => spec.compile(false).map_err(attributed)?,
            None => Matcher::any(),
        };

        let conditions: Vec<&String> = match &self.attr {
            None => Vec::new(),
            Some(AttrSpec::One(text)) => vec![text],
            Some(AttrSpec::All(texts)) if texts.is_empty() => {
                return Err(CatdiffError::MalformedRule {
                    rule: self.describe(),
                    reason: "`attr` list is empty".to_string(),
                })
            }
            Some(AttrSpec::All(texts)) => texts.iter().collect(),
        };

        conditions
            .into_iter()
            .try_fold(
                IgnoreRule::new(type_matcher, title_matcher),
                |rule, text| -> Result<IgnoreRule, CatdiffError> {
                    Ok(rule.with_condition(AttrCondition::parse(text).map_err(attributed)?))
                },
            )
    }

    fn describe(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Location, Resource};
    use crate::diff::model::{AttrChange, AttrPath};
    use serde_json::{json, Map, Value};

    fn change(type_name: &str, title: &str, path: &[&str], old: Value, new: Value) -> DiffEntry {
        DiffEntry::Changed(AttrChange {
            key: ResourceKey::new(type_name, title),
            path: AttrPath::from_keys(path.iter().copied()),
            old: Some(old),
            new: Some(new),
            old_location: Location::default(),
            new_location: Location::default(),
        })
    }

    #[test]
    fn test_declaration_defaults_match_everything() {
        let rule = RuleDeclaration::default().compile().unwrap();
        let e = change("File", "/a", &["parameters", "mode"], json!("1"), json!("2"));
        assert!(rule.matches(&e));
    }

    #[test]
    fn test_declaration_from_json_forms() {
        let decl: RuleDeclaration = serde_json::from_value(json!({
            "type": "exec",
            "title": {"regex": "^apt-get"},
            "attr": ["parameters\u{0c}timeout=>300", "parameters\u{0c}timeout=->300"]
        }))
        .unwrap();
        let rule = decl.compile().unwrap();
        assert_eq!(rule.conditions().len(), 2);
        let e = change("Exec", "apt-get update", &["parameters", "timeout"], json!(300), json!(600));
        assert!(rule.matches(&e));
        let e = change("Exec", "apt-get update", &["parameters", "timeout"], json!(600), json!(300));
        assert!(!rule.matches(&e), "second condition restricts to the old value");
    }

    #[test]
    fn test_declaration_rejects_unknown_fields() {
        let result: Result<RuleDeclaration, _> =
            serde_json::from_value(json!({"type": "File", "attribute": "x"}));
        assert!(result.is_err());
    }

    #[test]
    fn test_empty_attr_list_is_malformed() {
        let decl = RuleDeclaration {
            attr: Some(AttrSpec::All(Vec::new())),
            ..Default::default()
        };
        assert!(matches!(
            decl.compile(),
            Err(CatdiffError::MalformedRule { .. })
        ));
    }

    #[test]
    fn test_bad_regex_title_is_pattern_error() {
        let decl = RuleDeclaration {
            title: Some(MatcherSpec::Regex {
                regex: "(".to_string(),
            }),
            ..Default::default()
        };
        assert!(matches!(decl.compile(), Err(CatdiffError::BadPattern { .. })));
    }

    #[test]
    fn test_shorthand_with_path_and_operator() {
        let rule = IgnoreRule::parse_shorthand("File[/etc/motd]parameters::content=~>^#").unwrap();
        let e = change(
            "File",
            "/etc/motd",
            &["parameters", "content"],
            json!("# a\n"),
            json!("b\n"),
        );
        assert!(rule.matches(&e));
    }

    #[test]
    fn test_shorthand_operand_keeps_double_colons() {
        let rule = IgnoreRule::parse_shorthand("Exec[x]parameters::unless=>a::b").unwrap();
        let e = change("Exec", "x", &["parameters", "unless"], json!("a::b"), json!("c"));
        assert!(rule.matches(&e));
    }

    #[test]
    fn test_shorthand_title_with_brackets() {
        let rule = IgnoreRule::parse_shorthand("Exec[echo [x]]parameters::command").unwrap();
        let e = change("Exec", "echo [x]", &["parameters", "command"], json!("a"), json!("b"));
        assert!(rule.matches(&e));
    }

    #[test]
    fn test_shorthand_bare_resource_is_blanket() {
        let rule = IgnoreRule::parse_shorthand("Package[*]").unwrap();
        let removed = DiffEntry::ResourceRemoved {
            key: ResourceKey::new("Package", "nginx"),
            resource: Resource::new("Package", "nginx", Map::new()),
        };
        assert!(rule.matches(&removed));
        assert_eq!(rule.to_string(), "Package[*] *");
    }

    #[test]
    fn test_shorthand_requires_brackets() {
        assert!(IgnoreRule::parse_shorthand("File").is_err());
        assert!(IgnoreRule::parse_shorthand("[x]").is_err());
    }

    #[test]
    fn test_origin_display_names_side() {
        let origin = RuleOrigin::Tag {
            tag: "ignored".to_string(),
            side: CatalogSide::Old,
        };
        assert_eq!(origin.to_string(), "tag 'ignored' in old catalog");
    }
}
