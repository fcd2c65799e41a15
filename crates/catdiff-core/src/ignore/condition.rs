//! Attribute conditions.
//!
//! A condition string has three parts, all optional except that at least one
//! must be present:
//!
//! ```text
//! [+|-] path [operator operand]
//! ```
//!
//! Path segments are separated by form-feed (`\f`). `*` matches any path.
//! Operators are parsed once into [`ValueOperator`]; the earliest operator
//! token in the string ends the path.

use crate::diff::model::{DiffEntry, LEGACY_SEPARATOR};
use crate::errors::CatdiffError;
use regex::Regex;
use serde_json::Value;
use std::collections::BTreeSet;
use std::fmt;

/// Operator tokens, longest first where they share a prefix.
const OPERATOR_TOKENS: &[&str] = &["=s>=", "=&>", "=~>", "=+>", "=->", "=>"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Added,
    Removed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathMatcher {
    Any,
    Exact(Vec<String>),
}

#[derive(Debug, Clone)]
pub enum ValueOperator {
    /// `=>`: old or new rendered value equals the literal
    Equals(String),
    /// `=+>`: new rendered value equals the literal
    NewEquals(String),
    /// `=->`: old rendered value equals the literal
    OldEquals(String),
    /// `=~>`: some line of old or new matches
    AnyLineMatches(Regex),
    /// `=&>`: every line of old and new matches
    AllLinesMatch(Regex),
    /// `=s>=`: old and new are arrays with equal element sets
    SetEqual,
}

impl ValueOperator {
    fn token(&self) -> &'static str {
        match self {
            ValueOperator::Equals(_) => "=>",
            ValueOperator::NewEquals(_) => "=+>",
            ValueOperator::OldEquals(_) => "=->",
            ValueOperator::AnyLineMatches(_) => "=~>",
            ValueOperator::AllLinesMatch(_) => "=&>",
            ValueOperator::SetEqual => "=s>=",
        }
    }

    fn operand(&self) -> &str {
        match self {
            ValueOperator::Equals(s) | ValueOperator::NewEquals(s) | ValueOperator::OldEquals(s) => s,
            ValueOperator::AnyLineMatches(re) | ValueOperator::AllLinesMatch(re) => re.as_str(),
            ValueOperator::SetEqual => "",
        }
    }

    fn evaluate(&self, old: Option<&Value>, new: Option<&Value>) -> bool {
        match self {
            ValueOperator::Equals(lit) => {
                old.map(render).as_deref() == Some(lit.as_str())
                    || new.map(render).as_deref() == Some(lit.as_str())
            }
            ValueOperator::NewEquals(lit) => new.map(render).as_deref() == Some(lit.as_str()),
            ValueOperator::OldEquals(lit) => old.map(render).as_deref() == Some(lit.as_str()),
            ValueOperator::AnyLineMatches(re) => [old, new]
                .into_iter()
                .flatten()
                .any(|v| any_line_matches(re, &render(v))),
            ValueOperator::AllLinesMatch(re) => all_lines_match(re, old, new),
            ValueOperator::SetEqual => match (old, new) {
                (Some(Value::Array(a)), Some(Value::Array(b))) => element_set(a) == element_set(b),
                _ => false,
            },
        }
    }
}

/// String form of a value as compared by the value operators: strings as-is,
/// everything else as compact JSON.
pub fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn any_line_matches(re: &Regex, text: &str) -> bool {
    if text.contains('\n') {
        text.split_terminator('\n').any(|line| re.is_match(line))
    } else {
        re.is_match(text)
    }
}

fn all_lines_match(re: &Regex, old: Option<&Value>, new: Option<&Value>) -> bool {
    let old_text = old.map(render);
    let new_text = new.map(render);
    if let (Some(a), Some(b)) = (&old_text, &new_text) {
        if a.ends_with('\n') != b.ends_with('\n') {
            return false;
        }
    }
    let sides: Vec<&String> = [old_text.as_ref(), new_text.as_ref()]
        .into_iter()
        .flatten()
        .collect();
    !sides.is_empty()
        && sides
            .iter()
            .all(|text| text.split_terminator('\n').all(|line| re.is_match(line)))
}

fn element_set(items: &[Value]) -> BTreeSet<String> {
    items.iter().map(Value::to_string).collect()
}

/// One parsed attribute condition.
#[derive(Debug, Clone)]
pub struct AttrCondition {
    direction: Option<Direction>,
    path: PathMatcher,
    operator: Option<ValueOperator>,
}

impl AttrCondition {
    /// Matches any entry.
    pub fn any() -> Self {
        Self {
            direction: None,
            path: PathMatcher::Any,
            operator: None,
        }
    }

    /// Matches entries at exactly this path.
    pub fn path<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            direction: None,
            path: PathMatcher::Exact(segments.into_iter().map(Into::into).collect()),
            operator: None,
        }
    }

    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = Some(direction);
        self
    }

    pub fn with_operator(mut self, operator: ValueOperator) -> Self {
        self.operator = Some(operator);
        self
    }

    pub fn is_any(&self) -> bool {
        self.direction.is_none() && self.path == PathMatcher::Any && self.operator.is_none()
    }

    /// Parse a condition string.
    ///
    /// # Errors
    ///
    /// - `MalformedRule` — empty condition, or an operand after `=s>=`
    /// - `BadPattern` — the operand of `=~>` / `=&>` is not a valid regex
    pub fn parse(text: &str) -> Result<Self, CatdiffError> {
        let malformed = |reason: &str| CatdiffError::MalformedRule {
            rule: text.to_string(),
            reason: reason.to_string(),
        };

        let (direction, rest) = match text.chars().next() {
            Some('+') => (Some(Direction::Added), &text[1..]),
            Some('-') => (Some(Direction::Removed), &text[1..]),
            _ => (None, text),
        };

        let (path_text, operator) = match find_operator(rest) {
            Some((at, token)) => {
                let operand = &rest[at + token.len()..];
                (&rest[..at], Some(build_operator(token, operand, text)?))
            }
            None => (rest, None),
        };

        let path = if path_text == "*" {
            PathMatcher::Any
        } else if path_text.is_empty() {
            if direction.is_none() && operator.is_none() {
                return Err(malformed("empty attribute condition"));
            }
            PathMatcher::Any
        } else {
            PathMatcher::Exact(path_text.split(LEGACY_SEPARATOR).map(String::from).collect())
        };

        Ok(Self {
            direction,
            path,
            operator,
        })
    }

    pub fn matches(&self, entry: &DiffEntry) -> bool {
        let direction_ok = match self.direction {
            None => true,
            Some(Direction::Added) => entry.is_addition(),
            Some(Direction::Removed) => entry.is_removal(),
        };
        if !direction_ok {
            return false;
        }

        let path_ok = match &self.path {
            PathMatcher::Any => true,
            PathMatcher::Exact(segments) => entry.path().rendered() == *segments,
        };
        if !path_ok {
            return false;
        }

        match &self.operator {
            None => true,
            Some(op) => match entry.attr_change() {
                Some(change) => op.evaluate(change.old.as_ref(), change.new.as_ref()),
                None => false,
            },
        }
    }
}

impl fmt::Display for AttrCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.direction {
            Some(Direction::Added) => write!(f, "+")?,
            Some(Direction::Removed) => write!(f, "-")?,
            None => {}
        }
        match &self.path {
            PathMatcher::Any if self.direction.is_none() => write!(f, "*")?,
            PathMatcher::Any => {}
            PathMatcher::Exact(segments) => write!(f, "{}", segments.join("::"))?,
        }
        if let Some(op) = &self.operator {
            write!(f, "{}{}", op.token(), op.operand())?;
        }
        Ok(())
    }
}

pub(crate) fn find_operator(text: &str) -> Option<(usize, &'static str)> {
    text.char_indices()
        .filter(|(_, c)| *c == '=')
        .find_map(|(i, _)| {
            OPERATOR_TOKENS
                .iter()
                .find(|token| text[i..].starts_with(**token))
                .map(|token| (i, *token))
        })
}

fn build_operator(token: &str, operand: &str, rule: &str) -> Result<ValueOperator, CatdiffError> {
    let compile = |pattern: &str| {
        Regex::new(pattern).map_err(|e| CatdiffError::BadPattern {
            pattern: pattern.to_string(),
            rule: rule.to_string(),
            reason: e.to_string(),
        })
    };
    Ok(match token {
        "=>" => ValueOperator::Equals(operand.to_string()),
        "=+>" => ValueOperator::NewEquals(operand.to_string()),
        "=->" => ValueOperator::OldEquals(operand.to_string()),
        "=~>" => ValueOperator::AnyLineMatches(compile(operand)?),
        "=&>" => ValueOperator::AllLinesMatch(compile(operand)?),
        "=s>=" if operand.is_empty() => ValueOperator::SetEqual,
        "=s>=" => {
            return Err(CatdiffError::MalformedRule {
                rule: rule.to_string(),
                reason: "`=s>=` takes no operand".to_string(),
            })
        }
        other => {
            return Err(CatdiffError::MalformedRule {
                rule: rule.to_string(),
                reason: format!("unknown operator `{}`", other),
            })
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Location, ResourceKey};
    use crate::diff::model::{AttrChange, AttrPath};
    use serde_json::json;

    fn changed(path: &[&str], old: Option<Value>, new: Option<Value>) -> DiffEntry {
        let change = AttrChange {
            key: ResourceKey::new("File", "/etc/app.conf"),
            path: AttrPath::from_keys(path.iter().copied()),
            old: old.clone(),
            new: new.clone(),
            old_location: Location::default(),
            new_location: Location::default(),
        };
        if old.is_some() && new.is_some() {
            DiffEntry::Changed(change)
        } else {
            DiffEntry::NestedChange(change)
        }
    }

    #[test]
    fn test_parse_plain_path() {
        let c = AttrCondition::parse("parameters\u{0c}mode").unwrap();
        assert!(c.matches(&changed(&["parameters", "mode"], Some(json!("1")), Some(json!("2")))));
        assert!(!c.matches(&changed(&["parameters", "owner"], Some(json!("1")), Some(json!("2")))));
    }

    #[test]
    fn test_direction_prefix_never_matches_changed() {
        let plus = AttrCondition::parse("+parameters\u{0c}owner").unwrap();
        let minus = AttrCondition::parse("-parameters\u{0c}owner").unwrap();
        let both = changed(&["parameters", "owner"], Some(json!("a")), Some(json!("b")));
        assert!(!plus.matches(&both));
        assert!(!minus.matches(&both));
        assert!(plus.matches(&changed(&["parameters", "owner"], None, Some(json!("b")))));
        assert!(minus.matches(&changed(&["parameters", "owner"], Some(json!("a")), None)));
    }

    #[test]
    fn test_equals_operators() {
        let e = changed(&["parameters", "mode"], Some(json!("0644")), Some(json!(755)));
        assert!(AttrCondition::parse("parameters\u{0c}mode=>0644").unwrap().matches(&e));
        assert!(AttrCondition::parse("parameters\u{0c}mode=>755").unwrap().matches(&e));
        assert!(AttrCondition::parse("parameters\u{0c}mode=+>755").unwrap().matches(&e));
        assert!(!AttrCondition::parse("parameters\u{0c}mode=+>0644").unwrap().matches(&e));
        assert!(AttrCondition::parse("parameters\u{0c}mode=->0644").unwrap().matches(&e));
        assert!(!AttrCondition::parse("parameters\u{0c}mode=->755").unwrap().matches(&e));
    }

    #[test]
    fn test_any_line_regex() {
        let e = changed(
            &["parameters", "content"],
            Some(json!("a\nkeep\n")),
            Some(json!("a\nb\n")),
        );
        assert!(AttrCondition::parse("parameters\u{0c}content=~>^keep$").unwrap().matches(&e));
        assert!(!AttrCondition::parse("parameters\u{0c}content=~>^zzz$").unwrap().matches(&e));

        let single = changed(&["parameters", "content"], Some(json!("abc")), Some(json!("xyz")));
        assert!(AttrCondition::parse("parameters\u{0c}content=~>^x").unwrap().matches(&single));
    }

    #[test]
    fn test_all_lines_regex() {
        let e = changed(
            &["parameters", "content"],
            Some(json!("# one\n# two\n")),
            Some(json!("# three\n")),
        );
        let c = AttrCondition::parse("parameters\u{0c}content=&>^#").unwrap();
        assert!(c.matches(&e));

        let mixed = changed(
            &["parameters", "content"],
            Some(json!("# one\n")),
            Some(json!("# one\nreal\n")),
        );
        assert!(!c.matches(&mixed));
    }

    #[test]
    fn test_all_lines_requires_trailing_newline_agreement() {
        let e = changed(
            &["parameters", "content"],
            Some(json!("# one\n")),
            Some(json!("# one")),
        );
        assert!(!AttrCondition::parse("parameters\u{0c}content=&>^#").unwrap().matches(&e));
    }

    #[test]
    fn test_bad_pattern_fails_at_parse() {
        let err = AttrCondition::parse("parameters\u{0c}content=&>(oops").unwrap_err();
        assert!(matches!(err, CatdiffError::BadPattern { .. }));
        let err = AttrCondition::parse("parameters\u{0c}content=~>[").unwrap_err();
        assert!(matches!(err, CatdiffError::BadPattern { .. }));
    }

    #[test]
    fn test_set_equal() {
        let c = AttrCondition::parse("parameters\u{0c}groups=s>=").unwrap();
        let reordered = changed(
            &["parameters", "groups"],
            Some(json!(["a", "b", "b"])),
            Some(json!(["b", "a"])),
        );
        assert!(c.matches(&reordered));
        let different = changed(
            &["parameters", "groups"],
            Some(json!(["a"])),
            Some(json!(["a", "c"])),
        );
        assert!(!c.matches(&different));
        let not_array = changed(&["parameters", "groups"], Some(json!("a")), Some(json!(["a"])));
        assert!(!c.matches(&not_array));
        let added = changed(&["parameters", "groups"], None, Some(json!(["a"])));
        assert!(!c.matches(&added));
    }

    #[test]
    fn test_set_equal_rejects_operand() {
        assert!(matches!(
            AttrCondition::parse("parameters\u{0c}groups=s>=x"),
            Err(CatdiffError::MalformedRule { .. })
        ));
    }

    #[test]
    fn test_earliest_operator_wins() {
        let c = AttrCondition::parse("parameters\u{0c}cmd=>a=~>b").unwrap();
        let e = changed(&["parameters", "cmd"], Some(json!("a=~>b")), Some(json!("x")));
        assert!(c.matches(&e));
    }

    #[test]
    fn test_bare_direction_and_empty_condition() {
        let c = AttrCondition::parse("+").unwrap();
        assert!(c.matches(&changed(&["parameters", "x"], None, Some(json!(1)))));
        assert!(AttrCondition::parse("").is_err());
        assert!(AttrCondition::parse("*").unwrap().is_any());
    }

    #[test]
    fn test_display_round_trips_shape() {
        let c = AttrCondition::parse("-parameters\u{0c}mode=>0644").unwrap();
        assert_eq!(c.to_string(), "-parameters::mode=>0644");
    }
}
