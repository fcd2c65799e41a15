//! Type and title matchers: literal, glob, or caller-supplied regex.

use crate::errors::CatdiffError;
use regex::{Regex, RegexBuilder};
use std::fmt;

#[derive(Debug, Clone)]
enum MatcherKind {
    Any,
    Literal(String),
    Glob { pattern: String, compiled: Regex },
    Regex(Regex),
}

/// Matches one identity component (a resource type or a title).
#[derive(Debug, Clone)]
pub struct Matcher {
    kind: MatcherKind,
    fold_case: bool,
}

impl Matcher {
    /// Matches everything.
    pub fn any() -> Self {
        Self {
            kind: MatcherKind::Any,
            fold_case: false,
        }
    }

    /// Literal or glob, chosen by the presence of `*`.
    ///
    /// `fold_case` makes the comparison case-insensitive (used for types).
    pub fn text(text: &str, fold_case: bool) -> Result<Self, CatdiffError> {
        let kind = if text == "*" {
            MatcherKind::Any
        } else if text.contains('*') {
            MatcherKind::Glob {
                pattern: text.to_string(),
                compiled: compile_glob(text, fold_case)?,
            }
        } else {
            MatcherKind::Literal(text.to_string())
        };
        Ok(Self { kind, fold_case })
    }

    /// Exact literal, never interpreted as a glob.
    pub fn literal(text: &str, fold_case: bool) -> Self {
        Self {
            kind: MatcherKind::Literal(text.to_string()),
            fold_case,
        }
    }

    /// Caller-supplied regular expression, used as written (unanchored
    /// unless the pattern anchors itself).
    pub fn regex(pattern: &str) -> Result<Self, CatdiffError> {
        let compiled = Regex::new(pattern).map_err(|e| CatdiffError::BadPattern {
            pattern: pattern.to_string(),
            rule: pattern.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self {
            kind: MatcherKind::Regex(compiled),
            fold_case: false,
        })
    }

    pub fn is_any(&self) -> bool {
        matches!(self.kind, MatcherKind::Any)
    }

    pub fn matches(&self, candidate: &str) -> bool {
        match &self.kind {
            MatcherKind::Any => true,
            MatcherKind::Literal(lit) if self.fold_case => {
                lit.to_lowercase() == candidate.to_lowercase()
            }
            MatcherKind::Literal(lit) => lit == candidate,
            MatcherKind::Glob { compiled, .. } => compiled.is_match(candidate),
            MatcherKind::Regex(re) => re.is_match(candidate),
        }
    }
}

impl fmt::Display for Matcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            MatcherKind::Any => write!(f, "*"),
            MatcherKind::Literal(lit) => write!(f, "{}", lit),
            MatcherKind::Glob { pattern, .. } => write!(f, "{}", pattern),
            MatcherKind::Regex(re) => write!(f, "/{}/", re.as_str()),
        }
    }
}

/// Anchored regex for a `*` glob. Each `*` matches zero or more characters;
/// everything else is literal.
fn compile_glob(glob: &str, fold_case: bool) -> Result<Regex, CatdiffError> {
    let body = glob
        .split('*')
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(".*");
    RegexBuilder::new(&format!("^{}$", body))
        .case_insensitive(fold_case)
        .dot_matches_new_line(true)
        .build()
        .map_err(|e| CatdiffError::BadPattern {
            pattern: glob.to_string(),
            rule: glob.to_string(),
            reason: e.to_string(),
        })
}
