//! Ignore rule engine.
//!
//! A rule matches an entry when its type matcher, title matcher and every
//! attribute condition match. Separate rules are OR-ed; conditions within one
//! rule are AND-ed. Rules are parsed and compiled once, when the set is built.

pub mod condition;
pub mod engine;
pub mod matcher;
pub mod rule;

pub use condition::{AttrCondition, Direction, PathMatcher, ValueOperator};
pub use engine::IgnoreRuleSet;
pub use matcher::Matcher;
pub use rule::{AttrSpec, CatalogSide, IgnoreRule, MatcherSpec, RuleDeclaration, RuleOrigin};
