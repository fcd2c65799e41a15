//! Immutable rule set applied to a diff-entry list.

use crate::core_types::schema::{EVENT_SUPPRESSED, OP_IGNORE_MATCH};
use crate::diff::model::DiffEntry;
use crate::errors::ExError;
use crate::ignore::rule::{IgnoreRule, RuleDeclaration};
use crate::{log_op_end, log_op_start};
use std::time::Instant;

/// An accumulated, immutable set of ignore rules (OR across rules).
///
/// Adding a rule consumes the set and returns a new one, so a set can be
/// shared across concurrent runs without hidden mutation.
#[derive(Debug, Clone, Default)]
pub struct IgnoreRuleSet {
    rules: Vec<IgnoreRule>,
}

impl IgnoreRuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rule(mut self, rule: IgnoreRule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn with_rules<I>(mut self, rules: I) -> Self
    where
        I: IntoIterator<Item = IgnoreRule>,
    {
        self.rules.extend(rules);
        self
    }

    /// Compile declarations. Nothing is added if any declaration fails.
    ///
    /// # Errors
    ///
    /// - `InvalidRule` — a declaration has an invalid shape
    /// - `PatternError` — a regex does not compile
    pub fn from_declarations(declarations: &[RuleDeclaration]) -> Result<Self, ExError> {
        let rules = declarations
            .iter()
            .map(|d| d.compile().map_err(|e| ExError::from(e).with_op("compile_rules")))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { rules })
    }

    /// Compile command-line shorthand rules.
    ///
    /// # Errors
    ///
    /// Same as [`IgnoreRuleSet::from_declarations`].
    pub fn from_shorthand<S: AsRef<str>>(texts: &[S]) -> Result<Self, ExError> {
        let rules = texts
            .iter()
            .map(|t| {
                IgnoreRule::parse_shorthand(t.as_ref())
                    .map_err(|e| ExError::from(e).with_op("compile_rules"))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { rules })
    }

    pub fn rules(&self) -> &[IgnoreRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// First rule matching the entry, if any.
    pub fn matching_rule(&self, entry: &DiffEntry) -> Option<&IgnoreRule> {
        self.rules.iter().find(|rule| rule.matches(entry))
    }

    /// Remove every entry matched by at least one rule.
    pub fn apply(&self, entries: Vec<DiffEntry>) -> Vec<DiffEntry> {
        self.partition(entries).0
    }

    /// Split entries into `(kept, suppressed)`, logging one audit event per
    /// suppressed entry. Relative order is preserved on both sides.
    pub fn partition(&self, entries: Vec<DiffEntry>) -> (Vec<DiffEntry>, Vec<DiffEntry>) {
        let started = Instant::now();
        log_op_start!(
            "apply_ignore_rules",
            rule_count = self.rules.len(),
            entry_count = entries.len()
        );

        let mut kept = Vec::with_capacity(entries.len());
        let mut suppressed = Vec::new();
        for entry in entries {
            match self.matching_rule(&entry) {
                Some(rule) => {
                    audit_suppression(rule, &entry);
                    suppressed.push(entry);
                }
                None => kept.push(entry),
            }
        }

        log_op_end!(
            "apply_ignore_rules",
            duration_ms = started.elapsed().as_millis() as u64,
            entry_count = kept.len(),
            suppressed_count = suppressed.len()
        );
        (kept, suppressed)
    }
}

/// Audit event for one entry removed by `rule`.
pub(crate) fn audit_suppression(rule: &IgnoreRule, entry: &DiffEntry) {
    tracing::info!(
        op = OP_IGNORE_MATCH,
        event = EVENT_SUPPRESSED,
        rule = %rule,
        rule_origin = %rule.origin(),
        resource_type = entry.type_name(),
        resource_title = entry.title(),
        path = %entry.path(),
        diff_type = entry.kind().symbol(),
    );
}
