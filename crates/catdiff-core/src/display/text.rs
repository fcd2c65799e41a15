//! Text and coloured-text rendering.

use crate::catalog::{Location, Resource, ResourceKey};
use crate::diff::model::{AttrChange, DiffEntry};
use crate::display::unified::{unified_hunks, visible, HunkLine, CONTEXT_LINES};
use crate::display::DisplayOptions;
use colored::Color;
use serde_json::Value;
use std::collections::BTreeMap;

pub const SEPARATOR: &str = "*******************************************";

/// Whether styling is applied.
///
/// `Ansi` writes SGR sequences itself and never consults the process-wide
/// `colored` switch, so rendering leaves other terminal output alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Painter {
    Plain,
    Ansi,
}

impl Painter {
    fn paint(&self, colour: Color, s: &str) -> String {
        match self {
            Painter::Plain => s.to_string(),
            Painter::Ansi => format!("\x1b[{}m{}\x1b[0m", colour.to_fg_str(), s),
        }
    }

    fn added(&self, s: &str) -> String {
        self.paint(Color::Green, s)
    }

    fn removed(&self, s: &str) -> String {
        self.paint(Color::Red, s)
    }

    fn heading(&self, s: &str) -> String {
        self.paint(Color::Yellow, s)
    }

    fn hunk(&self, s: &str) -> String {
        self.paint(Color::Cyan, s)
    }
}

/// Render entries grouped by resource key.
pub fn render_text(entries: &[DiffEntry], options: &DisplayOptions, painter: Painter) -> String {
    let mut groups: BTreeMap<&ResourceKey, Vec<&DiffEntry>> = BTreeMap::new();
    for entry in entries {
        groups.entry(entry.key()).or_default().push(entry);
    }

    let mut lines: Vec<String> = Vec::new();
    if let Some(header) = &options.header {
        lines.push(header.clone());
    }

    for (n, (key, group)) in groups.into_iter().enumerate() {
        if n > 0 {
            lines.push(SEPARATOR.to_string());
        }
        let changes: Vec<&AttrChange> = group.iter().filter_map(|e| e.attr_change()).collect();
        for entry in &group {
            match entry {
                DiffEntry::ResourceAdded { resource, .. } => {
                    lines.push(painter.added(&format!("+ {}", key)));
                    push_location(&mut lines, options, "  ", resource.location());
                    if options.display_detail_add {
                        push_parameters(&mut lines, resource, painter);
                    }
                }
                DiffEntry::ResourceRemoved { resource, .. } => {
                    lines.push(painter.removed(&format!("- {}", key)));
                    push_location(&mut lines, options, "  ", resource.location());
                }
                _ => {}
            }
        }
        if let Some(first) = changes.first() {
            lines.push(painter.heading(&format!("  {} =>", key)));
            if first.old_location == first.new_location {
                push_location(&mut lines, options, "   ", &first.new_location);
            } else if options.display_source_file_line {
                push_side_location(&mut lines, "old", &first.old_location);
                push_side_location(&mut lines, "new", &first.new_location);
            }
            push_changes(&mut lines, &changes, painter);
        }
    }

    if lines.is_empty() {
        return String::new();
    }
    let mut out = lines.join("\n");
    out.push('\n');
    out
}

fn push_location(lines: &mut Vec<String>, options: &DisplayOptions, indent: &str, loc: &Location) {
    if options.display_source_file_line && loc.is_known() {
        lines.push(format!("{}Defined at {}", indent, loc));
    }
}

fn push_side_location(lines: &mut Vec<String>, side: &str, loc: &Location) {
    if loc.is_known() {
        lines.push(format!("   Defined at {} ({})", loc, side));
    }
}

fn push_parameters(lines: &mut Vec<String>, resource: &Resource, painter: Painter) {
    let mut names: Vec<&String> = resource.parameters().keys().collect();
    names.sort();
    for name in names {
        let Some(value) = resource.parameter(name) else {
            continue;
        };
        let rendered = render_value(value);
        let mut value_lines = rendered.lines();
        let first = value_lines.next().unwrap_or_default();
        lines.push(painter.added(&format!("    {} => {}", name, first)));
        for rest in value_lines {
            lines.push(painter.added(&format!("      {}", rest)));
        }
    }
}

/// Path segments shared with the previous change are printed once.
fn push_changes(lines: &mut Vec<String>, changes: &[&AttrChange], painter: Painter) {
    let mut previous: Vec<String> = Vec::new();
    for change in changes {
        let segments = change.path.rendered();
        let shared = previous
            .iter()
            .zip(&segments)
            .take_while(|(a, b)| a == b)
            .count()
            .min(segments.len().saturating_sub(1));
        for (depth, segment) in segments.iter().enumerate().skip(shared) {
            lines.push(format!("{}{} =>", indent(depth), segment));
        }
        let value_indent = indent(segments.len());
        for line in value_lines(change) {
            let styled = match line.chars().next() {
                Some('-') => painter.removed(&line),
                Some('+') => painter.added(&line),
                Some('@') => painter.hunk(&line),
                _ => line,
            };
            lines.push(format!("{}{}", value_indent, styled));
        }
        previous = segments;
    }
}

fn indent(depth: usize) -> String {
    " ".repeat(3 + depth * 2)
}

/// `- old` / `+ new` for single-line values, unified hunks otherwise.
fn value_lines(change: &AttrChange) -> Vec<String> {
    let old = change.old.as_ref().map(render_value);
    let new = change.new.as_ref().map(render_value);
    match (old, new) {
        (Some(o), Some(n)) if o.contains('\n') || n.contains('\n') => {
            unified_hunks(&o, &n, CONTEXT_LINES)
                .iter()
                .map(HunkLine::render)
                .collect()
        }
        (o, n) => {
            let mut out = Vec::new();
            if let Some(o) = o {
                out.extend(side_lines('-', &o));
            }
            if let Some(n) = n {
                out.extend(side_lines('+', &n));
            }
            out
        }
    }
}

fn side_lines(prefix: char, text: &str) -> Vec<String> {
    if text.is_empty() {
        return vec![format!("{} ", prefix)];
    }
    text.split_inclusive('\n')
        .map(|line| format!("{} {}", prefix, visible(line)))
        .collect()
}

/// Strings verbatim, everything else pretty-printed JSON.
fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => serde_json::to_string_pretty(other).unwrap_or_else(|_| other.to_string()),
    }
}
