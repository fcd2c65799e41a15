//! Display formatter.
//!
//! Renders a final entry list as plain text, ANSI-coloured text, or one of
//! two structured JSON documents. The format is resolved before rendering
//! starts, so an unsupported name never produces partial output.

pub mod json;
pub mod text;
pub mod unified;

use crate::diff::model::DiffEntry;
use crate::errors::{CatdiffError, ExError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    #[default]
    Text,
    ColorText,
    Json,
    LegacyJson,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Text => "text",
            OutputFormat::ColorText => "color_text",
            OutputFormat::Json => "json",
            OutputFormat::LegacyJson => "legacy_json",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = ExError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(OutputFormat::Text),
            "color_text" => Ok(OutputFormat::ColorText),
            "json" => Ok(OutputFormat::Json),
            "legacy_json" => Ok(OutputFormat::LegacyJson),
            other => Err(ExError::from(CatdiffError::UnknownFormat {
                name: other.to_string(),
            })
            .with_op("render")),
        }
    }
}

/// Rendering switches.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DisplayOptions {
    pub format: OutputFormat,
    /// Printed first in text formats; `header` field in JSON formats
    pub header: Option<String>,
    /// Show `file:line` provenance
    pub display_source_file_line: bool,
    /// Show the parameters of added resources
    pub display_detail_add: bool,
}

impl DisplayOptions {
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            ..Self::default()
        }
    }

    pub fn with_header(mut self, header: impl Into<String>) -> Self {
        self.header = Some(header.into());
        self
    }
}

/// Render entries in the selected format.
///
/// # Errors
///
/// - `Serialization` — a JSON document could not be encoded
pub fn render(entries: &[DiffEntry], options: &DisplayOptions) -> Result<String, ExError> {
    match options.format {
        OutputFormat::Text => Ok(text::render_text(entries, options, text::Painter::Plain)),
        OutputFormat::ColorText => Ok(text::render_text(entries, options, text::Painter::Ansi)),
        OutputFormat::Json => json::render_json(entries, options),
        OutputFormat::LegacyJson => json::render_legacy_json(entries, options),
    }
}
