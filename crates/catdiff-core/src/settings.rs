//! Run settings, read from TOML.
//!
//! ```toml
//! ignore_tags = ["ignored_catalog_diff"]
//! filters = ["JSON"]
//! ignore_rules = ["File[/tmp/*]+"]
//!
//! [[ignore]]
//! type = "Exec"
//! title = { regex = "^apt-get" }
//! attr = "parameters\fcommand"
//!
//! [display]
//! format = "json"
//! ```

use crate::display::{DisplayOptions, OutputFormat};
use crate::errors::{CatdiffError, ExError};
use crate::filters::{FilterOptions, FilterPipeline};
use crate::ignore::{IgnoreRuleSet, RuleDeclaration};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    /// Resources carrying any of these tags are ignored entirely
    #[serde(default)]
    pub ignore_tags: Vec<String>,

    /// Filter names, resolved against the built-in registry
    #[serde(default)]
    pub filters: Vec<String>,

    /// `{type, title, attr}` rule declarations
    #[serde(default)]
    pub ignore: Vec<RuleDeclaration>,

    /// Rules in `Type[Title]path::segments=>operand` shorthand
    #[serde(default)]
    pub ignore_rules: Vec<String>,

    #[serde(default)]
    pub display: DisplaySettings,

    #[serde(default)]
    pub filter_options: FilterOptions,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DisplaySettings {
    /// `text`, `color_text`, `json` or `legacy_json`; defaults to `text`
    #[serde(default)]
    pub format: Option<String>,
    #[serde(default)]
    pub header: Option<String>,
    #[serde(default)]
    pub display_source_file_line: bool,
    #[serde(default)]
    pub display_detail_add: bool,
}

impl Settings {
    /// Parse settings from TOML text.
    ///
    /// # Errors
    ///
    /// - `InvalidSettings` — not TOML, or an unknown or mistyped key
    pub fn from_toml_str(content: &str) -> Result<Self, ExError> {
        toml::from_str(content).map_err(|e| {
            ExError::from(CatdiffError::InvalidSettings {
                message: e.to_string(),
            })
            .with_op("load_settings")
        })
    }

    /// Read and parse a settings file.
    ///
    /// # Errors
    ///
    /// - `Io` — the file cannot be read
    /// - `InvalidSettings` — see [`Settings::from_toml_str`]
    pub fn load(path: &Path) -> Result<Self, ExError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ExError::from(CatdiffError::Io {
                message: format!("cannot read {}: {}", path.display(), e),
            })
            .with_op("load_settings")
        })?;
        Self::from_toml_str(&content)
    }

    /// Compile every declared and shorthand rule.
    ///
    /// # Errors
    ///
    /// - `InvalidRule` / `PatternError` — a rule does not compile
    pub fn rule_set(&self) -> Result<IgnoreRuleSet, ExError> {
        let declared = IgnoreRuleSet::from_declarations(&self.ignore)?;
        let shorthand = IgnoreRuleSet::from_shorthand(&self.ignore_rules)?;
        Ok(declared.with_rules(shorthand.rules().to_vec()))
    }

    /// Resolve the configured filters.
    ///
    /// # Errors
    ///
    /// - `UnknownFilter` — a name is not registered
    pub fn filter_pipeline(&self) -> Result<FilterPipeline, ExError> {
        FilterPipeline::from_names(&self.filters, self.filter_options.clone())
    }

    /// Resolve display options.
    ///
    /// # Errors
    ///
    /// - `UnsupportedFormat` — `display.format` is not a known format
    pub fn display_options(&self) -> Result<DisplayOptions, ExError> {
        let format = match &self.display.format {
            Some(name) => name.parse::<OutputFormat>()?,
            None => OutputFormat::default(),
        };
        Ok(DisplayOptions {
            format,
            header: self.display.header.clone(),
            display_source_file_line: self.display.display_source_file_line,
            display_detail_add: self.display.display_detail_add,
        })
    }
}
