//! Preview command
//!
//! Usage: catdiff <OLD> <NEW> [--config <FILE>] [--format <FORMAT>] [--output <FILE>]

use catdiff_core::logging_facility::{self, Profile};
use catdiff_core::pipeline::{self, preview_catalogs};
use catdiff_core::{Catalog, OutputFormat, Settings};
use catdiff_core_types::RequestContext;
use clap::Args;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct PreviewArgs {
    /// Old catalog JSON file
    pub old: PathBuf,

    /// New catalog JSON file
    pub new: PathBuf,

    /// Settings file (TOML)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Output format: text, color_text, json, legacy_json
    #[arg(short, long)]
    pub format: Option<String>,

    /// Header line for the rendered output
    #[arg(long)]
    pub header: Option<String>,

    /// Ignore rule, `Type[Title]path::segments=>operand` (repeatable)
    #[arg(long = "ignore")]
    pub ignore: Vec<String>,

    /// Ignore every resource carrying this tag (repeatable)
    #[arg(long = "ignore-tag")]
    pub ignore_tags: Vec<String>,

    /// Enable a named filter (repeatable)
    #[arg(long = "filter")]
    pub filters: Vec<String>,

    /// Directory the old catalog was compiled in
    #[arg(long)]
    pub old_compilation_dir: Option<String>,

    /// Directory the new catalog was compiled in
    #[arg(long)]
    pub new_compilation_dir: Option<String>,

    /// Output file path (default: stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Show source file and line of each resource
    #[arg(long)]
    pub display_source: bool,

    /// Show parameters of added resources
    #[arg(long)]
    pub display_detail_add: bool,

    /// Log profile: development or production (default: no logging)
    #[arg(long)]
    pub log_profile: Option<String>,

    /// Label recorded with the run's log events (e.g. a CI job name)
    #[arg(long)]
    pub label: Option<String>,
}

/// Result of a successful run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    NoChanges,
    Changes,
}

/// Execute the preview command
pub fn execute(args: PreviewArgs) -> Result<Outcome, Box<dyn std::error::Error>> {
    if let Some(profile) = &args.log_profile {
        logging_facility::init(profile.parse::<Profile>()?);
    }

    let settings = merge_settings(&args)?;
    let display = settings.display_options()?;

    let old = Catalog::parse(&std::fs::read_to_string(&args.old)?);
    let new = Catalog::parse(&std::fs::read_to_string(&args.new)?);

    let mut ctx = RequestContext::new();
    if let Some(label) = &args.label {
        ctx = ctx.with_label(label.clone());
    }
    tracing::debug!(
        request_id = %ctx.request_id,
        old = %args.old.display(),
        new = %args.new.display(),
        "catalogs loaded"
    );

    let report = preview_catalogs(&old, &new, &settings, &ctx)?;
    let rendered = pipeline::render(&report, &display)?;

    if let Some(output_path) = &args.output {
        std::fs::write(output_path, rendered)?;
    } else {
        print!("{}", rendered);
    }

    Ok(if report.has_changes() {
        Outcome::Changes
    } else {
        Outcome::NoChanges
    })
}

/// Settings file, overridden and extended by command-line flags.
fn merge_settings(args: &PreviewArgs) -> Result<Settings, Box<dyn std::error::Error>> {
    let mut settings = match &args.config {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };

    settings.ignore_rules.extend(args.ignore.iter().cloned());
    settings.ignore_tags.extend(args.ignore_tags.iter().cloned());
    settings.filters.extend(args.filters.iter().cloned());

    if let Some(format) = &args.format {
        // rejected before any catalog is read
        format.parse::<OutputFormat>()?;
        settings.display.format = Some(format.clone());
    }
    if let Some(header) = &args.header {
        settings.display.header = Some(header.clone());
    }
    if args.display_source {
        settings.display.display_source_file_line = true;
    }
    if args.display_detail_add {
        settings.display.display_detail_add = true;
    }
    if let Some(dir) = &args.old_compilation_dir {
        settings.filter_options.old_compilation_dir = Some(dir.clone());
    }
    if let Some(dir) = &args.new_compilation_dir {
        settings.filter_options.new_compilation_dir = Some(dir.clone());
    }
    Ok(settings)
}
