//! catdiff CLI
//!
//! Previews the difference between two compiled catalogs.
//!
//! Exit codes: 0 no differences, 2 differences found, 1 error.

use clap::Parser;

mod preview;

#[derive(Debug, Parser)]
#[command(name = "catdiff")]
#[command(about = "catdiff - Preview configuration catalog changes", long_about = None)]
struct Cli {
    #[command(flatten)]
    preview: preview::PreviewArgs,
}

fn main() {
    let cli = Cli::parse();

    match preview::execute(cli.preview) {
        Ok(preview::Outcome::NoChanges) => std::process::exit(0),
        Ok(preview::Outcome::Changes) => std::process::exit(2),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
