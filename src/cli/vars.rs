//! The `vars` subcommand.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use crate::templating::Renderer;

/// List the variables a template references, one per line, in the order
/// they first appear.
#[derive(Args)]
pub struct VarsCommand {
    /// Path to the template file.
    #[arg(short, long)]
    template: PathBuf,

    /// Rewrite legacy placeholder dialects before scanning.
    #[arg(long)]
    normalize_markers: bool,
}

impl VarsCommand {
    /// Execute the scan and print the result to stdout.
    pub fn execute(self) -> Result<()> {
        let variables = Renderer::new()
            .with_marker_normalization(self.normalize_markers)
            .discover_variables(&self.template)?;

        for name in &variables {
            println!("{name}");
        }
        tracing::debug!(count = variables.len(), "variables discovered");
        Ok(())
    }
}
