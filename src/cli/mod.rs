//! Command-line interface for tmplkit.
//!
//! Two subcommands cover the engine's operations:
//!
//! - `render`: render a template against a value mapping and write the
//!   result to an output file
//! - `vars`: list the variables a template references, one per line
//!
//! Global flags control verbosity; logging goes to stderr through
//! `tracing` with `RUST_LOG` taking precedence over the flag-derived
//! default.

mod render;
mod vars;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

pub use render::RenderCommand;
pub use vars::VarsCommand;

/// Top-level CLI for tmplkit.
#[derive(Parser)]
#[command(
    name = "tmplkit",
    about = "Render model-configuration templates from value mappings",
    version,
    long_about = "tmplkit substitutes caller-provided values into text templates, \
                  normalizing legacy placeholder dialects to {{ name }} form and \
                  enforcing a configurable missing-variable policy."
)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug output (equivalent to RUST_LOG=debug).
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Suppress everything except errors.
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a template to an output file.
    Render(RenderCommand),
    /// List the variables a template references.
    Vars(VarsCommand),
}

impl Cli {
    /// Install logging and dispatch to the selected subcommand.
    pub fn execute(self) -> Result<()> {
        self.init_logging();
        match self.command {
            Commands::Render(cmd) => cmd.execute(),
            Commands::Vars(cmd) => cmd.execute(),
        }
    }

    fn init_logging(&self) {
        let default_level = if self.verbose {
            "debug"
        } else if self.quiet {
            "error"
        } else {
            "info"
        };
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(default_level));

        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .init();
    }
}
