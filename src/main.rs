//! tmplkit CLI entry point.
//!
//! Parses arguments, runs the selected subcommand, and converts any fatal
//! error into a user-friendly report before exiting non-zero.

use anyhow::Result;
use clap::Parser;
use tmplkit::cli::Cli;
use tmplkit::core::user_friendly_error;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up colored output for Windows
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    match cli.execute() {
        Ok(()) => Ok(()),
        Err(e) => {
            let error_ctx = user_friendly_error(e);
            error_ctx.display();
            std::process::exit(1);
        }
    }
}
