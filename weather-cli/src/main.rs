//! Binary crate for the `weather-query` command-line tool.
//!
//! This crate focuses on:
//! - Parsing CLI arguments
//! - The interactive query form and configuration editor
//! - Saving exported artifacts

use clap::Parser;

mod cli;
mod download;
mod form;
mod logging;

fn main() -> anyhow::Result<()> {
    let cmd = cli::Cli::parse();
    logging::init_logging(cmd.verbose, cmd.quiet);
    cmd.run()
}
