//! Command line interface for the `fresh-fixtures` binary.
//!
//! Lets suite authors preview suffixes and freshened specs without running
//! a suite.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Command line arguments for the `fresh-fixtures` binary.
#[derive(Debug, Parser)]
#[command(name = "fresh-fixtures", version, about = "Preview fresh fixture identities")]
pub struct Cli {
    /// Operation to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands of the `fresh-fixtures` binary.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print a freshly generated suffix.
    Suffix,
    /// Freshen specs from a JSON spec table and print them as JSON.
    Freshen {
        /// JSON file mapping fixture names to their attributes.
        #[arg(short, long)]
        specs: PathBuf,
        /// Use this suffix instead of generating one.
        #[arg(long)]
        suffix: Option<String>,
        /// Fixtures to freshen.
        #[arg(required = true)]
        names: Vec<String>,
    },
}
