//! Binary for previewing fresh fixture identities.
//!
//! Prints a generated suffix or the freshened form of a JSON spec table.

mod cli;

use std::{fs, process::ExitCode};

use clap::Parser;
use fresh_fixtures::{FixtureRequest, SpecTable, Suffix, fresh_specs};

use crate::cli::{Cli, Command};

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Command::Suffix => println!("{}", Suffix::generate()),
        Command::Freshen {
            specs,
            suffix,
            names,
        } => {
            let table: SpecTable = serde_json::from_str(&fs::read_to_string(&specs)?)?;
            let suffix = suffix.map_or_else(Suffix::generate, Suffix::from);
            let requests: Vec<FixtureRequest> =
                names.iter().map(|name| FixtureRequest::from(name.as_str())).collect();
            let fresh: SpecTable = fresh_specs(&requests, &table, &suffix)?.into_iter().collect();
            tracing::debug!(%suffix, fixtures = fresh.len(), "freshened specs");
            println!("{}", serde_json::to_string_pretty(&fresh)?);
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    // Applications embedding the library should install their own subscriber.
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("fresh-fixtures: {e}");
            ExitCode::FAILURE
        }
    }
}
