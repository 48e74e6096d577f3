//! The kvcheck command-line interface.
//!
//! Parses arguments, dispatches the subcommand, and turns harness errors
//! into rendered diagnostics with a non-zero exit. Assertion failures never
//! reach this layer: they stay in the tally and leave the exit code at zero.

use clap::Parser;
use std::process;

use crate::cli::args::{Command, KvcheckArgs};
use crate::discovery::{self, QueryScan};
use crate::errors::Result;
use crate::report::Reporter;
use crate::runner::Harness;

pub mod args;

/// The main entry point for the CLI.
pub fn run() {
    let args = KvcheckArgs::parse();
    let config = args.to_config();

    let result = match args.command {
        Command::Run => {
            let mut reporter = Reporter::new(config.color);
            Harness::new(config).run(&mut reporter)
        }
        Command::Fixtures => print_plan(&config),
    };

    if let Err(e) = result {
        eprintln!("{:?}", miette::Report::new(e));
        process::exit(1);
    }
}

/// Handles the `fixtures` subcommand: show what a run would do.
fn print_plan(config: &crate::config::HarnessConfig) -> Result<()> {
    let fixtures =
        discovery::discover_fixtures(&config.fixture_dir, config.filter.as_deref())?;
    if fixtures.is_empty() {
        println!("no fixtures under {}", config.fixture_dir.display());
        return Ok(());
    }
    for fixture in &fixtures {
        println!("{} ({})", fixture.key, fixture.format.format_arg());
        let cases = discovery::scan_query_cases(&config.fixture_dir, fixture);
        if cases.is_empty() {
            println!("  no queries");
            continue;
        }
        for scan in cases {
            match scan {
                QueryScan::Case(case) => {
                    println!("  query {}: {}", case.index, case.sql.trim());
                }
                QueryScan::MissingResult { index } => {
                    println!("  query {index}: missing result file");
                }
            }
        }
    }
    Ok(())
}
