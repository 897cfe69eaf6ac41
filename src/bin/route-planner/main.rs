//! route-planner: command line front end for the road network engine.
//!
//! Parses the node and edge tables, runs the requested query and prints a
//! plain-text (or JSON) report on stdout. Logging is initialized first so
//! load failures are reported row by row through `tracing`.

mod cli;
mod logging;
mod tables;

use std::io::{self, BufWriter, Write};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::error;

use cli::{Cli, run_cli};

fn try_main() -> Result<()> {
    let cli = Cli::parse();
    let stdout = io::stdout();
    let mut writer = BufWriter::new(stdout.lock());
    run_cli(cli, &mut writer).context("command failed")?;
    writer.flush().context("failed to flush output")?;
    Ok(())
}

fn main() -> ExitCode {
    if let Err(err) = logging::init_logging() {
        eprintln!("failed to initialize logging: {err}");
        return ExitCode::FAILURE;
    }

    if let Err(err) = try_main() {
        error!(error = format!("{err:#}"), "route-planner failed");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
