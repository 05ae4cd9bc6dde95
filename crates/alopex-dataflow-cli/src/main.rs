//! alopex-dataflow - run built-in dataflow pipelines over JSON-lines files.

use std::fs::File;
use std::io::{self, BufWriter};
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use alopex_dataflow_cli::cli::Cli;
use alopex_dataflow_cli::error::{report_error, CliError, Result};

fn main() -> ExitCode {
    let cli = Cli::parse();
    let verbose = cli.verbose;

    init_logging(cli.verbose, cli.quiet);

    match execute(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) if e.is_broken_pipe() => ExitCode::SUCCESS,
        Err(e) => {
            report_error(&e, verbose);
            ExitCode::from(1)
        }
    }
}

/// Initialize logging based on CLI options. Logs go to stderr so that stdout
/// carries only JSON lines.
fn init_logging(verbose: bool, quiet: bool) {
    if quiet {
        return;
    }

    let filter = if verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn execute(cli: &Cli) -> Result<()> {
    match &cli.output {
        Some(path) => {
            let file = File::create(path).map_err(CliError::Io)?;
            alopex_dataflow_cli::run(cli, BufWriter::new(file))?;
        }
        None => {
            let stdout = io::stdout();
            alopex_dataflow_cli::run(cli, BufWriter::new(stdout.lock()))?;
        }
    }
    Ok(())
}
