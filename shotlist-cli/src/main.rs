// shotlist-cli/src/main.rs
//
// Entry point for the `shotlist` binary.
//
// Parses arguments, installs the logger, runs the selected command and maps
// any error to a message on stderr and exit code 1.

use clap::Parser;
use console::style;
use shotlist_cli::{Cli, CliResult, Commands, logging, run_detect, run_probe, run_profiles};
use std::process;

fn run(cli: Cli) -> CliResult<()> {
    logging::init(cli.verbose, cli.log_dir.as_deref())?;
    log::debug!("Parsed arguments: {:?}", cli.command);

    match cli.command {
        Commands::Detect(args) => run_detect(args),
        Commands::Profiles(args) => run_profiles(args),
        Commands::Probe(args) => run_probe(args),
    }
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        log::debug!("Command failed: {:?}", e);
        eprintln!("{} {}", style("Error:").red().bold().for_stderr(), e);
        process::exit(1);
    }
}
