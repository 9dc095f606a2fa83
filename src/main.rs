//! Main entry point for driftdoc CLI

use clap::Parser;
use driftdoc::cli::Cli;
use driftdoc::commands::execute_command;

fn main() {
    let cli = Cli::parse();

    // RUST_LOG can still narrow or widen individual modules
    env_logger::Builder::new()
        .filter_level(cli.log_level())
        .parse_default_env()
        .init();

    if let Err(e) = execute_command(cli.command, cli.config.as_deref()) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
