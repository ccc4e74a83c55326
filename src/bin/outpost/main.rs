//! outpost CLI - detect and drive init systems and package managers

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::{Cli, Commands};

fn main() {
    match run() {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("error: {:#}", e);
            std::process::exit(1);
        }
    }
}

fn run() -> Result<i32> {
    // Parse CLI
    let cli = Cli::parse();

    // Set up logging
    let filter = if cli.verbose {
        EnvFilter::new("outpost=debug")
    } else {
        EnvFilter::new("outpost=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();

    let options = commands::GlobalOptions {
        verbose: cli.verbose,
        timeout: cli.timeout,
    };

    // Execute command
    match cli.command {
        Commands::Detect(args) => commands::detect::execute(args, &options),
        Commands::Service(args) => commands::service::execute(args, &options),
        Commands::Package(args) => commands::package::execute(args, &options),
        Commands::Completions(args) => commands::completions::execute(args).map(|()| 0),
    }
}
