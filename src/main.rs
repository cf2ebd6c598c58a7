mod cli;
mod clock;
mod commands;
mod config;
mod error;
mod model;
mod pdf;
mod pipeline;
mod tools;
mod util;

use anyhow::Result;
use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Commands};
use crate::error::ScanFailure;
use crate::model::RunStatus;
use crate::util::print_json_line;

fn main() {
    init_tracing();

    match run() {
        Ok(status) => print_json_line(&status),
        Err(err) => {
            error!(error = %err, "command failed");
            for cause in err.chain().skip(1) {
                error!(cause = %cause, "caused by");
            }
            print_json_line(&ScanFailure::from_error(err).to_status());
            std::process::exit(1);
        }
    }
}

fn run() -> Result<RunStatus> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Organize(args) => commands::organize::run(args),
        Commands::Scan(args) => commands::scan::run(args),
        Commands::Scanners(args) => commands::scanners::run(args),
        Commands::CheckTools => commands::scanners::check(),
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
