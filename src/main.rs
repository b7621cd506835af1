//! tocprune - hide table-of-contents links that point at excluded sections.

mod cli;
mod config;
mod core;
mod dom;
mod filter;
mod logger;
mod page;
mod utils;

use anyhow::Result;
use clap::{ColorChoice, Parser};
use cli::{Cli, Commands};
use config::Config;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }
    logger::set_verbose(cli.verbose);

    let config = Config::load(&cli)?;

    match &cli.command {
        Commands::Apply { filter_args, .. } => {
            cli::apply::apply_pages(filter_args, &config).map(|_| ())
        }
        Commands::Check { filter_args, json } => {
            cli::check::check_pages(filter_args, *json, &config)
        }
        Commands::Watch { filter_args } => {
            core::setup_shutdown_handler()?;
            cli::watch::watch(filter_args, &config)
        }
    }
}
