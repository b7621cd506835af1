//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::path::PathBuf;

use crate::filter::MatchMode;

/// Hide table-of-contents links that point at excluded sections of built docs
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Config file path (default: tocprune.toml, searched upward from cwd)
    #[arg(short = 'C', long, global = true, default_value = "tocprune.toml", value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// Enable verbose output for debugging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Hide excluded TOC links in built pages
    #[command(visible_alias = "a")]
    Apply {
        #[command(flatten)]
        filter_args: FilterArgs,

        /// Write processed pages to this directory instead of in place
        #[arg(short, long, value_hint = clap::ValueHint::DirPath)]
        output: Option<PathBuf>,
    },

    /// Report which TOC links would be hidden, without writing anything
    #[command(visible_alias = "c")]
    Check {
        #[command(flatten)]
        filter_args: FilterArgs,

        /// Print the report as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Apply once, then re-apply whenever pages change
    #[command(visible_alias = "w")]
    Watch {
        #[command(flatten)]
        filter_args: FilterArgs,
    },
}

/// Arguments shared by every subcommand
#[derive(clap::Args, Debug, Clone)]
pub struct FilterArgs {
    /// Pages or directories to process. If omitted, processes the whole input directory.
    /// Use `-` to read paths from stdin.
    #[arg(value_name = "PATH", value_hint = clap::ValueHint::AnyPath)]
    pub paths: Vec<PathBuf>,

    /// Built site directory (relative to project root)
    #[arg(short, long, value_hint = clap::ValueHint::DirPath)]
    pub input: Option<PathBuf>,

    /// Public site URL, used to resolve link targets like a browser would
    #[arg(short = 'U', long = "site-url", value_hint = clap::ValueHint::Url)]
    pub site_url: Option<String>,

    /// How excluded ids are matched against link URLs
    #[arg(short, long = "match", value_enum)]
    pub match_mode: Option<MatchMode>,
}

impl Cli {
    pub const fn filter_args(&self) -> &FilterArgs {
        match &self.command {
            Commands::Apply { filter_args, .. }
            | Commands::Check { filter_args, .. }
            | Commands::Watch { filter_args } => filter_args,
        }
    }
}
