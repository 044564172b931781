use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::commands::{init_command, list_command, run_command};

/// Check Terraform module directories with init, fmt -check and validate
#[derive(Parser, Debug)]
#[command(name = "tfcheck")]
#[command(version, about, long_about = None)]
#[command(after_help = "ENVIRONMENT:\n    RUST_LOG=debug    Enable debug logging")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run init, fmt -check and validate against the configured targets
    #[command(visible_alias = "r")]
    Run(RunArgs),
    /// List the configured targets
    #[command(visible_alias = "ls")]
    List {
        /// Path to the config file (defaults to the nearest .tfcheck.json)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Print targets as JSON
        #[arg(long)]
        json: bool,
    },
    /// Discover Terraform directories and write a .tfcheck.json
    Init {
        /// Directory to scan (defaults to the current directory)
        #[arg(long)]
        cwd: Option<PathBuf>,

        /// Overwrite an existing configuration
        #[arg(short, long)]
        force: bool,
    },
}

#[derive(Args, Debug, Clone, Default)]
pub struct RunArgs {
    /// Path to the config file (defaults to the nearest .tfcheck.json)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Number of targets to check in parallel
    #[arg(short, long)]
    pub jobs: Option<usize>,

    /// Kill any single terraform command after this many seconds
    #[arg(long, value_name = "SECS", value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout: Option<u64>,

    /// Only check targets with this directory or name (repeatable)
    #[arg(short = 't', long = "target", value_name = "DIR_OR_NAME")]
    pub targets: Vec<String>,

    /// Print the commands without executing them
    #[arg(short, long)]
    pub dry_run: bool,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,

    /// Pass -no-color to terraform
    #[arg(long)]
    pub no_color: bool,
}

impl Commands {
    /// Execute the command
    pub fn execute(self) -> Result<()> {
        match self {
            Commands::Run(args) => run_command(&args),
            Commands::List { config, json } => list_command(config.as_deref(), json),
            Commands::Init { cwd, force } => init_command(cwd.as_deref(), force),
        }
    }
}
