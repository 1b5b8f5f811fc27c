//! rolescope CLI — the main entry point.
//!
//! Commands:
//! - `normalize` — Canonical form of a condition tree
//! - `id`        — Content id of the canonical tree
//! - `address`   — CREATE2 address the canonical tree deploys to
//! - `check`     — Construction and integrity check
//! - `subtract`  — Remove a fragment from a condition
//! - `merge`     — Merge alternative conditions into one
//! - `diff`      — Whether a new condition needs an on-chain write
//! - `config`    — Show the effective configuration

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "rolescope",
    about = "rolescope — canonical permission conditions",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file (defaults to ~/.rolescope/config.toml)
    #[arg(short, long, global = true, env = "ROLESCOPE_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the canonical form of a condition tree
    Normalize {
        /// Condition JSON file, `-` for stdin
        file: PathBuf,

        /// Skip the OR push-down stage
        #[arg(long)]
        no_push_down: bool,
    },

    /// Print the content id of the normalized tree
    Id {
        /// Condition JSON file, `-` for stdin
        file: PathBuf,
    },

    /// Print the packed size, id, and CREATE2 address of the normalized tree
    Address {
        /// Condition JSON file, `-` for stdin
        file: PathBuf,
    },

    /// Validate construction and operator/type integrity
    Check {
        /// Condition JSON file, `-` for stdin
        file: PathBuf,
    },

    /// Remove a fragment from a condition
    Subtract {
        /// Condition JSON file
        condition: PathBuf,

        /// Fragment JSON file
        fragment: PathBuf,
    },

    /// Merge alternative conditions into one canonical condition
    Merge {
        /// Condition JSON files
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Compare two conditions by canonical form
    Diff {
        /// Currently deployed condition
        prev: PathBuf,

        /// Proposed condition
        next: PathBuf,
    },

    /// Show the effective configuration
    Config,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = commands::load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Normalize { file, no_push_down } => {
            commands::normalize::run(&config, &file, no_push_down)?
        }
        Commands::Id { file } => commands::inspect::id(&config, &file)?,
        Commands::Address { file } => commands::inspect::address(&config, &file)?,
        Commands::Check { file } => commands::check::run(&file)?,
        Commands::Subtract {
            condition,
            fragment,
        } => commands::subtract::run(&config, &condition, &fragment)?,
        Commands::Merge { files } => commands::merge::run(&config, &files)?,
        Commands::Diff { prev, next } => commands::diff::run(&config, &prev, &next)?,
        Commands::Config => commands::config_cmd::show(&config, cli.config.as_deref()),
    }

    Ok(())
}
