//! solforge command line front end.
//!
//! Loads a project declaration, resolves it for one network and hands the
//! result to whoever invoked it.

mod commands;
mod logging;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "solforge")]
#[command(about = "Resolve build and deploy configuration for smart-contract projects")]
struct Cli {
    /// Project declaration (TOML or JSON)
    #[arg(short, long, global = true, default_value = "solforge.toml")]
    config: PathBuf,

    /// Log filter, e.g. `info` or `solforge_config=debug`
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve one network and print the result
    Resolve {
        /// Network to resolve; defaults to the declared default network
        #[arg(short, long)]
        network: Option<String>,

        /// Secrets file; defaults to secrets.json next to the declaration
        #[arg(short, long)]
        secrets: Option<PathBuf>,
    },
    /// Resolve every declared network and report which ones fail
    Check {
        #[arg(short, long)]
        secrets: Option<PathBuf>,
    },
    /// List declared networks
    Networks,
    /// Show pipeline stages and whether they are enabled
    Stages,
    /// Write a declaration containing the built-in network presets
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init_logging(&cli.log_level);

    match cli.command {
        Commands::Resolve { network, secrets } => commands::resolve(&cli.config, network, secrets),
        Commands::Check { secrets } => commands::check(&cli.config, secrets),
        Commands::Networks => commands::networks(&cli.config),
        Commands::Stages => commands::stages(&cli.config),
        Commands::Init { force } => commands::init(&cli.config, force),
    }
}
