//! groundwork CLI - Conformance runner and in-memory service host
//!
//! Usage:
//!   groundwork check                   - Run every conformance suite against the memory adapters
//!   groundwork check -s cache -s orm   - Run selected suites
//!   groundwork serve                   - Host the memory backends until Ctrl-C
//!   groundwork config                  - Print the effective settings

use clap::{Parser, Subcommand};
use cli::commands::{CheckCommand, ConfigCommand, ServeCommand};
use shared::LogFormat;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "groundwork")]
#[command(about = "groundwork - Infrastructure contracts and their in-memory reference backends")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Settings file (YAML or JSON)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log level directive, overrides the settings file
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run conformance suites against the in-memory backends
    Check(CheckCommand),
    /// Host the in-memory backends
    Serve(ServeCommand),
    /// Print the effective settings
    Config(ConfigCommand),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Cli::parse();

    let mut settings = cli::load_settings(args.config.as_deref())?;
    if let Some(level) = args.log_level {
        settings.log.level = level;
    }
    if args.json {
        settings.log.format = LogFormat::Json;
    }
    logger::subscriber::init(&settings.log)?;

    match args.command {
        Commands::Check(cmd) => cmd.run(&settings).await,
        Commands::Serve(cmd) => cmd.run(&settings).await,
        Commands::Config(cmd) => cmd.run(&settings),
    }
}
