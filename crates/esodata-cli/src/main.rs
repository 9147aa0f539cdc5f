//! `esodata` binary entry point.
//!
//! Parses command-line arguments, initializes logging, builds the depot
//! configuration and runs one command against it.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "esodata",
    about = "Inspect and extract files from ESO client depots",
    version
)]
struct Cli {
    /// Logging level used when RUST_LOG is not set
    #[arg(short, long, value_enum, global = true, default_value = "warn")]
    log_level: LogLevel,

    /// JSON depot configuration
    #[arg(short, long, global = true, env = "ESODATA_CONFIG")]
    config: Option<PathBuf>,

    /// Depot root directory [default: ".", or the root in --config]
    #[arg(short, long, global = true, env = "ESODATA_ROOT")]
    root: Option<PathBuf>,

    /// Manifest to open, relative to the root; repeat to set the lookup order
    #[arg(short, long = "manifest", global = true)]
    manifests: Vec<PathBuf>,

    /// Name table key to load; repeat for several
    #[arg(short, long = "file-table", global = true, value_parser = commands::parse_key)]
    file_tables: Vec<u64>,

    /// Skip per-file signature verification
    #[arg(long, global = true)]
    no_verify: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    const fn as_filter(self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// List every archive entry as key and size
    List,

    /// List every named file from the loaded name tables
    Names,

    /// Write the contents of one file
    Extract {
        /// File id, decimal or 0x-prefixed hex
        #[arg(value_parser = commands::parse_key)]
        key: u64,

        /// Output path; standard output when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show the layers and cell grid of a world
    Toc {
        /// World id
        world: u32,
    },

    /// Show the depot build stamp and whether its version is supported
    Stamp,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(cli.log_level.as_filter())),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = commands::build_config(
        cli.config.as_deref(),
        cli.root.as_deref(),
        cli.manifests,
        cli.file_tables,
        cli.no_verify,
    )?;

    match cli.command {
        Commands::List => commands::list(config),
        Commands::Names => commands::names(config),
        Commands::Extract { key, output } => commands::extract(config, key, output.as_deref()),
        Commands::Toc { world } => commands::toc(config, world),
        Commands::Stamp => commands::stamp(&config),
    }
}
