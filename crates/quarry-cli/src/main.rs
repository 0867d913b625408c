//! Quarry Command-Line Interface
//!
//! Imports flat circuits into composite bloqs and checks that they survive
//! the trip back.
//!
//! ```text
//! quarry import --input bell.json
//! quarry -vv roundtrip --input bell.json --config interop.json
//! ```

use clap::{Parser, Subcommand};
use console::style;
use tracing_subscriber::EnvFilter;

mod commands;

use commands::{import, roundtrip, version};

/// Quarry - structured quantum circuits and their flat counterparts
#[derive(Parser)]
#[command(name = "quarry")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Import a circuit and print the resulting composite bloq
    Import {
        /// Input circuit (JSON)
        #[arg(short, long)]
        input: String,

        /// Interop settings (JSON)
        #[arg(short, long)]
        config: Option<String>,
    },

    /// Import a circuit, export it again and compare the operations
    Roundtrip {
        /// Input circuit (JSON)
        #[arg(short, long)]
        input: String,

        /// Interop settings (JSON)
        #[arg(short, long)]
        config: Option<String>,
    },

    /// Show version information
    Version,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(false)
        .init();

    let result = match cli.command {
        Commands::Import { input, config } => import::execute(&input, config.as_deref()),
        Commands::Roundtrip { input, config } => roundtrip::execute(&input, config.as_deref()),
        Commands::Version => {
            version::execute();
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{} {:#}", style("Error:").red().bold(), e);
        std::process::exit(1);
    }

    Ok(())
}
