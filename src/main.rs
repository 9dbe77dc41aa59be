//! Tagcrawl main entry point
//!
//! This is the command-line interface for the tagcrawl collector.

use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use tagcrawl::config::{load_config_with_hash, Config};
use tracing_subscriber::EnvFilter;

/// Tagcrawl: an incremental tag-feed collector
///
/// Walks the paginated feed of a tag, merges collected items into a
/// persisted per-tag dataset with last-write-wins deduplication, and can
/// repeat the cycle on a fixed interval for continuous ingestion.
#[derive(Parser, Debug)]
#[command(name = "tagcrawl")]
#[command(version = "1.0.0")]
#[command(about = "An incremental tag-feed collector", long_about = None)]
struct Cli {
    /// Tag to collect, without the leading '#'
    #[arg(value_name = "TAG")]
    tag: String,

    /// Number of feed pages to walk per cycle
    #[arg(short, long, default_value_t = 1)]
    pages: u32,

    /// Seconds between repeated cycles; omit to run a single cycle
    #[arg(short, long, value_name = "SECS")]
    every: Option<u64>,

    /// Path to TOML configuration file (built-in defaults when omitted)
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load configuration, falling back to built-in defaults
    let config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            match load_config_with_hash(path) {
                Ok((config, hash)) => {
                    tracing::info!("Configuration loaded successfully (hash: {})", hash);
                    config
                }
                Err(e) => {
                    tracing::error!("Failed to load configuration: {}", e);
                    return Err(e.into());
                }
            }
        }
        None => Config::default(),
    };

    match cli.every {
        Some(secs) => tracing::info!(
            "Collecting #{} on {} page(s) every {}s; stop with ctrl-c",
            cli.tag,
            cli.pages,
            secs
        ),
        None => tracing::info!("Collecting #{} on {} page(s), single cycle", cli.tag, cli.pages),
    }

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for ctrl-c: {}", e);
        }
    };

    match tagcrawl::crawler::collect(
        &config,
        &cli.tag,
        cli.pages,
        cli.every.map(Duration::from_secs),
        shutdown,
    )
    .await
    {
        Ok(()) => {
            tracing::info!("Collection finished");
            Ok(())
        }
        Err(e) => {
            tracing::error!("Collection failed: {}", e);
            Err(e.into())
        }
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("tagcrawl=info,warn"),
            1 => EnvFilter::new("tagcrawl=debug,info"),
            2 => EnvFilter::new("tagcrawl=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}
