//! Batch scanner for the GeoTIFF catalog.
//!
//! Walks a source of candidate rasters (local directory, the configured
//! object-store bucket, or a remote drive) and feeds each unprocessed
//! file through the shared ingestion pipeline. Per-file failures warn and
//! the scan continues; re-running naturally retries whatever is still
//! absent from the catalog.

mod local;
mod remote;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use ingestion::{IngestConfig, IngestOutcome, Ingester};
use storage::{ArtifactStore, Catalog};

#[derive(Parser, Debug)]
#[command(name = "scanner")]
#[command(about = "Batch GeoTIFF scanner for the catalog")]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Run catalog migrations before scanning
    #[arg(long)]
    migrate: bool,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Scan a local directory tree
    Local {
        /// Directory to walk
        dir: PathBuf,
    },
    /// Scan the configured object-store bucket
    Bucket {
        /// Key prefix to scan (defaults to the configured source prefix)
        #[arg(long)]
        prefix: Option<String>,
    },
    /// Scan a remote drive over HTTP
    Drive {
        /// Base URL of the drive API (expects GET {base}/files)
        base_url: String,
    },
}

/// Per-run tally, printed when the scan finishes.
#[derive(Debug, Default)]
pub struct ScanSummary {
    pub processed: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl ScanSummary {
    /// Fold one pipeline outcome into the tally.
    pub fn record(&mut self, outcome: &IngestOutcome) {
        match outcome {
            IngestOutcome::Done { .. } => self.processed += 1,
            IngestOutcome::Skipped => self.skipped += 1,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .json()
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    // Configuration is read once and handed down by reference
    let config = IngestConfig::from_env()?;

    let store = Arc::new(ArtifactStore::new(&config.store, config.op_timeout)?);
    let catalog = Catalog::connect(&config.database_url, config.op_timeout).await?;

    if args.migrate {
        info!("Running catalog migrations");
        catalog.migrate().await?;
    }

    let ingester = Ingester::new(store, catalog, config.classifier.clone()).await?;

    let summary = match args.command {
        Command::Local { dir } => {
            info!(dir = %dir.display(), "Scanning local directory");
            local::scan_directory(&ingester, &dir).await?
        }
        Command::Bucket { prefix } => {
            let prefix = prefix.unwrap_or_else(|| config.source_prefix.clone());
            info!(prefix = %prefix, "Scanning object-store bucket");
            remote::scan_bucket(&ingester, &prefix).await?
        }
        Command::Drive { base_url } => {
            info!(base_url = %base_url, "Scanning remote drive");
            remote::scan_drive(&ingester, &base_url).await?
        }
    };

    info!(
        processed = summary.processed,
        skipped = summary.skipped,
        failed = summary.failed,
        "Scan complete"
    );

    Ok(())
}
