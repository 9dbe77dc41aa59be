//! Crawler module for tag-feed collection
//!
//! This module contains the core collection logic, including:
//! - HTTP page fetching with bounded timeouts
//! - Cursor-driven page walking with partial-result preservation
//! - Cycle scheduling with interval repeat and cancellable sleep

mod cycle;
mod fetcher;
mod walker;

pub use cycle::{CycleReport, CycleScheduler};
pub use fetcher::{build_http_client, FetchError, HttpPageFetcher, PageFetcher, TagPage};
pub use walker::{walk, TerminationReason, WalkOutcome};

use crate::config::Config;
use crate::{ConfigError, CrawlError};
use std::future::Future;
use std::path::Path;
use std::time::Duration;
use url::Url;

/// Runs a complete collection operation for one tag
///
/// This is the main entry point for collection. It builds the HTTP client
/// and fetcher from the configuration, loads (or initializes) the per-tag
/// dataset at `<data-dir>/<tag>.csv`, and runs cycles until the single
/// cycle completes or, in continuous mode, until the shutdown future
/// resolves.
pub async fn collect(
    config: &Config,
    tag: &str,
    pages_per_cycle: u32,
    repeat_interval: Option<Duration>,
    shutdown: impl Future<Output = ()>,
) -> Result<(), CrawlError> {
    let client = build_http_client(&config.source, &config.fetch)?;
    let base_url = Url::parse(&config.source.base_url).map_err(|e| {
        ConfigError::InvalidBaseUrl(format!("{}: {}", config.source.base_url, e))
    })?;
    let fetcher = HttpPageFetcher::new(client, base_url);

    let snapshot_path = Path::new(&config.output.data_dir).join(format!("{}.csv", tag));
    tracing::info!("Dataset snapshot: {}", snapshot_path.display());

    let mut scheduler = CycleScheduler::new(
        fetcher,
        tag,
        pages_per_cycle,
        repeat_interval,
        snapshot_path,
    )?;
    scheduler.run(shutdown).await;

    Ok(())
}
