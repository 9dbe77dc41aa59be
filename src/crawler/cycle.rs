//! Cycle scheduler
//!
//! Repeatedly runs the walk-merge-persist cycle for one tag: walk the feed
//! up to the page budget, merge the batch into the dataset, write a fresh
//! snapshot, report the outcome, then sleep the configured interval and
//! repeat. The dataset is exclusively owned by this loop; no two cycles
//! overlap.

use crate::crawler::fetcher::PageFetcher;
use crate::crawler::walker::{walk, TerminationReason};
use crate::storage::{load_dataset, persist_dataset, Dataset, StorageError};
use chrono::{DateTime, Utc};
use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;

/// Outcome of one collection cycle
#[derive(Debug)]
pub struct CycleReport {
    /// When the cycle started
    pub started_at: DateTime<Utc>,

    /// Records collected by the walk
    pub collected: usize,

    /// Raw items skipped as malformed during the walk
    pub malformed_skipped: u32,

    /// Records newly inserted into the dataset
    pub inserted: usize,

    /// Records that replaced an existing entry
    pub replaced: usize,

    /// Dataset size after the merge
    pub dataset_size: usize,

    /// Why the walk stopped
    pub reason: TerminationReason,

    /// Whether the snapshot write succeeded
    pub persisted: bool,
}

/// Drives walk-merge-persist cycles for one tag
pub struct CycleScheduler<F: PageFetcher> {
    fetcher: F,
    tag: String,
    pages_per_cycle: u32,
    repeat_interval: Option<Duration>,
    snapshot_path: PathBuf,
    dataset: Dataset,
}

impl<F: PageFetcher> CycleScheduler<F> {
    /// Creates a scheduler, loading the existing snapshot if one exists
    pub fn new(
        fetcher: F,
        tag: impl Into<String>,
        pages_per_cycle: u32,
        repeat_interval: Option<Duration>,
        snapshot_path: PathBuf,
    ) -> Result<Self, StorageError> {
        let dataset = load_dataset(&snapshot_path)?;
        if !dataset.is_empty() {
            tracing::info!(
                "Loaded {} record(s) from {}",
                dataset.len(),
                snapshot_path.display()
            );
        }

        Ok(Self {
            fetcher,
            tag: tag.into(),
            pages_per_cycle,
            repeat_interval,
            snapshot_path,
            dataset,
        })
    }

    /// The current dataset
    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    /// Runs exactly one walk-merge-persist cycle
    ///
    /// A failed walk degrades the cycle's yield but still merges whatever
    /// was gathered; a failed persist leaves the previous on-disk snapshot
    /// authoritative. Neither is fatal.
    pub async fn run_cycle(&mut self) -> CycleReport {
        let started_at = Utc::now();
        tracing::info!(
            "Crawling #{} ({})",
            self.tag,
            started_at.format("%Y-%m-%d %H:%M:%S")
        );

        let outcome = walk(&self.fetcher, &self.tag, self.pages_per_cycle).await;
        let collected = outcome.records.len();
        let stats = self.dataset.merge(outcome.records);

        let persisted = match persist_dataset(&self.snapshot_path, &self.dataset) {
            Ok(()) => true,
            Err(e) => {
                tracing::error!(
                    "Failed to persist snapshot to {}: {}; previous snapshot remains authoritative",
                    self.snapshot_path.display(),
                    e
                );
                false
            }
        };

        let report = CycleReport {
            started_at,
            collected,
            malformed_skipped: outcome.malformed_skipped,
            inserted: stats.inserted,
            replaced: stats.replaced,
            dataset_size: self.dataset.len(),
            reason: outcome.reason,
            persisted,
        };

        tracing::info!(
            "Cycle finished: {} page(s), {} collected ({} skipped), {} inserted, {} replaced, {} total, {:?}",
            outcome.pages_fetched,
            report.collected,
            report.malformed_skipped,
            report.inserted,
            report.replaced,
            report.dataset_size,
            report.reason
        );

        report
    }

    /// Runs cycles until shut down
    ///
    /// Without a repeat interval this runs exactly one cycle and returns.
    /// Otherwise cycles repeat indefinitely with the interval in between;
    /// the shutdown future only ever interrupts that sleep, never an
    /// in-progress persist, so the snapshot is never left partial.
    pub async fn run(&mut self, shutdown: impl Future<Output = ()>) {
        tokio::pin!(shutdown);

        loop {
            self.run_cycle().await;

            let Some(interval) = self.repeat_interval else {
                break;
            };

            tokio::select! {
                _ = tokio::time::sleep(interval) => {}
                _ = &mut shutdown => {
                    tracing::info!("Shutdown requested, stopping after completed cycle");
                    break;
                }
            }
        }
    }
}
