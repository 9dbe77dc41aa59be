//! Cursor-driven page walker
//!
//! Drives repeated fetches through a tag feed, following the continuation
//! cursor until the feed is exhausted, a page budget is reached, or a fetch
//! fails. Fetches are strictly sequential: the cursor of page N+1 comes
//! from page N.

use crate::crawler::fetcher::PageFetcher;
use crate::record::Record;

/// Why a walk stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminationReason {
    /// The feed returned no continuation cursor
    Exhausted,

    /// The page budget was spent before the feed ran out
    PageBudgetReached,

    /// A page fetch failed; records from prior pages are preserved
    FetchFailed,
}

/// Result of walking a tag feed
#[derive(Debug)]
pub struct WalkOutcome {
    /// Records parsed from all successfully fetched pages, in feed order
    pub records: Vec<Record>,

    /// Why the walk stopped
    pub reason: TerminationReason,

    /// Pages successfully fetched
    pub pages_fetched: u32,

    /// Raw items dropped because they could not be parsed into a record
    pub malformed_skipped: u32,
}

/// Walks up to `max_pages` pages of a tag feed, accumulating records
///
/// A fetch failure stops the walk immediately but keeps the records
/// gathered from prior pages; one bad page must not discard the good ones
/// from the same cycle. Malformed items are skipped and counted
/// individually, never aborting their page. `max_pages == 0` returns an
/// empty outcome without issuing any fetch.
pub async fn walk<F: PageFetcher>(fetcher: &F, tag: &str, max_pages: u32) -> WalkOutcome {
    let mut records = Vec::new();
    let mut cursor: Option<String> = None;
    let mut pages_fetched: u32 = 0;
    let mut malformed_skipped: u32 = 0;

    while pages_fetched < max_pages {
        let page = match fetcher.fetch_page(tag, cursor.as_deref()).await {
            Ok(page) => page,
            Err(e) => {
                tracing::warn!(
                    "Walk of #{} stopped after {} page(s): {}",
                    tag,
                    pages_fetched,
                    e
                );
                return WalkOutcome {
                    records,
                    reason: TerminationReason::FetchFailed,
                    pages_fetched,
                    malformed_skipped,
                };
            }
        };

        for item in &page.items {
            match Record::from_raw(item) {
                Ok(record) => records.push(record),
                Err(e) => {
                    malformed_skipped += 1;
                    tracing::debug!("Skipping item on page {}: {}", pages_fetched + 1, e);
                }
            }
        }

        cursor = page.next_cursor;
        pages_fetched += 1;

        if cursor.is_none() {
            return WalkOutcome {
                records,
                reason: TerminationReason::Exhausted,
                pages_fetched,
                malformed_skipped,
            };
        }
    }

    WalkOutcome {
        records,
        reason: TerminationReason::PageBudgetReached,
        pages_fetched,
        malformed_skipped,
    }
}
