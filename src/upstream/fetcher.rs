// fetcher.rs
use rand::Rng;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use crate::config::FetchSettings;
use crate::errors::{FetchError, IngestError, UpstreamError};
use crate::upstream::client::{PageQuery, RecordSource};
use crate::upstream::models::{RawRecord, RecordPage};

const MAX_BACKOFF_EXPONENT: u32 = 6;

/// Shared flag a caller flips to abandon a run between pages.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone)]
pub struct FetchOutcome {
    pub records: Vec<RawRecord>,
    pub pages: usize,
    /// Stopped at the page cap while the upstream still had a cursor.
    pub capped: bool,
}

/// A fetch that stopped early. `partial` is everything collected before the stop.
#[derive(Debug)]
pub struct FetchFailure {
    pub error: IngestError,
    pub pages: usize,
    pub partial: Vec<RawRecord>,
}

pub struct PageFetcher<'a, S: RecordSource + ?Sized> {
    source: &'a S,
    settings: &'a FetchSettings,
    cancel: &'a CancelToken,
}

impl<'a, S: RecordSource + ?Sized> PageFetcher<'a, S> {
    pub fn new(source: &'a S, settings: &'a FetchSettings, cancel: &'a CancelToken) -> Self {
        Self {
            source,
            settings,
            cancel,
        }
    }

    /// Follows the continuation cursor until it disappears, a page comes back empty,
    /// or the page cap is hit. Pages are strictly sequential.
    pub fn fetch_all(&self, view: Option<&str>) -> Result<FetchOutcome, FetchFailure> {
        let mut records: Vec<RawRecord> = Vec::new();
        let mut offset: Option<String> = None;
        let mut pages = 0;

        loop {
            if pages >= self.settings.max_pages {
                warn!(
                    max_pages = self.settings.max_pages,
                    records = records.len(),
                    "page cap reached, returning what was collected"
                );
                return Ok(FetchOutcome {
                    records,
                    pages,
                    capped: true,
                });
            }

            if self.cancel.is_cancelled() {
                return Err(FetchFailure {
                    error: IngestError::Cancelled {
                        pages_fetched: pages,
                        records_fetched: records.len(),
                    },
                    pages,
                    partial: records,
                });
            }

            let page_index = pages + 1;
            let query = PageQuery::new(self.settings.page_size, view).with_offset(offset.take());

            let page = match self.fetch_page(page_index, &query) {
                Ok(page) => page,
                Err(source) => {
                    return Err(FetchFailure {
                        error: IngestError::Fetch(FetchError {
                            page: page_index,
                            records_fetched: records.len(),
                            source,
                        }),
                        pages,
                        partial: records,
                    });
                }
            };

            pages = page_index;
            let count = page.records.len();
            records.extend(page.records);

            info!(page = page_index, records = count, more = page.offset.is_some(), "page fetched");

            match page.offset {
                Some(next) if count > 0 => offset = Some(next),
                _ => break,
            }

            if !self.settings.page_delay.is_zero() {
                std::thread::sleep(self.settings.page_delay);
            }
        }

        info!(pages, records = records.len(), "fetch complete");
        Ok(FetchOutcome {
            records,
            pages,
            capped: false,
        })
    }

    fn fetch_page(&self, page_index: usize, query: &PageQuery) -> Result<RecordPage, UpstreamError> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.source.list_records(query) {
                Ok(page) => return Ok(page),
                Err(e) if e.is_transient() && attempt < self.settings.max_attempts => {
                    let delay = backoff_delay(self.settings.retry_base, attempt);
                    warn!(
                        page = page_index,
                        attempt,
                        category = e.category(),
                        "page request failed; retrying after {:?}: {e}",
                        delay
                    );
                    if !delay.is_zero() {
                        std::thread::sleep(delay);
                    }
                }
                Err(e) => return Err(e),
            }
        }
    }
}

/// `base * 2^(attempt-1)` plus up to half of `base` in jitter.
pub fn backoff_delay(base: Duration, attempt: u32) -> Duration {
    let exponent = attempt.saturating_sub(1).min(MAX_BACKOFF_EXPONENT);
    let scaled = base * (1u32 << exponent);
    let base_ms = base.as_millis() as u64;
    let jitter_ms = rand::thread_rng().gen_range(0..=base_ms / 2);
    scaled + Duration::from_millis(jitter_ms)
}
