//! Cursor-based index scan
//!
//! [`ScanReader::open`] starts a server-side cursor and returns a [`Scan`]
//! that yields one batch per call until the index is exhausted. The scan
//! owns the cursor: a failed call leaves it in place so the caller can retry
//! at the same position, and [`Scan::close`] releases the server-side
//! context when traversal ends early or normally.

use super::backend::SearchBackend;
use super::models::ScanQuery;
use crate::config::ScanConfig;
use crate::domain::{Batch, Result};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::{debug, warn};

/// Opens cursor-based scans against a search backend
pub struct ScanReader {
    backend: Arc<dyn SearchBackend>,
    config: ScanConfig,
}

impl ScanReader {
    pub fn new(backend: Arc<dyn SearchBackend>, config: ScanConfig) -> Self {
        Self { backend, config }
    }

    /// Open a scan over `index` and fetch its first batch
    ///
    /// # Errors
    ///
    /// Returns the backend error if the opening search fails; no cursor is
    /// left behind in that case.
    pub async fn open(&self, index: &str, query: ScanQuery) -> Result<Scan> {
        let page = self
            .backend
            .scan_open(index, &query, self.config.page_size)
            .await?;

        let finished = page.batch.is_empty();
        Ok(Scan {
            backend: Arc::clone(&self.backend),
            cursor: page.cursor,
            pending: if finished { None } else { Some(page.batch) },
            min_interval: Duration::from_millis(self.config.min_interval_ms),
            last_call: Some(Instant::now()),
            finished,
            closed: false,
        })
    }
}

/// An open scan holding a server-side cursor
pub struct Scan {
    backend: Arc<dyn SearchBackend>,
    cursor: Option<String>,
    pending: Option<Batch>,
    min_interval: Duration,
    last_call: Option<Instant>,
    finished: bool,
    closed: bool,
}

impl Scan {
    /// Fetch the next batch
    ///
    /// Returns `Ok(None)` once the index is exhausted. On error the cursor
    /// is unchanged, so calling again retries the same position.
    pub async fn next(&mut self) -> Result<Option<Batch>> {
        if let Some(batch) = self.pending.take() {
            return Ok(Some(batch));
        }
        if self.finished {
            return Ok(None);
        }

        let cursor = match &self.cursor {
            Some(cursor) => cursor.clone(),
            None => {
                self.finished = true;
                return Ok(None);
            }
        };

        self.throttle().await;
        let page = self.backend.scan_next(&cursor).await?;
        self.last_call = Some(Instant::now());

        if let Some(next_cursor) = page.cursor {
            self.cursor = Some(next_cursor);
        }

        if page.batch.is_empty() {
            self.finished = true;
            Ok(None)
        } else {
            debug!(documents = page.batch.len(), "Fetched scan batch");
            Ok(Some(page.batch))
        }
    }

    /// Release the server-side cursor
    ///
    /// A failed release is logged and swallowed; the context expires on its
    /// own when the lease runs out.
    pub async fn close(mut self) {
        self.closed = true;
        if let Some(cursor) = self.cursor.take() {
            if let Err(e) = self.backend.scan_close(&cursor).await {
                warn!(error = %e, "Failed to release scan cursor");
            }
        }
    }

    async fn throttle(&self) {
        if let Some(last) = self.last_call {
            let elapsed = last.elapsed();
            if elapsed < self.min_interval {
                sleep(self.min_interval - elapsed).await;
            }
        }
    }
}

impl Drop for Scan {
    fn drop(&mut self) {
        if !self.closed && self.cursor.is_some() {
            warn!("Scan dropped without close; cursor left to expire server-side");
        }
    }
}
