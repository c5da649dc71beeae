//! Backend abstraction for the search index
//!
//! The trait covers everything the pipeline needs from the index: counting,
//! cursor-based scans, offset-paged fetches and bulk writes. The HTTP client
//! in [`super::client`] is the production implementation; tests substitute
//! in-process stubs.

use super::models::{BulkOutcome, ScanPage, ScanQuery, WriteOp};
use crate::domain::{Batch, Result};
use async_trait::async_trait;

/// Operations the pipeline performs against a search index
#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// Number of documents matching the query in the index
    async fn count(&self, index: &str, query: &ScanQuery) -> Result<u64>;

    /// Open a cursor-based scan and return its first page
    ///
    /// The returned page carries the cursor token subsequent calls must use.
    /// An empty batch with no further pages means the index matched nothing.
    async fn scan_open(&self, index: &str, query: &ScanQuery, size: usize) -> Result<ScanPage>;

    /// Fetch the next page of an open scan
    ///
    /// An empty batch signals end of scan. A failed call leaves the cursor
    /// usable, so the caller may retry with the same token.
    async fn scan_next(&self, cursor: &str) -> Result<ScanPage>;

    /// Release an open cursor; failures are reported, not fatal
    async fn scan_close(&self, cursor: &str) -> Result<()>;

    /// Offset-paged fetch, for targeted re-reads outside an open scan
    async fn fetch_page(
        &self,
        index: &str,
        query: &ScanQuery,
        from: usize,
        size: usize,
    ) -> Result<Batch>;

    /// Submit a batch of write operations in one request
    ///
    /// Returns one outcome per submitted operation, in submission order.
    /// Request-level failures are returned as errors; per-operation failures
    /// appear as [`BulkOutcome::Failure`] entries.
    async fn bulk(&self, index: &str, ops: &[WriteOp]) -> Result<Vec<BulkOutcome>>;
}
