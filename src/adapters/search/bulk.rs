//! Batched bulk writes with bounded retry
//!
//! A batch is submitted in a single request. Request-level failures that are
//! transient are retried up to the configured budget; when the budget runs
//! out every operation in the batch is reported as failed rather than
//! surfaced as an error, so the caller gets one outcome per operation either
//! way. Per-operation failures inside an accepted request are never retried.

use super::backend::SearchBackend;
use super::models::{BulkOutcome, WriteOp};
use crate::config::RetryConfig;
use crate::domain::{Result, SitemapperError};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

/// Result of a bulk submission
#[derive(Debug)]
pub struct BulkReport {
    /// One outcome per submitted operation, in submission order
    pub outcomes: Vec<BulkOutcome>,

    /// Number of requests sent, including the first attempt
    pub attempts: u32,

    /// True when the retry budget ran out before the request was accepted
    pub exhausted: bool,
}

impl BulkReport {
    /// Number of operations that were applied
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    /// Ids of operations that failed
    pub fn failed_ids(&self) -> Vec<&str> {
        self.outcomes
            .iter()
            .filter(|o| !o.is_success())
            .map(|o| o.id())
            .collect()
    }
}

/// Submits write batches with bounded retry on transient request failures
pub struct BulkWriter {
    backend: Arc<dyn SearchBackend>,
    max_retries: u32,
    retry_delay: Duration,
}

impl BulkWriter {
    pub fn new(backend: Arc<dyn SearchBackend>, config: &RetryConfig) -> Self {
        Self {
            backend,
            max_retries: config.max_retries,
            retry_delay: Duration::from_millis(config.retry_delay_ms),
        }
    }

    /// Submit a batch of operations against `index`
    ///
    /// # Errors
    ///
    /// Returns an error only for non-transient request failures (bad
    /// request, authentication). Transient failures are retried; once the
    /// budget is spent the report marks every operation failed and sets
    /// `exhausted`.
    pub async fn submit(&self, index: &str, ops: &[WriteOp]) -> Result<BulkReport> {
        if ops.is_empty() {
            return Ok(BulkReport {
                outcomes: Vec::new(),
                attempts: 0,
                exhausted: false,
            });
        }

        let mut attempts = 0;
        loop {
            attempts += 1;
            match self.backend.bulk(index, ops).await {
                Ok(outcomes) => {
                    let failed = outcomes.iter().filter(|o| !o.is_success()).count();
                    if failed > 0 {
                        for outcome in &outcomes {
                            if let BulkOutcome::Failure { id, reason } = outcome {
                                warn!(index = index, id = %id, reason = %reason, "Bulk operation failed");
                            }
                        }
                    }
                    debug!(
                        index = index,
                        operations = ops.len(),
                        failed = failed,
                        attempts = attempts,
                        "Bulk request accepted"
                    );
                    return Ok(BulkReport {
                        outcomes,
                        attempts,
                        exhausted: false,
                    });
                }
                Err(SitemapperError::Search(e)) if e.is_transient() => {
                    if attempts > self.max_retries {
                        warn!(
                            index = index,
                            attempts = attempts,
                            error = %e,
                            "Bulk retry budget exhausted"
                        );
                        let reason =
                            format!("retry budget exhausted after {attempts} attempts: {e}");
                        let outcomes = ops
                            .iter()
                            .map(|op| BulkOutcome::Failure {
                                id: op.id().to_string(),
                                reason: reason.clone(),
                            })
                            .collect();
                        return Ok(BulkReport {
                            outcomes,
                            attempts,
                            exhausted: true,
                        });
                    }
                    warn!(
                        index = index,
                        attempt = attempts,
                        error = %e,
                        "Transient bulk failure, retrying"
                    );
                    sleep(self.retry_delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::search::models::{ScanPage, ScanQuery};
    use crate::domain::{Batch, SearchError};
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Fails the first `failures` bulk calls with a transient error
    struct FlakyBackend {
        failures: u32,
        calls: AtomicU32,
    }

    impl FlakyBackend {
        fn new(failures: u32) -> Self {
            Self {
                failures,
                calls: AtomicU32::new(0),
            }
        }
    }

    #[async_trait]
    impl SearchBackend for FlakyBackend {
        async fn count(&self, _index: &str, _query: &ScanQuery) -> Result<u64> {
            unreachable!()
        }

        async fn scan_open(
            &self,
            _index: &str,
            _query: &ScanQuery,
            _size: usize,
        ) -> Result<ScanPage> {
            unreachable!()
        }

        async fn scan_next(&self, _cursor: &str) -> Result<ScanPage> {
            unreachable!()
        }

        async fn scan_close(&self, _cursor: &str) -> Result<()> {
            unreachable!()
        }

        async fn fetch_page(
            &self,
            _index: &str,
            _query: &ScanQuery,
            _from: usize,
            _size: usize,
        ) -> Result<Batch> {
            unreachable!()
        }

        async fn bulk(&self, _index: &str, ops: &[WriteOp]) -> Result<Vec<BulkOutcome>> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.failures {
                return Err(SearchError::Timeout("deadline exceeded".to_string()).into());
            }
            Ok(ops
                .iter()
                .map(|op| BulkOutcome::Success {
                    id: op.id().to_string(),
                })
                .collect())
        }
    }

    /// Always rejects the request with the given error
    struct RejectingBackend {
        error: fn() -> SearchError,
        calls: AtomicU32,
    }

    #[async_trait]
    impl SearchBackend for RejectingBackend {
        async fn count(&self, _index: &str, _query: &ScanQuery) -> Result<u64> {
            unreachable!()
        }

        async fn scan_open(
            &self,
            _index: &str,
            _query: &ScanQuery,
            _size: usize,
        ) -> Result<ScanPage> {
            unreachable!()
        }

        async fn scan_next(&self, _cursor: &str) -> Result<ScanPage> {
            unreachable!()
        }

        async fn scan_close(&self, _cursor: &str) -> Result<()> {
            unreachable!()
        }

        async fn fetch_page(
            &self,
            _index: &str,
            _query: &ScanQuery,
            _from: usize,
            _size: usize,
        ) -> Result<Batch> {
            unreachable!()
        }

        async fn bulk(&self, _index: &str, _ops: &[WriteOp]) -> Result<Vec<BulkOutcome>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err((self.error)().into())
        }
    }

    fn ops(ids: &[&str]) -> Vec<WriteOp> {
        ids.iter()
            .map(|id| WriteOp::Upsert {
                id: id.to_string(),
                document: json!({}),
            })
            .collect()
    }

    fn fast_retry() -> RetryConfig {
        RetryConfig {
            max_retries: 3,
            retry_delay_ms: 1,
        }
    }

    #[tokio::test]
    async fn test_succeeds_after_transient_failures() {
        let backend = Arc::new(FlakyBackend::new(3));
        let writer = BulkWriter::new(Arc::clone(&backend) as Arc<dyn SearchBackend>, &fast_retry());

        let report = writer.submit("jobs_idx", &ops(&["a", "b"])).await.unwrap();

        assert_eq!(report.attempts, 4);
        assert!(!report.exhausted);
        assert_eq!(report.succeeded(), 2);
        assert_eq!(backend.calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_exhausted_budget_fails_all_operations() {
        let backend = Arc::new(RejectingBackend {
            error: || SearchError::Timeout("deadline exceeded".to_string()),
            calls: AtomicU32::new(0),
        });
        let writer = BulkWriter::new(Arc::clone(&backend) as Arc<dyn SearchBackend>, &fast_retry());

        let report = writer.submit("jobs_idx", &ops(&["a", "b", "c"])).await.unwrap();

        // first attempt plus three retries, no fifth request
        assert_eq!(report.attempts, 4);
        assert_eq!(backend.calls.load(Ordering::SeqCst), 4);
        assert!(report.exhausted);
        assert_eq!(report.succeeded(), 0);
        assert_eq!(report.failed_ids(), vec!["a", "b", "c"]);
        assert!(matches!(
            &report.outcomes[0],
            BulkOutcome::Failure { reason, .. } if reason.contains("retry budget exhausted")
        ));
    }

    #[tokio::test]
    async fn test_non_transient_error_propagates() {
        let backend = Arc::new(RejectingBackend {
            error: || SearchError::ClientError {
                status: 400,
                message: "malformed".to_string(),
            },
            calls: AtomicU32::new(0),
        });
        let writer = BulkWriter::new(Arc::clone(&backend) as Arc<dyn SearchBackend>, &fast_retry());

        let result = writer.submit("jobs_idx", &ops(&["a"])).await;
        assert!(result.is_err());
        // no retries for non-transient failures
        assert_eq!(backend.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_empty_batch_is_a_no_op() {
        let backend = Arc::new(RejectingBackend {
            error: || SearchError::Timeout("deadline exceeded".to_string()),
            calls: AtomicU32::new(0),
        });
        let writer = BulkWriter::new(Arc::clone(&backend) as Arc<dyn SearchBackend>, &fast_retry());

        let report = writer.submit("jobs_idx", &[]).await.unwrap();
        assert_eq!(report.attempts, 0);
        assert!(report.outcomes.is_empty());
        assert_eq!(backend.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_partial_item_failure_not_retried() {
        struct PartialBackend {
            calls: AtomicU32,
        }

        #[async_trait]
        impl SearchBackend for PartialBackend {
            async fn count(&self, _index: &str, _query: &ScanQuery) -> Result<u64> {
                unreachable!()
            }

            async fn scan_open(
                &self,
                _index: &str,
                _query: &ScanQuery,
                _size: usize,
            ) -> Result<ScanPage> {
                unreachable!()
            }

            async fn scan_next(&self, _cursor: &str) -> Result<ScanPage> {
                unreachable!()
            }

            async fn scan_close(&self, _cursor: &str) -> Result<()> {
                unreachable!()
            }

            async fn fetch_page(
                &self,
                _index: &str,
                _query: &ScanQuery,
                _from: usize,
                _size: usize,
            ) -> Result<Batch> {
                unreachable!()
            }

            async fn bulk(&self, _index: &str, ops: &[WriteOp]) -> Result<Vec<BulkOutcome>> {
                self.calls.fetch_add(1, Ordering::SeqCst);
                Ok(ops
                    .iter()
                    .enumerate()
                    .map(|(i, op)| {
                        if i == 0 {
                            BulkOutcome::Failure {
                                id: op.id().to_string(),
                                reason: "version conflict".to_string(),
                            }
                        } else {
                            BulkOutcome::Success {
                                id: op.id().to_string(),
                            }
                        }
                    })
                    .collect())
            }
        }

        let backend = Arc::new(PartialBackend {
            calls: AtomicU32::new(0),
        });
        let writer = BulkWriter::new(Arc::clone(&backend) as Arc<dyn SearchBackend>, &fast_retry());

        let report = writer.submit("jobs_idx", &ops(&["a", "b"])).await.unwrap();
        assert_eq!(report.attempts, 1);
        assert_eq!(report.succeeded(), 1);
        assert_eq!(report.failed_ids(), vec!["a"]);
        assert_eq!(backend.calls.load(Ordering::SeqCst), 1);
    }
}
