//! Run summary accounting

use crate::adapters::indexnow::DispatchReport;
use crate::core::reconcile::ReconcileReport;
use std::time::{Duration, Instant};
use tracing::{error, info, warn};

/// An error recorded during a run, with the index or phase it occurred in
#[derive(Debug, Clone)]
pub struct RunError {
    pub context: String,
    pub message: String,
}

/// Aggregated outcome of one pipeline run
#[derive(Debug)]
pub struct RunSummary {
    /// Page artifacts written to the store
    pub pages_written: usize,

    /// Batches that produced no artifact (no active documents)
    pub pages_skipped: usize,

    /// Documents read from the index, active or not
    pub documents_seen: usize,

    /// IndexNow endpoint submissions attempted across all artifacts
    pub notifications_attempted: usize,

    /// IndexNow endpoint submissions accepted
    pub notifications_succeeded: usize,

    /// Reconciliation outcome; absent when the pass was skipped
    pub reconcile: Option<ReconcileReport>,

    /// Errors recorded across the run
    pub errors: Vec<RunError>,

    /// True when the run was interrupted by a shutdown signal
    pub cancelled: bool,

    started: Instant,
    duration: Option<Duration>,
}

impl RunSummary {
    pub fn new() -> Self {
        Self {
            pages_written: 0,
            pages_skipped: 0,
            documents_seen: 0,
            notifications_attempted: 0,
            notifications_succeeded: 0,
            reconcile: None,
            errors: Vec::new(),
            cancelled: false,
            started: Instant::now(),
            duration: None,
        }
    }

    pub fn record_error(&mut self, context: impl Into<String>, message: impl Into<String>) {
        self.errors.push(RunError {
            context: context.into(),
            message: message.into(),
        });
    }

    pub fn record_dispatch(&mut self, report: &DispatchReport) {
        self.notifications_attempted += report.attempted();
        self.notifications_succeeded += report.succeeded();
    }

    pub fn finish(&mut self) {
        self.duration = Some(self.started.elapsed());
    }

    pub fn duration(&self) -> Duration {
        self.duration.unwrap_or_else(|| self.started.elapsed())
    }

    /// A run succeeds when nothing failed and it was not cancelled
    pub fn is_success(&self) -> bool {
        self.errors.is_empty() && !self.cancelled
    }

    pub fn log_summary(&self) {
        info!(
            pages_written = self.pages_written,
            pages_skipped = self.pages_skipped,
            documents_seen = self.documents_seen,
            notifications_succeeded = self.notifications_succeeded,
            notifications_attempted = self.notifications_attempted,
            reconciled = self.reconcile.is_some(),
            duration_ms = self.duration().as_millis() as u64,
            "Run complete"
        );

        if let Some(reconcile) = &self.reconcile {
            info!(
                deleted = reconcile.deleted.len(),
                kept = reconcile.kept,
                failed_deletions = reconcile.failures.len(),
                "Reconciliation summary"
            );
        }

        if self.cancelled {
            warn!("Run was cancelled before completion");
        }
        for err in &self.errors {
            error!(context = %err.context, "{}", err.message);
        }
    }
}

impl Default for RunSummary {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::indexnow::EndpointResult;

    #[test]
    fn test_new_summary_is_success() {
        let summary = RunSummary::new();
        assert!(summary.is_success());
        assert_eq!(summary.pages_written, 0);
    }

    #[test]
    fn test_errors_fail_the_run() {
        let mut summary = RunSummary::new();
        summary.record_error("jobs_idx", "bulk write failed");
        assert!(!summary.is_success());
        assert_eq!(summary.errors[0].context, "jobs_idx");
    }

    #[test]
    fn test_cancellation_fails_the_run() {
        let mut summary = RunSummary::new();
        summary.cancelled = true;
        assert!(!summary.is_success());
    }

    #[test]
    fn test_record_dispatch_accumulates() {
        let mut summary = RunSummary::new();
        let report = DispatchReport {
            results: vec![
                EndpointResult {
                    endpoint: "a".to_string(),
                    succeeded: true,
                },
                EndpointResult {
                    endpoint: "b".to_string(),
                    succeeded: false,
                },
            ],
        };
        summary.record_dispatch(&report);
        summary.record_dispatch(&report);

        assert_eq!(summary.notifications_attempted, 4);
        assert_eq!(summary.notifications_succeeded, 2);
    }

    #[test]
    fn test_finish_freezes_duration() {
        let mut summary = RunSummary::new();
        summary.finish();
        let frozen = summary.duration();
        std::thread::sleep(Duration::from_millis(5));
        assert_eq!(summary.duration(), frozen);
    }
}
