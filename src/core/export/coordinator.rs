//! Export pipeline orchestration
//!
//! Drives the full run: per-index scans rendered into page artifacts, the
//! counts summary, stale-artifact reconciliation and change notification.
//! Indices are processed sequentially; an index failure is recorded and the
//! run moves on, but reconciliation only happens when every index exported
//! cleanly, so a partial run never causes artifact deletion.

use super::summary::RunSummary;
use crate::adapters::indexnow::NotificationDispatcher;
use crate::adapters::search::{ScanQuery, ScanReader, SearchBackend};
use crate::adapters::store::ArtifactStore;
use crate::config::AppConfig;
use crate::core::reconcile::Reconciler;
use crate::core::sitemap::SitemapBuilder;
use crate::domain::{ArtifactManifest, Result};
use chrono::{DateTime, Utc};
use std::collections::BTreeSet;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{info, warn};

/// Coordinates one full export run
pub struct ExportCoordinator {
    backend: Arc<dyn SearchBackend>,
    store: Arc<ArtifactStore>,
    builder: SitemapBuilder,
    dispatcher: NotificationDispatcher,
    reader: ScanReader,
    reconciler: Reconciler,
    indices: Vec<String>,
    root_name: String,
    counts_name: String,
    shutdown: watch::Receiver<bool>,
}

impl ExportCoordinator {
    pub fn new(
        backend: Arc<dyn SearchBackend>,
        store: Arc<ArtifactStore>,
        dispatcher: NotificationDispatcher,
        config: &AppConfig,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        Self {
            reader: ScanReader::new(Arc::clone(&backend), config.search.scan.clone()),
            reconciler: Reconciler::new(Arc::clone(&store)),
            builder: SitemapBuilder::new(&config.sitemap),
            backend,
            store,
            dispatcher,
            indices: config.sitemap.indices.clone(),
            root_name: config.sitemap.root_name.clone(),
            counts_name: config.sitemap.counts_name.clone(),
            shutdown,
        }
    }

    fn is_cancelled(&self) -> bool {
        *self.shutdown.borrow()
    }

    /// Execute one run and return its summary
    ///
    /// Individual index failures and notification shortfalls are recorded in
    /// the summary rather than returned as errors; the summary's
    /// `is_success` reflects them.
    pub async fn run(&self) -> Result<RunSummary> {
        let mut summary = RunSummary::new();
        let mut manifest = ArtifactManifest::new();
        let mut counts: Vec<(String, u64)> = Vec::new();
        let now = Utc::now();

        info!(indices = self.indices.len(), "Starting export run");

        for index in &self.indices {
            if self.is_cancelled() {
                summary.cancelled = true;
                break;
            }
            match self
                .export_index(index, &mut manifest, &mut summary, now)
                .await
            {
                Ok(count) => counts.push((index.clone(), count)),
                Err(e) => {
                    warn!(index = %index, error = %e, "Index export failed");
                    summary.record_error(index.clone(), e.to_string());
                }
            }
        }

        self.write_counts(&counts, now, &mut summary).await;

        // Reconciliation requires a complete manifest: deleting against a
        // partial one would drop artifacts that are still valid.
        if summary.is_success() {
            let protected: BTreeSet<String> =
                [self.root_name.clone(), self.counts_name.clone()].into();
            match self
                .reconciler
                .reconcile(&manifest, &protected, &self.builder, &self.root_name, now)
                .await
            {
                Ok(report) => summary.reconcile = Some(report),
                Err(e) => summary.record_error("reconcile", e.to_string()),
            }
        } else {
            warn!("Skipping reconciliation after incomplete export");
        }

        summary.finish();
        summary.log_summary();
        Ok(summary)
    }

    /// Export one index: scan, render, write, notify
    ///
    /// Returns the index document count for the counts artifact. The scan
    /// cursor is released on every exit path.
    async fn export_index(
        &self,
        index: &str,
        manifest: &mut ArtifactManifest,
        summary: &mut RunSummary,
        now: DateTime<Utc>,
    ) -> Result<u64> {
        let query = ScanQuery::sitemap_export();
        let count = self.backend.count(index, &query).await?;
        info!(index = index, documents = count, "Exporting index");

        let mut scan = self.reader.open(index, query).await?;
        let result = self.drive_scan(index, &mut scan, manifest, summary, now).await;
        scan.close().await;
        result?;

        Ok(count)
    }

    async fn drive_scan(
        &self,
        index: &str,
        scan: &mut crate::adapters::search::Scan,
        manifest: &mut ArtifactManifest,
        summary: &mut RunSummary,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let mut page = 1;
        loop {
            if self.is_cancelled() {
                summary.cancelled = true;
                return Ok(());
            }

            let Some(batch) = scan.next().await? else {
                break;
            };
            summary.documents_seen += batch.len();

            match self.builder.render_page(index, page, &batch, now)? {
                None => summary.pages_skipped += 1,
                Some(artifact) => {
                    // A failed write aborts the index without recording the
                    // artifact, so reconciliation never trusts a phantom page.
                    self.store.write(&artifact).await?;
                    manifest.record(&artifact.name);
                    summary.pages_written += 1;

                    if self.dispatcher.is_enabled() {
                        let url = self.builder.artifact_url(&artifact.name);
                        let report = self.dispatcher.notify(&[url]).await;
                        summary.record_dispatch(&report);
                    }
                }
            }
            // Every batch consumes its page number, artifact or not. Page N
            // always maps back to offset (N-1) * page_size, so a skipped
            // page leaves a gap instead of renumbering everything after it.
            page += 1;
        }
        Ok(())
    }

    async fn write_counts(
        &self,
        counts: &[(String, u64)],
        now: DateTime<Utc>,
        summary: &mut RunSummary,
    ) {
        if counts.is_empty() {
            return;
        }
        let result = self
            .builder
            .render_counts(&self.counts_name, counts, now);
        match result {
            Ok(artifact) => {
                if let Err(e) = self.store.write(&artifact).await {
                    summary.record_error("counts", e.to_string());
                }
            }
            Err(e) => summary.record_error("counts", e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::search::models::{BulkOutcome, ScanPage, WriteOp};
    use crate::adapters::store::{InMemoryObjectStore, ObjectStore};
    use crate::config::schema::{
        ApplicationConfig, LoggingConfig, NotifyConfig, RetryConfig, ScanConfig, SearchConfig,
        SitemapConfig, StoreConfig,
    };
    use crate::domain::{Batch, Document, SearchError};
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;

    /// Serves a fixed document set through the scan protocol
    struct FixedBackend {
        docs: Vec<Document>,
        page_size: Mutex<usize>,
        fail_scan_next: bool,
    }

    impl FixedBackend {
        fn new(docs: Vec<Document>) -> Self {
            Self {
                docs,
                page_size: Mutex::new(0),
                fail_scan_next: false,
            }
        }

        fn slice(&self, offset: usize, size: usize) -> Batch {
            self.docs.iter().skip(offset).take(size).cloned().collect()
        }
    }

    #[async_trait]
    impl SearchBackend for FixedBackend {
        async fn count(&self, _index: &str, _query: &ScanQuery) -> Result<u64> {
            Ok(self.docs.len() as u64)
        }

        async fn scan_open(
            &self,
            _index: &str,
            _query: &ScanQuery,
            size: usize,
        ) -> Result<ScanPage> {
            *self.page_size.lock().unwrap() = size;
            Ok(ScanPage {
                cursor: Some(size.to_string()),
                batch: self.slice(0, size),
            })
        }

        async fn scan_next(&self, cursor: &str) -> Result<ScanPage> {
            if self.fail_scan_next {
                return Err(SearchError::Timeout("deadline exceeded".to_string()).into());
            }
            let offset: usize = cursor.parse().unwrap();
            let size = *self.page_size.lock().unwrap();
            Ok(ScanPage {
                cursor: Some((offset + size).to_string()),
                batch: self.slice(offset, size),
            })
        }

        async fn scan_close(&self, _cursor: &str) -> Result<()> {
            Ok(())
        }

        async fn fetch_page(
            &self,
            _index: &str,
            _query: &ScanQuery,
            from: usize,
            size: usize,
        ) -> Result<Batch> {
            Ok(self.slice(from, size))
        }

        async fn bulk(&self, _index: &str, _ops: &[WriteOp]) -> Result<Vec<BulkOutcome>> {
            unreachable!("bulk not used by exports")
        }
    }

    fn active_docs(n: usize) -> Vec<Document> {
        (0..n)
            .map(|i| {
                let mut fields = serde_json::Map::new();
                fields.insert("status".to_string(), json!("Active"));
                Document::new(format!("doc-{i}"), fields)
            })
            .collect()
    }

    fn test_config(page_size: usize) -> AppConfig {
        AppConfig {
            application: ApplicationConfig::default(),
            search: SearchConfig {
                base_url: "https://search.example.com".to_string(),
                scan: ScanConfig {
                    page_size,
                    min_interval_ms: 0,
                    scroll_ttl_seconds: 60,
                },
                retry: RetryConfig::default(),
                ..SearchConfig::default()
            },
            sitemap: SitemapConfig {
                indices: vec!["jobs_idx".to_string()],
                site_base_url: "https://www.example.com".to_string(),
                root_name: "sitemap_Alljobs.xml".to_string(),
                counts_name: "sitemap_index_counts.xml".to_string(),
                changefreq: "daily".to_string(),
                priority: "1.0".to_string(),
            },
            store: StoreConfig {
                bucket: "sitemaps".to_string(),
                prefix: "public/".to_string(),
                region: "us-east-1".to_string(),
                endpoint_url: None,
                access_key_id: None,
                secret_access_key: None,
            },
            notify: NotifyConfig {
                enabled: false,
                ..NotifyConfig::default()
            },
            logging: LoggingConfig::default(),
        }
    }

    fn coordinator(
        backend: Arc<dyn SearchBackend>,
        raw: Arc<InMemoryObjectStore>,
        config: &AppConfig,
    ) -> (ExportCoordinator, watch::Sender<bool>) {
        let store = Arc::new(ArtifactStore::new(raw as Arc<dyn ObjectStore>, "public/"));
        let dispatcher = NotificationDispatcher::new(&config.notify).unwrap();
        let (tx, rx) = watch::channel(false);
        (
            ExportCoordinator::new(backend, store, dispatcher, config, rx),
            tx,
        )
    }

    #[tokio::test]
    async fn test_full_run_writes_pages_counts_and_root() {
        let backend = Arc::new(FixedBackend::new(active_docs(5)));
        let raw = Arc::new(InMemoryObjectStore::new());
        // stale page from an earlier run
        raw.write("public/jobs_idx_9.xml", b"<old/>".to_vec(), "application/xml")
            .await
            .unwrap();
        let config = test_config(2);
        let (coordinator, _tx) = coordinator(backend, Arc::clone(&raw), &config);

        let summary = coordinator.run().await.unwrap();

        assert!(summary.is_success());
        assert_eq!(summary.pages_written, 3);
        assert_eq!(summary.documents_seen, 5);

        let contents = raw.contents().await;
        assert!(contents.contains_key("public/jobs_idx_1.xml"));
        assert!(contents.contains_key("public/jobs_idx_2.xml"));
        assert!(contents.contains_key("public/jobs_idx_3.xml"));
        assert!(!contents.contains_key("public/jobs_idx_9.xml"));
        assert!(contents.contains_key("public/sitemap_index_counts.xml"));

        let root =
            std::str::from_utf8(&contents["public/sitemap_Alljobs.xml"].content).unwrap();
        let pos = |needle: &str| root.find(needle).unwrap();
        assert!(pos("jobs_idx_1.xml") < pos("jobs_idx_2.xml"));
        assert!(pos("jobs_idx_2.xml") < pos("jobs_idx_3.xml"));

        let report = summary.reconcile.unwrap();
        assert_eq!(report.deleted, vec!["jobs_idx_9.xml"]);
    }

    #[tokio::test]
    async fn test_failed_index_skips_reconciliation() {
        let mut backend = FixedBackend::new(active_docs(5));
        backend.fail_scan_next = true;
        let raw = Arc::new(InMemoryObjectStore::new());
        raw.write("public/jobs_idx_9.xml", b"<old/>".to_vec(), "application/xml")
            .await
            .unwrap();
        let config = test_config(2);
        let (coordinator, _tx) = coordinator(Arc::new(backend), Arc::clone(&raw), &config);

        let summary = coordinator.run().await.unwrap();

        assert!(!summary.is_success());
        assert!(summary.reconcile.is_none());
        // the stale artifact survives an incomplete run
        let contents = raw.contents().await;
        assert!(contents.contains_key("public/jobs_idx_9.xml"));
        assert!(!contents.contains_key("public/sitemap_Alljobs.xml"));
    }

    #[tokio::test]
    async fn test_inactive_batches_produce_no_pages() {
        let docs: Vec<Document> = (0..4)
            .map(|i| {
                let mut fields = serde_json::Map::new();
                fields.insert("status".to_string(), json!("Expired"));
                Document::new(format!("doc-{i}"), fields)
            })
            .collect();
        let backend = Arc::new(FixedBackend::new(docs));
        let raw = Arc::new(InMemoryObjectStore::new());
        let config = test_config(2);
        let (coordinator, _tx) = coordinator(backend, Arc::clone(&raw), &config);

        let summary = coordinator.run().await.unwrap();

        assert!(summary.is_success());
        assert_eq!(summary.pages_written, 0);
        assert_eq!(summary.pages_skipped, 2);
        assert_eq!(summary.documents_seen, 4);

        // root is still rebuilt, empty
        let contents = raw.contents().await;
        assert!(contents.contains_key("public/sitemap_Alljobs.xml"));
        assert!(!contents.contains_key("public/jobs_idx_1.xml"));
    }

    #[tokio::test]
    async fn test_skipped_page_leaves_a_numbering_gap() {
        // batches at page size 2: active pair, expired pair, active pair
        let docs: Vec<Document> = ["Active", "Active", "Expired", "Expired", "Active", "Active"]
            .iter()
            .enumerate()
            .map(|(i, status)| {
                let mut fields = serde_json::Map::new();
                fields.insert("status".to_string(), json!(*status));
                Document::new(format!("doc-{i}"), fields)
            })
            .collect();
        let backend = Arc::new(FixedBackend::new(docs));
        let raw = Arc::new(InMemoryObjectStore::new());
        let config = test_config(2);
        let (coordinator, _tx) = coordinator(backend, Arc::clone(&raw), &config);

        let summary = coordinator.run().await.unwrap();

        assert!(summary.is_success());
        assert_eq!(summary.pages_written, 2);
        assert_eq!(summary.pages_skipped, 1);

        // the all-inactive second batch consumed page 2; the third batch
        // keeps its own number instead of sliding down into the gap
        let contents = raw.contents().await;
        assert!(contents.contains_key("public/jobs_idx_1.xml"));
        assert!(!contents.contains_key("public/jobs_idx_2.xml"));
        assert!(contents.contains_key("public/jobs_idx_3.xml"));

        let page3 = std::str::from_utf8(&contents["public/jobs_idx_3.xml"].content).unwrap();
        assert!(page3.contains("/postid/doc-4"));
        assert!(page3.contains("/postid/doc-5"));

        let root = std::str::from_utf8(&contents["public/sitemap_Alljobs.xml"].content).unwrap();
        assert!(root.contains("jobs_idx_1.xml"));
        assert!(!root.contains("jobs_idx_2.xml"));
        assert!(root.contains("jobs_idx_3.xml"));
    }

    #[tokio::test]
    async fn test_cancellation_stops_run_and_skips_reconciliation() {
        let backend = Arc::new(FixedBackend::new(active_docs(100)));
        let raw = Arc::new(InMemoryObjectStore::new());
        let config = test_config(10);
        let (coordinator, tx) = coordinator(backend, Arc::clone(&raw), &config);

        tx.send(true).unwrap();
        let summary = coordinator.run().await.unwrap();

        assert!(summary.cancelled);
        assert!(!summary.is_success());
        assert!(summary.reconcile.is_none());
        assert_eq!(summary.pages_written, 0);
    }
}
