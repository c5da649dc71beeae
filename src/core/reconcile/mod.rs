//! Stale-artifact reconciliation
//!
//! After a fully successful export the store may still hold page artifacts
//! from earlier runs that no longer correspond to any written page. The
//! reconciler deletes everything outside the run manifest and the protected
//! set, then rebuilds the root aggregate from the manifest so it only ever
//! references artifacts that exist.

use crate::adapters::store::ArtifactStore;
use crate::core::sitemap::SitemapBuilder;
use crate::domain::{ArtifactManifest, Result};
use chrono::{DateTime, Utc};
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{info, warn};

/// One artifact the reconciler failed to delete
#[derive(Debug, Clone)]
pub struct ReconcileFailure {
    pub name: String,
    pub reason: String,
}

/// Outcome of one reconciliation pass
#[derive(Debug, Clone, Default)]
pub struct ReconcileReport {
    /// Artifacts removed from the store
    pub deleted: Vec<String>,

    /// Artifacts left in place (manifest members and protected names)
    pub kept: usize,

    /// Deletions that failed; the pass continues past them
    pub failures: Vec<ReconcileFailure>,
}

/// Deletes stale artifacts and rebuilds the root aggregate
pub struct Reconciler {
    store: Arc<ArtifactStore>,
}

impl Reconciler {
    pub fn new(store: Arc<ArtifactStore>) -> Self {
        Self { store }
    }

    /// Run one reconciliation pass
    ///
    /// Deletes every stored XML artifact that is neither in `manifest` nor
    /// in `protected`, then renders and writes the root aggregate over the
    /// manifest. Individual deletion failures are recorded and skipped; a
    /// failed root write is fatal.
    ///
    /// # Errors
    ///
    /// Returns an error if the store listing or the root write fails.
    pub async fn reconcile(
        &self,
        manifest: &ArtifactManifest,
        protected: &BTreeSet<String>,
        builder: &SitemapBuilder,
        root_name: &str,
        now: DateTime<Utc>,
    ) -> Result<ReconcileReport> {
        let existing = self.store.list_names().await?;

        let stale: Vec<&String> = existing
            .iter()
            .filter(|name| !manifest.contains(name) && !protected.contains(*name))
            .collect();

        let mut report = ReconcileReport {
            kept: existing.len() - stale.len(),
            ..ReconcileReport::default()
        };

        for name in stale {
            match self.store.delete(name).await {
                Ok(()) => report.deleted.push(name.clone()),
                Err(e) => {
                    warn!(artifact = %name, error = %e, "Failed to delete stale artifact");
                    report.failures.push(ReconcileFailure {
                        name: name.clone(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        let pages: BTreeSet<String> = manifest.iter().map(str::to_string).collect();
        let root = builder.render_root(root_name, &pages, now)?;
        self.store.write(&root).await?;

        info!(
            deleted = report.deleted.len(),
            kept = report.kept,
            failed = report.failures.len(),
            root = root_name,
            "Reconciliation complete"
        );
        Ok(report)
    }
}
