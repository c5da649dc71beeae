//! Generate command implementation
//!
//! Runs the full export pipeline: scan every configured index, render and
//! write page artifacts, write the counts summary, reconcile stale
//! artifacts and notify the IndexNow endpoints.

use super::{build_backend, build_store};
use crate::adapters::indexnow::NotificationDispatcher;
use crate::config::load_config;
use crate::core::export::ExportCoordinator;
use clap::Args;
use tokio::sync::watch;

/// Arguments for the generate command
#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Skip confirmation prompt
    #[arg(short, long)]
    pub yes: bool,

    /// Dry run mode - render into an in-memory store, skip notifications
    #[arg(long)]
    pub dry_run: bool,

    /// Override the indices to export (comma-separated)
    #[arg(long)]
    pub index: Option<String>,
}

impl GenerateArgs {
    /// Execute the generate command
    pub async fn execute(
        &self,
        config_path: &str,
        shutdown_signal: watch::Receiver<bool>,
    ) -> anyhow::Result<i32> {
        tracing::info!("Starting generate command");

        let mut config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                tracing::error!(error = %e, "Configuration loading failed");
                eprintln!("Configuration error: {e}");
                return Ok(2);
            }
        };

        if let Some(indices) = &self.index {
            let indices: Vec<String> =
                indices.split(',').map(|s| s.trim().to_string()).collect();
            tracing::info!(indices = ?indices, "Overriding indices from CLI");
            config.sitemap.indices = indices;
        }

        if self.dry_run {
            tracing::info!("Enabling dry-run mode from CLI");
            config.application.dry_run = true;
        }
        if config.application.dry_run {
            config.notify.enabled = false;
            println!("🔍 DRY RUN MODE - artifacts go to an in-memory store, no notifications");
            println!();
        }

        if !self.yes && !config.application.dry_run {
            println!("Export Configuration:");
            println!("  Indices: {:?}", config.sitemap.indices);
            println!("  Bucket: {} (prefix {})", config.store.bucket, config.store.prefix);
            println!("  Page size: {}", config.search.scan.page_size);
            println!("  Notifications: {}", if config.notify.enabled { "on" } else { "off" });
            println!();
            print!("Proceed with export? [y/N]: ");
            use std::io::{self, Write};
            io::stdout().flush()?;

            let mut input = String::new();
            io::stdin().read_line(&mut input)?;
            if !input.trim().eq_ignore_ascii_case("y") {
                println!("Export cancelled.");
                return Ok(0);
            }
        }

        let backend = match build_backend(&config) {
            Ok(b) => b,
            Err(e) => {
                tracing::error!(error = %e, "Failed to create search client");
                eprintln!("Failed to connect to search backend: {e}");
                return Ok(4);
            }
        };
        let store = build_store(&config).await;
        let dispatcher = match NotificationDispatcher::new(&config.notify) {
            Ok(d) => d,
            Err(e) => {
                eprintln!("Configuration error: {e}");
                return Ok(2);
            }
        };

        let coordinator =
            ExportCoordinator::new(backend, store, dispatcher, &config, shutdown_signal);

        println!("🚀 Starting export...");
        println!();
        let summary = match coordinator.run().await {
            Ok(s) => s,
            Err(e) => {
                tracing::error!(error = %e, "Export run failed");
                eprintln!("Export failed: {e}");
                return Ok(5);
            }
        };

        println!();
        println!("📊 Run Summary:");
        println!("  Documents seen: {}", summary.documents_seen);
        println!("  Pages written: {}", summary.pages_written);
        println!("  Pages skipped: {}", summary.pages_skipped);
        println!(
            "  Notifications: {}/{}",
            summary.notifications_succeeded, summary.notifications_attempted
        );
        if let Some(reconcile) = &summary.reconcile {
            println!(
                "  Reconciled: {} deleted, {} kept, {} failed deletions",
                reconcile.deleted.len(),
                reconcile.kept,
                reconcile.failures.len()
            );
        } else {
            println!("  Reconciled: skipped");
        }
        println!("  Duration: {:.2}s", summary.duration().as_secs_f64());

        if summary.cancelled {
            println!();
            println!("⚠️  Run was cancelled before completion");
        }
        if !summary.errors.is_empty() {
            println!();
            println!("❌ Errors:");
            for err in &summary.errors {
                println!("  [{}] {}", err.context, err.message);
            }
        }

        Ok(if summary.is_success() { 0 } else { 1 })
    }
}
