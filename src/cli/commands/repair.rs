//! Repair command implementation
//!
//! Backfills missing page artifacts by comparing the expected page range
//! (from the index document count) against the store, re-reading only the
//! missing pages with offset-paged fetches. Finishes by rebuilding the root
//! aggregate over the pages actually present.

use super::{build_backend, build_store};
use crate::adapters::indexnow::NotificationDispatcher;
use crate::adapters::search::ScanQuery;
use crate::config::load_config;
use crate::core::sitemap::{page_name, page_number, SitemapBuilder};
use clap::Args;
use std::collections::BTreeSet;

/// Arguments for the repair command
#[derive(Args, Debug)]
pub struct RepairArgs {
    /// Repair only this index (default: all configured indices)
    #[arg(long)]
    pub index: Option<String>,
}

impl RepairArgs {
    /// Execute the repair command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!("Starting repair command");

        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Configuration error: {e}");
                return Ok(2);
            }
        };

        let indices: Vec<String> = match &self.index {
            Some(index) => vec![index.clone()],
            None => config.sitemap.indices.clone(),
        };

        let backend = match build_backend(&config) {
            Ok(b) => b,
            Err(e) => {
                eprintln!("Failed to connect to search backend: {e}");
                return Ok(4);
            }
        };
        let store = build_store(&config).await;
        let builder = SitemapBuilder::new(&config.sitemap);
        let dispatcher = match NotificationDispatcher::new(&config.notify) {
            Ok(d) => d,
            Err(e) => {
                eprintln!("Configuration error: {e}");
                return Ok(2);
            }
        };

        let existing = match store.list_names().await {
            Ok(names) => names,
            Err(e) => {
                eprintln!("Failed to list artifacts: {e}");
                return Ok(5);
            }
        };

        let page_size = config.search.scan.page_size;
        let query = ScanQuery::sitemap_export();
        let now = chrono::Utc::now();
        let mut repaired: Vec<String> = Vec::new();
        let mut failures = 0_usize;

        for index in &indices {
            let count = match backend.count(index, &query).await {
                Ok(count) => count,
                Err(e) => {
                    tracing::warn!(index = %index, error = %e, "Count failed, skipping index");
                    eprintln!("  {index}: count failed: {e}");
                    failures += 1;
                    continue;
                }
            };
            let expected_pages = (count as usize).div_ceil(page_size);
            tracing::info!(
                index = %index,
                documents = count,
                expected_pages = expected_pages,
                "Checking page coverage"
            );

            for page in 1..=expected_pages {
                let name = page_name(index, page);
                if existing.contains(&name) {
                    continue;
                }

                let from = (page - 1) * page_size;
                let result = async {
                    let batch = backend.fetch_page(index, &query, from, page_size).await?;
                    builder.render_page(index, page, &batch, now)
                }
                .await;

                match result {
                    Ok(Some(artifact)) => match store.write(&artifact).await {
                        Ok(()) => {
                            tracing::info!(artifact = %artifact.name, "Backfilled missing page");
                            repaired.push(artifact.name);
                        }
                        Err(e) => {
                            eprintln!("  {name}: write failed: {e}");
                            failures += 1;
                        }
                    },
                    // no active documents at that offset, nothing to backfill
                    Ok(None) => {}
                    Err(e) => {
                        eprintln!("  {name}: fetch failed: {e}");
                        failures += 1;
                    }
                }
            }
        }

        // Rebuild the root over the pages now present so it reflects repairs.
        let root_result = async {
            let names = store.list_names().await?;
            let pages: BTreeSet<String> = names
                .into_iter()
                .filter(|name| {
                    page_number(name).is_some()
                        && config
                            .sitemap
                            .indices
                            .iter()
                            .any(|index| name.starts_with(&format!("{index}_")))
                })
                .collect();
            let root = builder.render_root(&config.sitemap.root_name, &pages, now)?;
            store.write(&root).await
        }
        .await;
        if let Err(e) = root_result {
            eprintln!("Root rebuild failed: {e}");
            return Ok(5);
        }

        if dispatcher.is_enabled() && !repaired.is_empty() {
            let urls: Vec<String> = repaired
                .iter()
                .map(|name| builder.artifact_url(name))
                .collect();
            let report = dispatcher.notify(&urls).await;
            println!(
                "Notified {}/{} endpoints of {} repaired artifacts",
                report.succeeded(),
                report.attempted(),
                repaired.len()
            );
        }

        println!();
        println!("📊 Repair Summary:");
        println!("  Pages backfilled: {}", repaired.len());
        for name in &repaired {
            println!("    {name}");
        }
        println!("  Failures: {failures}");

        Ok(if failures == 0 { 0 } else { 1 })
    }
}
