//! Status command implementation
//!
//! Shows what the store currently holds: per-index page coverage with gap
//! detection, plus whether the root aggregate and counts artifacts exist.

use super::build_store;
use crate::config::load_config;
use crate::core::sitemap::page_number;
use clap::Args;
use std::collections::BTreeSet;

/// Arguments for the status command
#[derive(Args, Debug)]
pub struct StatusArgs {}

impl StatusArgs {
    /// Execute the status command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!("Starting status command");

        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Configuration error: {e}");
                return Ok(2);
            }
        };

        let store = build_store(&config).await;
        let names = match store.list_names().await {
            Ok(names) => names,
            Err(e) => {
                eprintln!("Failed to list artifacts: {e}");
                return Ok(5);
            }
        };

        println!("Store: {} (prefix {})", config.store.bucket, config.store.prefix);
        println!("Artifacts: {}", names.len());
        println!();

        for index in &config.sitemap.indices {
            let prefix = format!("{index}_");
            let pages: BTreeSet<u64> = names
                .iter()
                .filter(|name| name.starts_with(&prefix))
                .filter_map(|name| page_number(name))
                .collect();

            match pages.iter().next_back() {
                None => println!("  {index}: no pages"),
                Some(&max) => {
                    let gaps: Vec<u64> =
                        (1..=max).filter(|page| !pages.contains(page)).collect();
                    if gaps.is_empty() {
                        println!("  {index}: pages 1..{max}, no gaps");
                    } else {
                        println!("  {index}: pages 1..{max}, missing {gaps:?}");
                    }
                }
            }
        }

        println!();
        println!(
            "  Root aggregate ({}): {}",
            config.sitemap.root_name,
            if names.contains(&config.sitemap.root_name) {
                "present"
            } else {
                "missing"
            }
        );
        println!(
            "  Counts artifact ({}): {}",
            config.sitemap.counts_name,
            if names.contains(&config.sitemap.counts_name) {
                "present"
            } else {
                "missing"
            }
        );

        Ok(0)
    }
}
