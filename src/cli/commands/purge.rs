//! Purge command implementation
//!
//! Deletes expired documents from the search index: scans ids whose posting
//! date is older than the cutoff and removes them with retried bulk deletes.

use super::build_backend;
use crate::adapters::search::{BulkWriter, ScanQuery, ScanReader, WriteOp};
use crate::config::load_config;
use clap::Args;

/// Arguments for the purge command
#[derive(Args, Debug)]
pub struct PurgeArgs {
    /// Delete documents whose posting date is older than this many days
    #[arg(long, default_value_t = 90)]
    pub older_than_days: u32,

    /// Purge only this index (default: all configured indices)
    #[arg(long)]
    pub index: Option<String>,

    /// Skip confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

impl PurgeArgs {
    /// Execute the purge command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(older_than_days = self.older_than_days, "Starting purge command");

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

        let cutoff = chrono::Utc::now() - chrono::Duration::days(i64::from(self.older_than_days));
        let query = ScanQuery::expired("postingDate", cutoff.timestamp_millis());

        let backend = match build_backend(&config) {
            Ok(b) => b,
            Err(e) => {
                eprintln!("Failed to connect to search backend: {e}");
                return Ok(4);
            }
        };

        let mut totals: Vec<(String, u64)> = Vec::new();
        for index in &indices {
            match backend.count(index, &query).await {
                Ok(count) => totals.push((index.clone(), count)),
                Err(e) => {
                    eprintln!("  {index}: count failed: {e}");
                    return Ok(5);
                }
            }
        }

        let total: u64 = totals.iter().map(|(_, n)| n).sum();
        println!("Documents older than {} days:", self.older_than_days);
        for (index, count) in &totals {
            println!("  {index}: {count}");
        }
        if total == 0 {
            println!("Nothing to purge.");
            return Ok(0);
        }

        if !self.yes {
            print!("Delete {total} documents? [y/N]: ");
            use std::io::{self, Write};
            io::stdout().flush()?;

            let mut input = String::new();
            io::stdin().read_line(&mut input)?;
            if !input.trim().eq_ignore_ascii_case("y") {
                println!("Purge cancelled.");
                return Ok(0);
            }
        }

        let reader = ScanReader::new(backend.clone(), config.search.scan.clone());
        let writer = BulkWriter::new(backend.clone(), &config.search.retry);

        let mut deleted = 0_usize;
        let mut failed = 0_usize;
        for index in &indices {
            let mut scan = match reader.open(index, query.clone()).await {
                Ok(scan) => scan,
                Err(e) => {
                    eprintln!("  {index}: scan failed: {e}");
                    failed += 1;
                    continue;
                }
            };

            let result = async {
                while let Some(batch) = scan.next().await? {
                    let ops: Vec<WriteOp> = batch
                        .iter()
                        .map(|doc| WriteOp::Delete {
                            id: doc.id.clone(),
                        })
                        .collect();
                    let report = writer.submit(index, &ops).await?;
                    deleted += report.succeeded();
                    failed += report.outcomes.len() - report.succeeded();
                }
                crate::domain::Result::Ok(())
            }
            .await;
            scan.close().await;

            if let Err(e) = result {
                eprintln!("  {index}: purge aborted: {e}");
                failed += 1;
            }
        }

        println!();
        println!("📊 Purge Summary:");
        println!("  Deleted: {deleted}");
        println!("  Failed: {failed}");

        Ok(if failed == 0 { 0 } else { 1 })
    }
}
