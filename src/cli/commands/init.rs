//! Init command implementation
//!
//! Generates a sample configuration file.

use clap::Args;
use std::fs;
use std::path::Path;

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Path where to create the configuration file
    #[arg(short, long, default_value = "sitemapper.toml")]
    pub output: String,

    /// Overwrite existing file
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    /// Execute the init command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!(output = %self.output, "Initializing configuration file");

        println!("📝 Initializing Sitemapper configuration");
        println!();

        if Path::new(&self.output).exists() && !self.force {
            println!("❌ Configuration file already exists: {}", self.output);
            println!("   Use --force to overwrite");
            return Ok(2);
        }

        match fs::write(&self.output, Self::sample_config()) {
            Ok(_) => {
                println!("✅ Configuration file created: {}", self.output);
                println!();
                println!("Next steps:");
                println!("  1. Edit {} with your settings", self.output);
                println!("  2. Set credentials in the environment:");
                println!("     - SITEMAPPER_SEARCH_USERNAME / SITEMAPPER_SEARCH_PASSWORD");
                println!("     - SITEMAPPER_STORE_ACCESS_KEY_ID / SITEMAPPER_STORE_SECRET_ACCESS_KEY");
                println!("     - SITEMAPPER_NOTIFY_API_KEY");
                println!("  3. Validate configuration: sitemapper validate-config");
                println!("  4. Run an export: sitemapper generate");
                println!();
                Ok(0)
            }
            Err(e) => {
                println!("❌ Failed to write configuration file");
                println!("   Error: {e}");
                Ok(5)
            }
        }
    }

    fn sample_config() -> &'static str {
        r#"# Sitemapper Configuration File
# Search index to sitemap export tool

[application]
log_level = "info"
dry_run = false

[search]
base_url = "https://search.example.com:9200"
# username = "sitemapper"
# password = "${SITEMAPPER_SEARCH_PASSWORD}"
timeout_seconds = 300

[search.scan]
page_size = 5000          # backend ceiling is 10000
min_interval_ms = 100
scroll_ttl_seconds = 600

[search.retry]
max_retries = 3
retry_delay_ms = 1000

[sitemap]
indices = ["jobs_idx"]
site_base_url = "https://www.example.com"
root_name = "sitemap_Alljobs.xml"
counts_name = "sitemap_index_counts.xml"
changefreq = "daily"
priority = "1.0"

[store]
bucket = "sitemaps"
prefix = "public/"
region = "us-east-1"
# endpoint_url = "https://minio.internal:9000"   # S3-compatible stores
# access_key_id = "${SITEMAPPER_STORE_ACCESS_KEY_ID}"
# secret_access_key = "${SITEMAPPER_STORE_SECRET_ACCESS_KEY}"

[notify]
enabled = true
host = "www.example.com"
api_key = "${SITEMAPPER_NOTIFY_API_KEY}"
# key_location = "https://www.example.com/indexnow-key.txt"
timeout_seconds = 5

[logging]
local_enabled = false
local_path = "logs"
local_rotation = "daily"
"#
    }
}
