//! Validate config command implementation

use crate::config::load_config;
use clap::Args;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("🔍 Validating configuration file: {config_path}");
        println!();

        // load_config substitutes, parses and validates in one pass
        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                println!("❌ Configuration is invalid");
                println!("   Error: {e}");
                return Ok(2);
            }
        };

        println!("✅ Configuration is valid");
        println!();
        println!("Configuration Summary:");
        println!("  Log Level: {}", config.application.log_level);
        println!("  Search Backend: {}", config.search.base_url);
        println!("  Page Size: {}", config.search.scan.page_size);
        println!("  Indices: {:?}", config.sitemap.indices);
        println!("  Site Base URL: {}", config.sitemap.site_base_url);
        println!("  Root Artifact: {}", config.sitemap.root_name);
        println!("  Bucket: {} (prefix {})", config.store.bucket, config.store.prefix);
        println!("  Region: {}", config.store.region);
        if let Some(endpoint) = &config.store.endpoint_url {
            println!("  Store Endpoint: {endpoint}");
        }
        if config.notify.enabled {
            println!("  Notifications: enabled, {} endpoints", config.notify.endpoints.len());
        } else {
            println!("  Notifications: disabled");
        }
        println!();
        Ok(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_args_creation() {
        let args = ValidateArgs {};
        let _ = format!("{args:?}");
    }
}
