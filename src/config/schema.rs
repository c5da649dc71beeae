//! Configuration schema
//!
//! TOML-backed configuration for the export pipeline. Every section carries
//! serde defaults so a minimal file only needs the search URL, the bucket
//! and the index list. `validate()` enforces the cross-field rules.

use super::secret::SecretString;
use crate::domain::{Result, SitemapperError};
use serde::{Deserialize, Serialize};
use url::Url;

/// Hard page-size ceiling enforced by the index backend
pub const MAX_PAGE_SIZE: usize = 10_000;

/// Top-level application configuration
#[derive(Debug, Deserialize, Serialize)]
pub struct AppConfig {
    /// General application settings
    #[serde(default)]
    pub application: ApplicationConfig,

    /// Search index connection and scan settings
    pub search: SearchConfig,

    /// Sitemap rendering settings
    pub sitemap: SitemapConfig,

    /// Object store settings
    pub store: StoreConfig,

    /// IndexNow notification settings
    #[serde(default)]
    pub notify: NotifyConfig,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// General application settings
#[derive(Debug, Deserialize, Serialize)]
pub struct ApplicationConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Dry-run mode: write artifacts to an in-memory store, skip notifications
    #[serde(default)]
    pub dry_run: bool,
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            dry_run: false,
        }
    }
}

/// Search index connection settings
#[derive(Debug, Deserialize, Serialize)]
pub struct SearchConfig {
    /// Base URL of the OpenSearch-compatible backend
    pub base_url: String,

    /// Basic-auth username (optional)
    #[serde(default)]
    pub username: Option<String>,

    /// Basic-auth password (optional)
    #[serde(default)]
    pub password: Option<SecretString>,

    /// Per-request timeout in seconds
    #[serde(default = "default_search_timeout")]
    pub timeout_seconds: u64,

    /// Scan/pagination settings
    #[serde(default)]
    pub scan: ScanConfig,

    /// Bulk write retry settings
    #[serde(default)]
    pub retry: RetryConfig,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            username: None,
            password: None,
            timeout_seconds: default_search_timeout(),
            scan: ScanConfig::default(),
            retry: RetryConfig::default(),
        }
    }
}

/// Scan/pagination settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ScanConfig {
    /// Page size for index scans (backend ceiling is 10000)
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// Minimum delay between consecutive scan calls, in milliseconds
    #[serde(default = "default_min_interval_ms")]
    pub min_interval_ms: u64,

    /// Server-side scroll context lease, in seconds
    #[serde(default = "default_scroll_ttl")]
    pub scroll_ttl_seconds: u64,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            min_interval_ms: default_min_interval_ms(),
            scroll_ttl_seconds: default_scroll_ttl(),
        }
    }
}

/// Bulk write retry settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RetryConfig {
    /// Maximum retries after the first attempt (3 retries = 4 attempts total)
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Delay between retry attempts, in milliseconds
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            retry_delay_ms: default_retry_delay_ms(),
        }
    }
}

/// Sitemap rendering settings
#[derive(Debug, Deserialize, Serialize)]
pub struct SitemapConfig {
    /// Indices to export, in processing order
    pub indices: Vec<String>,

    /// Public site base URL used for document and artifact links
    pub site_base_url: String,

    /// Name of the root aggregate artifact
    #[serde(default = "default_root_name")]
    pub root_name: String,

    /// Name of the per-index counts artifact
    #[serde(default = "default_counts_name")]
    pub counts_name: String,

    /// `<changefreq>` value for every entry
    #[serde(default = "default_changefreq")]
    pub changefreq: String,

    /// `<priority>` value for every entry
    #[serde(default = "default_priority")]
    pub priority: String,
}

/// Object store settings
#[derive(Debug, Deserialize, Serialize)]
pub struct StoreConfig {
    /// Bucket holding the sitemap artifacts
    pub bucket: String,

    /// Key prefix for all artifacts (e.g. "public/")
    #[serde(default = "default_prefix")]
    pub prefix: String,

    /// Store region
    #[serde(default = "default_region")]
    pub region: String,

    /// Custom endpoint URL for S3-compatible stores (optional)
    #[serde(default)]
    pub endpoint_url: Option<String>,

    /// Static access key id; falls back to the ambient credential chain
    #[serde(default)]
    pub access_key_id: Option<String>,

    /// Static secret access key; falls back to the ambient credential chain
    #[serde(default)]
    pub secret_access_key: Option<SecretString>,
}

/// IndexNow notification settings
#[derive(Debug, Deserialize, Serialize)]
pub struct NotifyConfig {
    /// Whether to submit changed artifacts to the endpoints
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Host value submitted in the notification body
    #[serde(default)]
    pub host: String,

    /// IndexNow API key
    #[serde(default)]
    pub api_key: Option<SecretString>,

    /// Key location URL; defaults to `https://<host>/<key>.txt`
    #[serde(default)]
    pub key_location: Option<String>,

    /// Receiver endpoints
    #[serde(default = "default_endpoints")]
    pub endpoints: Vec<String>,

    /// Per-endpoint timeout in seconds
    #[serde(default = "default_notify_timeout")]
    pub timeout_seconds: u64,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            host: String::new(),
            api_key: None,
            key_location: None,
            endpoints: default_endpoints(),
            timeout_seconds: default_notify_timeout(),
        }
    }
}

/// Logging settings
#[derive(Debug, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Enable rolling file logging in addition to the console
    #[serde(default)]
    pub local_enabled: bool,

    /// Directory for log files
    #[serde(default = "default_log_path")]
    pub local_path: String,

    /// File rotation ("daily" or "hourly")
    #[serde(default = "default_rotation")]
    pub local_rotation: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            local_enabled: false,
            local_path: default_log_path(),
            local_rotation: default_rotation(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_search_timeout() -> u64 {
    300
}

fn default_page_size() -> usize {
    5000
}

fn default_min_interval_ms() -> u64 {
    100
}

fn default_scroll_ttl() -> u64 {
    600
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_delay_ms() -> u64 {
    1000
}

fn default_root_name() -> String {
    "sitemap_Alljobs.xml".to_string()
}

fn default_counts_name() -> String {
    "sitemap_index_counts.xml".to_string()
}

fn default_changefreq() -> String {
    "daily".to_string()
}

fn default_priority() -> String {
    "1.0".to_string()
}

fn default_prefix() -> String {
    "public/".to_string()
}

fn default_region() -> String {
    "us-east-1".to_string()
}

fn default_true() -> bool {
    true
}

fn default_endpoints() -> Vec<String> {
    vec![
        "https://api.indexnow.org/indexnow".to_string(),
        "https://www.bing.com/indexnow".to_string(),
        "https://searchadvisor.naver.com/indexnow".to_string(),
        "https://search.seznam.cz/indexnow".to_string(),
        "https://yandex.com/indexnow".to_string(),
        "https://indexnow.yep.com/indexnow".to_string(),
    ]
}

fn default_notify_timeout() -> u64 {
    5
}

fn default_log_path() -> String {
    "logs".to_string()
}

fn default_rotation() -> String {
    "daily".to_string()
}

impl AppConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self> {
        super::loader::load_config(path)
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns a `Configuration` error naming the first violated rule.
    pub fn validate(&self) -> Result<()> {
        if self.search.base_url.is_empty() {
            return Err(SitemapperError::Configuration(
                "search.base_url must not be empty".to_string(),
            ));
        }
        Url::parse(&self.search.base_url).map_err(|e| {
            SitemapperError::Configuration(format!("search.base_url is not a valid URL: {e}"))
        })?;

        if self.search.scan.page_size == 0 || self.search.scan.page_size > MAX_PAGE_SIZE {
            return Err(SitemapperError::Configuration(format!(
                "search.scan.page_size must be between 1 and {MAX_PAGE_SIZE}, got {}",
                self.search.scan.page_size
            )));
        }

        if self.sitemap.indices.is_empty() {
            return Err(SitemapperError::Configuration(
                "sitemap.indices must list at least one index".to_string(),
            ));
        }
        Url::parse(&self.sitemap.site_base_url).map_err(|e| {
            SitemapperError::Configuration(format!(
                "sitemap.site_base_url is not a valid URL: {e}"
            ))
        })?;

        if self.store.bucket.is_empty() {
            return Err(SitemapperError::Configuration(
                "store.bucket must not be empty".to_string(),
            ));
        }

        if self.notify.enabled {
            if self.notify.host.is_empty() {
                return Err(SitemapperError::Configuration(
                    "notify.host is required when notifications are enabled".to_string(),
                ));
            }
            if self.notify.api_key.is_none() {
                return Err(SitemapperError::Configuration(
                    "notify.api_key is required when notifications are enabled".to_string(),
                ));
            }
            if self.notify.endpoints.is_empty() {
                return Err(SitemapperError::Configuration(
                    "notify.endpoints must not be empty when notifications are enabled"
                        .to_string(),
                ));
            }
        }

        Ok(())
    }

    /// Site base URL without a trailing slash
    pub fn site_base(&self) -> &str {
        self.sitemap.site_base_url.trim_end_matches('/')
    }
}
