//! Integration tests for configuration loading

use sitemapper::config::load_config;
use sitemapper::domain::SitemapperError;
use std::io::Write;
use tempfile::NamedTempFile;

const FULL_TOML: &str = r#"
[application]
log_level = "debug"
dry_run = false

[search]
base_url = "https://search.example.com:9200"
username = "exporter"
timeout_seconds = 120

[search.scan]
page_size = 2500
min_interval_ms = 50
scroll_ttl_seconds = 300

[search.retry]
max_retries = 5
retry_delay_ms = 200

[sitemap]
indices = ["jobs_idx", "archive_idx"]
site_base_url = "https://www.example.com/"
changefreq = "weekly"
priority = "0.8"

[store]
bucket = "sitemaps"
prefix = "exports/"
region = "eu-west-1"
endpoint_url = "https://minio.internal:9000"

[notify]
enabled = false

[logging]
local_enabled = true
local_path = "logs"
local_rotation = "hourly"
"#;

fn write_config(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn test_full_config_round_trip() {
    let file = write_config(FULL_TOML);
    let config = load_config(file.path()).unwrap();

    assert_eq!(config.application.log_level, "debug");
    assert_eq!(config.search.base_url, "https://search.example.com:9200");
    assert_eq!(config.search.username.as_deref(), Some("exporter"));
    assert_eq!(config.search.timeout_seconds, 120);
    assert_eq!(config.search.scan.page_size, 2500);
    assert_eq!(config.search.scan.min_interval_ms, 50);
    assert_eq!(config.search.retry.max_retries, 5);
    assert_eq!(config.sitemap.indices, vec!["jobs_idx", "archive_idx"]);
    assert_eq!(config.sitemap.changefreq, "weekly");
    assert_eq!(config.store.prefix, "exports/");
    assert_eq!(
        config.store.endpoint_url.as_deref(),
        Some("https://minio.internal:9000")
    );
    assert!(!config.notify.enabled);
    assert!(config.logging.local_enabled);
    assert_eq!(config.logging.local_rotation, "hourly");

    // defaults fill in what the file omits
    assert_eq!(config.sitemap.root_name, "sitemap_Alljobs.xml");
    assert_eq!(config.sitemap.counts_name, "sitemap_index_counts.xml");
    assert_eq!(config.notify.endpoints.len(), 6);
}

#[test]
fn test_site_base_trailing_slash_normalized() {
    let file = write_config(FULL_TOML);
    let config = load_config(file.path()).unwrap();
    assert_eq!(config.site_base(), "https://www.example.com");
}

#[test]
fn test_oversized_page_size_rejected() {
    let toml = FULL_TOML.replace("page_size = 2500", "page_size = 20000");
    let file = write_config(&toml);

    let result = load_config(file.path());
    assert!(matches!(
        result,
        Err(SitemapperError::Configuration(msg)) if msg.contains("page_size")
    ));
}

#[test]
fn test_notify_enabled_requires_credentials() {
    let toml = FULL_TOML.replace("enabled = false", "enabled = true");
    let file = write_config(&toml);

    let result = load_config(file.path());
    assert!(matches!(
        result,
        Err(SitemapperError::Configuration(msg)) if msg.contains("notify")
    ));
}

#[test]
fn test_env_override_beats_file_value() {
    std::env::set_var("SITEMAPPER_STORE_BUCKET", "override-bucket");
    let file = write_config(FULL_TOML);
    let config = load_config(file.path()).unwrap();
    std::env::remove_var("SITEMAPPER_STORE_BUCKET");

    assert_eq!(config.store.bucket, "override-bucket");
}

#[test]
fn test_secret_password_loaded_from_env_substitution() {
    use secrecy::ExposeSecret;

    std::env::set_var("SITEMAPPER_IT_SEARCH_PW", "hunter2");
    let toml = FULL_TOML.replace(
        "username = \"exporter\"",
        "username = \"exporter\"\npassword = \"${SITEMAPPER_IT_SEARCH_PW}\"",
    );
    let file = write_config(&toml);
    let config = load_config(file.path()).unwrap();
    std::env::remove_var("SITEMAPPER_IT_SEARCH_PW");

    assert_eq!(
        config.search.password.unwrap().expose_secret().as_ref(),
        "hunter2"
    );
}
