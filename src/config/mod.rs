//! Configuration management
//!
//! TOML configuration with `${VAR}` environment substitution, `SITEMAPPER_*`
//! overrides and secret-wrapped credentials.

pub mod loader;
pub mod schema;
pub mod secret;

pub use loader::load_config;
pub use schema::{
    AppConfig, ApplicationConfig, LoggingConfig, NotifyConfig, RetryConfig, ScanConfig,
    SearchConfig, SitemapConfig, StoreConfig,
};
pub use secret::{secret_string, SecretString, SecretValue};
