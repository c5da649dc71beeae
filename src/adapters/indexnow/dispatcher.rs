//! Best-effort IndexNow submission
//!
//! Changed artifact URLs are submitted to every configured receiver endpoint
//! in parallel. Notification never fails the pipeline: endpoint errors are
//! counted and logged, and the report carries the per-endpoint results.

use crate::config::NotifyConfig;
use crate::domain::{Result, SitemapperError};
use futures::future::join_all;
use secrecy::ExposeSecret;
use serde_json::json;
use std::time::Duration;
use tracing::{debug, warn};

/// Outcome of submitting to one endpoint
#[derive(Debug, Clone)]
pub struct EndpointResult {
    pub endpoint: String,
    pub succeeded: bool,
}

/// Aggregate outcome of one notification round
#[derive(Debug, Clone, Default)]
pub struct DispatchReport {
    pub results: Vec<EndpointResult>,
}

impl DispatchReport {
    /// Number of endpoints contacted
    pub fn attempted(&self) -> usize {
        self.results.len()
    }

    /// Number of endpoints that accepted the submission
    pub fn succeeded(&self) -> usize {
        self.results.iter().filter(|r| r.succeeded).count()
    }
}

/// Submits changed URLs to the configured IndexNow endpoints
pub struct NotificationDispatcher {
    client: reqwest::Client,
    enabled: bool,
    host: String,
    key: String,
    key_location: String,
    endpoints: Vec<String>,
}

impl NotificationDispatcher {
    /// Build a dispatcher from the notify section of the configuration
    ///
    /// # Errors
    ///
    /// Returns a `Configuration` error when notifications are enabled but
    /// the API key is missing, or the HTTP client cannot be constructed.
    pub fn new(config: &NotifyConfig) -> Result<Self> {
        let key = match (&config.api_key, config.enabled) {
            (Some(key), _) => key.expose_secret().as_ref().to_string(),
            (None, false) => String::new(),
            (None, true) => {
                return Err(SitemapperError::Configuration(
                    "notify.api_key is required when notifications are enabled".to_string(),
                ))
            }
        };

        let key_location = config
            .key_location
            .clone()
            .unwrap_or_else(|| format!("https://{}/{}.txt", config.host, key));

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| {
                SitemapperError::Configuration(format!("failed to build notify client: {e}"))
            })?;

        Ok(Self {
            client,
            enabled: config.enabled,
            host: config.host.clone(),
            key,
            key_location,
            endpoints: config.endpoints.clone(),
        })
    }

    /// Whether this dispatcher will contact any endpoints
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Submit a set of changed URLs to every endpoint in parallel
    ///
    /// Never returns an error: endpoint failures (timeouts, non-2xx) only
    /// show up in the report.
    pub async fn notify(&self, urls: &[String]) -> DispatchReport {
        if !self.enabled || urls.is_empty() {
            return DispatchReport::default();
        }

        let body = json!({
            "host": self.host,
            "key": self.key,
            "keyLocation": self.key_location,
            "urlList": urls,
        });

        let submissions = self.endpoints.iter().map(|endpoint| {
            let body = body.clone();
            async move {
                let succeeded = match self.client.post(endpoint).json(&body).send().await {
                    Ok(response) if response.status().is_success() => true,
                    Ok(response) => {
                        warn!(
                            endpoint = %endpoint,
                            status = response.status().as_u16(),
                            "IndexNow endpoint rejected submission"
                        );
                        false
                    }
                    Err(e) => {
                        warn!(endpoint = %endpoint, error = %e, "IndexNow submission failed");
                        false
                    }
                };
                EndpointResult {
                    endpoint: endpoint.clone(),
                    succeeded,
                }
            }
        });

        let results = join_all(submissions).await;
        let report = DispatchReport { results };

        if report.succeeded() == report.attempted() {
            debug!(
                urls = urls.len(),
                endpoints = report.attempted(),
                "IndexNow submission accepted by all endpoints"
            );
        } else {
            warn!(
                urls = urls.len(),
                accepted = report.succeeded(),
                attempted = report.attempted(),
                "IndexNow submission partially accepted"
            );
        }
        report
    }
}
