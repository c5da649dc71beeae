//! HTTP client for OpenSearch-compatible backends
//!
//! Implements [`SearchBackend`] over the REST API: `_count`, `_search` with
//! scroll cursors, offset-paged `_search` and NDJSON `_bulk`. Authentication
//! is HTTP basic when credentials are configured.

use super::backend::SearchBackend;
use super::models::{
    BulkOutcome, BulkResponse, CountResponse, ScanPage, ScanQuery, SearchResponse, WriteOp,
};
use crate::config::SearchConfig;
use crate::domain::{Batch, Result, SearchError};
use async_trait::async_trait;
use secrecy::ExposeSecret;
use serde_json::json;
use std::time::Duration;
use tracing::debug;

/// HTTP implementation of [`SearchBackend`]
pub struct HttpSearchClient {
    client: reqwest::Client,
    base_url: String,
    username: Option<String>,
    password: Option<String>,
    scroll_ttl_seconds: u64,
}

impl HttpSearchClient {
    /// Creates a client from the search section of the configuration
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::ConnectionFailed`] if the underlying HTTP
    /// client cannot be constructed.
    pub fn new(config: &SearchConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| SearchError::ConnectionFailed(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            username: config.username.clone(),
            password: config
                .password
                .as_ref()
                .map(|p| p.expose_secret().as_ref().to_string()),
            scroll_ttl_seconds: config.scan.scroll_ttl_seconds,
        })
    }

    fn request(&self, method: reqwest::Method, url: String) -> reqwest::RequestBuilder {
        let mut builder = self.client.request(method, url);
        if let Some(username) = &self.username {
            builder = builder.basic_auth(username, self.password.as_deref());
        }
        builder
    }

    fn map_transport(e: reqwest::Error) -> SearchError {
        if e.is_timeout() {
            SearchError::Timeout(e.to_string())
        } else {
            SearchError::ConnectionFailed(e.to_string())
        }
    }

    async fn check_status(
        response: reqwest::Response,
        cursor_call: bool,
    ) -> std::result::Result<reqwest::Response, SearchError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let message = response.text().await.unwrap_or_default();
        if cursor_call && status.as_u16() == 404 {
            return Err(SearchError::CursorExpired(message));
        }
        if status.is_server_error() {
            return Err(SearchError::ServerError {
                status: status.as_u16(),
                message,
            });
        }
        Err(SearchError::ClientError {
            status: status.as_u16(),
            message,
        })
    }

    async fn parse_search(
        response: reqwest::Response,
    ) -> std::result::Result<ScanPage, SearchError> {
        let parsed: SearchResponse = response
            .json()
            .await
            .map_err(|e| SearchError::InvalidResponse(e.to_string()))?;

        let batch: Batch = parsed
            .hits
            .hits
            .into_iter()
            .map(|hit| hit.into_document())
            .collect();

        Ok(ScanPage {
            cursor: parsed.scroll_id,
            batch,
        })
    }
}

#[async_trait]
impl SearchBackend for HttpSearchClient {
    async fn count(&self, index: &str, query: &ScanQuery) -> Result<u64> {
        let url = format!("{}/{}/_count", self.base_url, index);
        let mut body = query.to_body(0, None);
        // _count accepts only the query clause
        let body = json!({ "query": body["query"].take() });

        let response = self
            .request(reqwest::Method::POST, url)
            .json(&body)
            .send()
            .await
            .map_err(Self::map_transport)?;
        let response = Self::check_status(response, false).await?;

        let parsed: CountResponse = response
            .json()
            .await
            .map_err(|e| SearchError::InvalidResponse(e.to_string()))?;

        debug!(index = index, count = parsed.count, "Counted documents");
        Ok(parsed.count)
    }

    async fn scan_open(&self, index: &str, query: &ScanQuery, size: usize) -> Result<ScanPage> {
        let url = format!(
            "{}/{}/_search?scroll={}s",
            self.base_url, index, self.scroll_ttl_seconds
        );
        let body = query.to_body(size, None);

        let response = self
            .request(reqwest::Method::POST, url)
            .json(&body)
            .send()
            .await
            .map_err(Self::map_transport)?;
        let response = Self::check_status(response, false).await?;

        let page = Self::parse_search(response).await?;
        debug!(
            index = index,
            documents = page.batch.len(),
            "Opened index scan"
        );
        Ok(page)
    }

    async fn scan_next(&self, cursor: &str) -> Result<ScanPage> {
        let url = format!("{}/_search/scroll", self.base_url);
        let body = json!({
            "scroll": format!("{}s", self.scroll_ttl_seconds),
            "scroll_id": cursor,
        });

        let response = self
            .request(reqwest::Method::POST, url)
            .json(&body)
            .send()
            .await
            .map_err(Self::map_transport)?;
        let response = Self::check_status(response, true).await?;

        Ok(Self::parse_search(response).await?)
    }

    async fn scan_close(&self, cursor: &str) -> Result<()> {
        let url = format!("{}/_search/scroll", self.base_url);
        let body = json!({ "scroll_id": [cursor] });

        let response = self
            .request(reqwest::Method::DELETE, url)
            .json(&body)
            .send()
            .await
            .map_err(Self::map_transport)?;
        Self::check_status(response, true).await?;

        debug!("Released scan cursor");
        Ok(())
    }

    async fn fetch_page(
        &self,
        index: &str,
        query: &ScanQuery,
        from: usize,
        size: usize,
    ) -> Result<Batch> {
        let url = format!("{}/{}/_search", self.base_url, index);
        let body = query.to_body(size, Some(from));

        let response = self
            .request(reqwest::Method::POST, url)
            .json(&body)
            .send()
            .await
            .map_err(Self::map_transport)?;
        let response = Self::check_status(response, false).await?;

        let page = Self::parse_search(response).await?;
        Ok(page.batch)
    }

    async fn bulk(&self, index: &str, ops: &[WriteOp]) -> Result<Vec<BulkOutcome>> {
        let url = format!("{}/{}/_bulk", self.base_url, index);

        let mut body = String::new();
        for op in ops {
            op.write_ndjson(&mut body);
        }

        let response = self
            .request(reqwest::Method::POST, url)
            .header("Content-Type", "application/x-ndjson")
            .body(body)
            .send()
            .await
            .map_err(Self::map_transport)?;
        let response = Self::check_status(response, false).await?;

        let parsed: BulkResponse = response
            .json()
            .await
            .map_err(|e| SearchError::InvalidResponse(e.to_string()))?;

        if parsed.items.len() != ops.len() {
            return Err(SearchError::InvalidResponse(format!(
                "bulk response carried {} items for {} operations",
                parsed.items.len(),
                ops.len()
            ))
            .into());
        }

        let outcomes = parsed
            .items
            .iter()
            .zip(ops)
            .map(|(item, op)| match item.detail() {
                Some(detail) => match &detail.error {
                    Some(error) => BulkOutcome::Failure {
                        id: detail.id.clone(),
                        reason: error.describe(),
                    },
                    None => BulkOutcome::Success {
                        id: detail.id.clone(),
                    },
                },
                None => BulkOutcome::Failure {
                    id: op.id().to_string(),
                    reason: "missing item detail in bulk response".to_string(),
                },
            })
            .collect();

        Ok(outcomes)
    }
}
