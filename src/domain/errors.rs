//! Domain error types
//!
//! This module defines the error hierarchy for sitemapper. All errors are
//! domain-specific and don't expose third-party client types.

use thiserror::Error;

/// Main sitemapper error type
///
/// This is the primary error type used throughout the application.
/// It wraps specific error types and provides context for error handling.
#[derive(Debug, Error)]
pub enum SitemapperError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Search-index-related errors
    #[error("Search error: {0}")]
    Search(#[from] SearchError),

    /// Object-store-related errors
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Sitemap rendering errors
    #[error("Render error: {0}")]
    Render(String),

    /// Export process errors
    #[error("Export error: {0}")]
    Export(String),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),
}

/// Search-index-specific errors
///
/// Errors raised when talking to the OpenSearch-compatible backend. These
/// don't expose the underlying HTTP client types.
#[derive(Debug, Error)]
pub enum SearchError {
    /// Failed to reach the search backend
    #[error("Failed to connect to search backend: {0}")]
    ConnectionFailed(String),

    /// Request timed out
    #[error("Request timeout: {0}")]
    Timeout(String),

    /// The server-side scan cursor has lapsed; the scan must be restarted
    #[error("Scan cursor expired: {0}")]
    CursorExpired(String),

    /// Query rejected or failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Response body could not be interpreted
    #[error("Invalid response from search backend: {0}")]
    InvalidResponse(String),

    /// Server error (5xx)
    #[error("Server error: {status} - {message}")]
    ServerError { status: u16, message: String },

    /// Client error (4xx)
    #[error("Client error: {status} - {message}")]
    ClientError { status: u16, message: String },
}

impl SearchError {
    /// Whether the caller may retry the same request.
    ///
    /// Connectivity failures, timeouts, throttling and gateway-class server
    /// errors are retryable; cursor expiry and query rejections are not.
    pub fn is_transient(&self) -> bool {
        match self {
            SearchError::ConnectionFailed(_) | SearchError::Timeout(_) => true,
            SearchError::ServerError { status, .. } => {
                matches!(status, 429 | 502 | 503 | 504)
            }
            SearchError::ClientError { status, .. } => *status == 429,
            _ => false,
        }
    }
}

/// Object-store-specific errors
///
/// Surfaced to the caller as-is; the core never retries store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Listing the store contents failed
    #[error("Failed to list store contents: {0}")]
    ListFailed(String),

    /// Writing an object failed
    #[error("Failed to write object {key}: {message}")]
    WriteFailed { key: String, message: String },

    /// Deleting an object failed
    #[error("Failed to delete object {key}: {message}")]
    DeleteFailed { key: String, message: String },
}

// Conversion from std::io::Error
impl From<std::io::Error> for SitemapperError {
    fn from(err: std::io::Error) -> Self {
        SitemapperError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for SitemapperError {
    fn from(err: serde_json::Error) -> Self {
        SitemapperError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for SitemapperError {
    fn from(err: toml::de::Error) -> Self {
        SitemapperError::Configuration(format!("TOML parse error: {err}"))
    }
}

// Conversion from quick-xml writer errors
impl From<quick_xml::Error> for SitemapperError {
    fn from(err: quick_xml::Error) -> Self {
        SitemapperError::Render(err.to_string())
    }
}
