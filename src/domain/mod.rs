//! Domain models and types for sitemapper.
//!
//! The domain layer provides:
//! - **Document model** ([`Document`], [`Batch`]) for index records
//! - **Manifest** ([`ArtifactManifest`]) tracking intended artifact names
//! - **Error types** ([`SitemapperError`], [`SearchError`], [`StoreError`])
//! - **Result type alias** ([`Result`])
//!
//! All fallible operations return [`Result<T, SitemapperError>`]; errors are
//! converted with the `?` operator and never expose third-party client types.

pub mod document;
pub mod errors;
pub mod manifest;
pub mod result;

// Re-export commonly used types for convenience
pub use document::{Batch, Document};
pub use errors::{SearchError, SitemapperError, StoreError};
pub use manifest::ArtifactManifest;
pub use result::Result;
