//! Object store adapter
//!
//! [`ObjectStore`] abstracts the bucket operations the pipeline needs;
//! [`S3ObjectStore`] is the production implementation and
//! [`InMemoryObjectStore`] backs tests and dry runs. [`ArtifactStore`] sits
//! on top and translates between bare artifact names and prefixed keys.

pub mod memory;
pub mod s3;

pub use memory::InMemoryObjectStore;
pub use s3::S3ObjectStore;

use crate::core::sitemap::Artifact;
use crate::domain::Result;
use async_trait::async_trait;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::debug;

/// Minimal bucket operations
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// All keys under `prefix`
    async fn list(&self, prefix: &str) -> Result<BTreeSet<String>>;

    /// Write an object, overwriting any existing one
    async fn write(&self, key: &str, content: Vec<u8>, content_type: &str) -> Result<()>;

    /// Delete an object; deleting an absent key is not an error
    async fn delete(&self, key: &str) -> Result<()>;
}

const XML_CONTENT_TYPE: &str = "application/xml";

/// Artifact-level view of the store
///
/// Callers work with bare artifact names (`jobs_idx_1.xml`); this wrapper
/// applies the configured key prefix and filters listings down to XML
/// artifacts.
pub struct ArtifactStore {
    store: Arc<dyn ObjectStore>,
    prefix: String,
}

impl ArtifactStore {
    pub fn new(store: Arc<dyn ObjectStore>, prefix: impl Into<String>) -> Self {
        Self {
            store,
            prefix: prefix.into(),
        }
    }

    fn key(&self, name: &str) -> String {
        format!("{}{}", self.prefix, name)
    }

    /// Bare names of all XML artifacts currently in the store
    pub async fn list_names(&self) -> Result<BTreeSet<String>> {
        let keys = self.store.list(&self.prefix).await?;
        Ok(keys
            .into_iter()
            .filter_map(|key| {
                key.strip_prefix(&self.prefix)
                    .filter(|name| name.ends_with(".xml") && !name.contains('/'))
                    .map(str::to_string)
            })
            .collect())
    }

    /// Write an artifact under its prefixed key
    pub async fn write(&self, artifact: &Artifact) -> Result<()> {
        let key = self.key(&artifact.name);
        debug!(key = %key, bytes = artifact.content.len(), "Writing artifact");
        self.store
            .write(&key, artifact.content.clone(), XML_CONTENT_TYPE)
            .await
    }

    /// Delete an artifact by bare name
    pub async fn delete(&self, name: &str) -> Result<()> {
        self.store.delete(&self.key(name)).await
    }
}
