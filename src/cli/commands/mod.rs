//! CLI command implementations

pub mod generate;
pub mod init;
pub mod purge;
pub mod repair;
pub mod status;
pub mod validate;

use crate::adapters::search::{HttpSearchClient, SearchBackend};
use crate::adapters::store::{ArtifactStore, InMemoryObjectStore, ObjectStore, S3ObjectStore};
use crate::config::AppConfig;
use crate::domain::Result;
use std::sync::Arc;

/// Build the search backend from configuration
pub(crate) fn build_backend(config: &AppConfig) -> Result<Arc<dyn SearchBackend>> {
    Ok(Arc::new(HttpSearchClient::new(&config.search)?))
}

/// Build the artifact store; dry runs get an in-memory bucket
pub(crate) async fn build_store(config: &AppConfig) -> Arc<ArtifactStore> {
    let raw: Arc<dyn ObjectStore> = if config.application.dry_run {
        Arc::new(InMemoryObjectStore::new())
    } else {
        Arc::new(S3ObjectStore::new(&config.store).await)
    };
    Arc::new(ArtifactStore::new(raw, config.store.prefix.clone()))
}
