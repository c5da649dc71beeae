//! In-memory object store for tests and dry runs

use super::ObjectStore;
use crate::domain::Result;
use async_trait::async_trait;
use std::collections::{BTreeMap, BTreeSet};
use tokio::sync::Mutex;

/// Map-backed [`ObjectStore`]
///
/// Dry runs substitute this for the real bucket so the pipeline can execute
/// end to end without touching remote storage.
#[derive(Default)]
pub struct InMemoryObjectStore {
    objects: Mutex<BTreeMap<String, StoredObject>>,
}

#[derive(Debug, Clone)]
pub struct StoredObject {
    pub content: Vec<u8>,
    pub content_type: String,
}

impl InMemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the stored objects, keyed by full key
    pub async fn contents(&self) -> BTreeMap<String, StoredObject> {
        self.objects.lock().await.clone()
    }
}

#[async_trait]
impl ObjectStore for InMemoryObjectStore {
    async fn list(&self, prefix: &str) -> Result<BTreeSet<String>> {
        let objects = self.objects.lock().await;
        Ok(objects
            .keys()
            .filter(|key| key.starts_with(prefix))
            .cloned()
            .collect())
    }

    async fn write(&self, key: &str, content: Vec<u8>, content_type: &str) -> Result<()> {
        self.objects.lock().await.insert(
            key.to_string(),
            StoredObject {
                content,
                content_type: content_type.to_string(),
            },
        );
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.objects.lock().await.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_write_list_delete() {
        let store = InMemoryObjectStore::new();

        store
            .write("public/a.xml", b"<a/>".to_vec(), "application/xml")
            .await
            .unwrap();
        store
            .write("public/b.xml", b"<b/>".to_vec(), "application/xml")
            .await
            .unwrap();

        let keys = store.list("public/").await.unwrap();
        assert_eq!(keys.len(), 2);

        store.delete("public/a.xml").await.unwrap();
        let keys = store.list("public/").await.unwrap();
        assert_eq!(keys.len(), 1);
        assert!(keys.contains("public/b.xml"));
    }

    #[tokio::test]
    async fn test_overwrite_replaces_content() {
        let store = InMemoryObjectStore::new();
        store
            .write("k", b"v1".to_vec(), "application/xml")
            .await
            .unwrap();
        store
            .write("k", b"v2".to_vec(), "application/xml")
            .await
            .unwrap();

        let contents = store.contents().await;
        assert_eq!(contents["k"].content, b"v2");
    }
}
