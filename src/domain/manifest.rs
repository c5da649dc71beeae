//! Artifact manifest
//!
//! The manifest is the set of artifact names a pipeline run intends to have
//! present in the store afterwards. Invariant: a name is only recorded after
//! its artifact was written successfully, so reconciliation never trusts an
//! unconfirmed page.

use std::collections::BTreeSet;

/// The set of artifact names that should exist after a run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArtifactManifest {
    names: BTreeSet<String>,
}

impl ArtifactManifest {
    /// Create an empty manifest
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a successfully written artifact name
    pub fn record(&mut self, name: impl Into<String>) {
        self.names.insert(name.into());
    }

    /// Whether the manifest contains a name
    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    /// Number of recorded names
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether the manifest is empty
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Iterate over recorded names in lexicographic order
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    /// Merge another manifest into this one
    pub fn merge(&mut self, other: ArtifactManifest) {
        self.names.extend(other.names);
    }
}
