//! In-memory blob store

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::storage::{BlobStore, StoredBlob};

/// Blob store holding its records in memory.
///
/// The production store lives in the surrounding system; this one backs the
/// dispatch CLI and wiring tests.
#[derive(Clone, Debug, Default)]
pub struct InMemoryBlobStore {
    blobs: Arc<HashMap<String, StoredBlob>>,
}

impl InMemoryBlobStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding the given records
    pub fn with_blobs(blobs: impl IntoIterator<Item = (String, StoredBlob)>) -> Self {
        Self {
            blobs: Arc::new(blobs.into_iter().collect()),
        }
    }
}

#[async_trait]
impl BlobStore for InMemoryBlobStore {
    async fn get_by_id(&self, id: &str) -> Result<Option<StoredBlob>, anyhow::Error> {
        Ok(self.blobs.get(id).cloned())
    }
}
